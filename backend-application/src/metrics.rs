use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::ScanAction;

#[derive(Debug, Default)]
pub struct Metrics {
    check_ins: AtomicU64,
    check_outs: AtomicU64,
    scans_rejected: AtomicU64,
    scans_not_found: AtomicU64,
    scans_invalid: AtomicU64,
    scan_conflicts: AtomicU64,
    scan_log_failures: AtomicU64,
    store_failures: AtomicU64,
    imports: AtomicU64,
    imported_rows: AtomicU64,
}

impl Metrics {
    pub fn record_scan_accepted(&self, action: ScanAction) {
        match action {
            ScanAction::CheckIn => self.check_ins.fetch_add(1, Ordering::Relaxed),
            ScanAction::CheckOut => self.check_outs.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_scan_rejected(&self) {
        self.scans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_not_found(&self) {
        self.scans_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_invalid(&self) {
        self.scans_invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_conflict(&self) {
        self.scan_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_log_failure(&self) {
        self.scan_log_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_import(&self, row_count: usize) {
        self.imports.fetch_add(1, Ordering::Relaxed);
        self.imported_rows
            .fetch_add(row_count as u64, Ordering::Relaxed);
    }

    pub fn scan_log_failures(&self) -> u64 {
        self.scan_log_failures.load(Ordering::Relaxed)
    }

    pub fn scan_conflicts(&self) -> u64 {
        self.scan_conflicts.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let check_ins = self.check_ins.load(Ordering::Relaxed);
        let check_outs = self.check_outs.load(Ordering::Relaxed);
        let rejected = self.scans_rejected.load(Ordering::Relaxed);
        let not_found = self.scans_not_found.load(Ordering::Relaxed);
        let invalid = self.scans_invalid.load(Ordering::Relaxed);
        let conflicts = self.scan_conflicts.load(Ordering::Relaxed);
        let log_failures = self.scan_log_failures.load(Ordering::Relaxed);
        let store_failures = self.store_failures.load(Ordering::Relaxed);
        let imports = self.imports.load(Ordering::Relaxed);
        let imported_rows = self.imported_rows.load(Ordering::Relaxed);

        format!(
            "# TYPE checkin_scans_accepted_total counter\n\
checkin_scans_accepted_total{{action=\"check_in\"}} {}\n\
checkin_scans_accepted_total{{action=\"check_out\"}} {}\n\
# TYPE checkin_scans_rejected_total counter\n\
checkin_scans_rejected_total {}\n\
# TYPE checkin_scans_not_found_total counter\n\
checkin_scans_not_found_total {}\n\
# TYPE checkin_scans_invalid_total counter\n\
checkin_scans_invalid_total {}\n\
# TYPE checkin_scan_conflicts_total counter\n\
checkin_scan_conflicts_total {}\n\
# TYPE checkin_scan_log_failures_total counter\n\
checkin_scan_log_failures_total {}\n\
# TYPE checkin_store_failures_total counter\n\
checkin_store_failures_total {}\n\
# TYPE checkin_imports_total counter\n\
checkin_imports_total {}\n\
# TYPE checkin_imported_rows_total counter\n\
checkin_imported_rows_total {}\n",
            check_ins,
            check_outs,
            rejected,
            not_found,
            invalid,
            conflicts,
            log_failures,
            store_failures,
            imports,
            imported_rows
        )
    }
}

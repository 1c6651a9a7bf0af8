// In-crate fakes for the application tests, with failure injection

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use backend_domain::{
    AttendanceStatus, Attendee, AttendeeChange, AttendeeId, AttendeeImport, AttendeeRepository,
    CheckInPolicy, HealthCheckService, ImportOutcome, RuntimeConfig, ScanAction, ScanCounts,
    ScanIdentifier, ScanLogEntry, ScanLogRepository, SheetDecoder, SheetFormat, SheetRow,
    StatsRefresher, StatusCounts,
};

use crate::{AppState, Metrics};

pub fn sample_import(identifier: &str) -> AttendeeImport {
    AttendeeImport {
        scan_identifier: ScanIdentifier::parse(identifier).unwrap(),
        name: format!("Guest {identifier}"),
        phone: "555-0100".to_string(),
        seat_id: "B12".to_string(),
        category: "General".to_string(),
    }
}

#[derive(Default)]
pub struct FakeAttendeeStore {
    rows: Mutex<HashMap<String, Attendee>>,
    pub calls: AtomicUsize,
    pub updates: AtomicUsize,
    pub fail: AtomicBool,
    /// Next conditional update sees another device's check-in land first.
    pub race_next_update: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
}

impl FakeAttendeeStore {
    pub fn seed(&self, record: AttendeeImport, now: DateTime<Utc>) -> Attendee {
        let attendee = Attendee::from_import(&record, now);
        self.rows
            .lock()
            .unwrap()
            .insert(record.scan_identifier.as_str().to_string(), attendee.clone());
        attendee
    }

    pub fn status_of(&self, identifier: &str) -> Option<AttendanceStatus> {
        self.rows
            .lock()
            .unwrap()
            .get(identifier)
            .map(|attendee| attendee.status)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    async fn enter(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl AttendeeRepository for FakeAttendeeStore {
    async fn find_by_scan_identifier(
        &self,
        scan_identifier: &ScanIdentifier,
    ) -> anyhow::Result<Option<Attendee>> {
        self.enter().await?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(scan_identifier.as_str())
            .cloned())
    }

    async fn update_if_status(
        &self,
        id: AttendeeId,
        expected: AttendanceStatus,
        change: &AttendeeChange,
    ) -> anyhow::Result<Option<Attendee>> {
        self.enter().await?;
        let mut rows = self.rows.lock().unwrap();
        let Some(attendee) = rows.values_mut().find(|attendee| attendee.id == id) else {
            return Ok(None);
        };
        if self.race_next_update.swap(false, Ordering::SeqCst) {
            attendee.status = AttendanceStatus::CheckedIn;
            attendee.check_in_time = Some(change.updated_at);
            attendee.check_out_time = None;
            attendee.device_id = Some("other-gate".to_string());
        }
        if attendee.status != expected {
            return Ok(None);
        }
        attendee.apply(change);
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(Some(attendee.clone()))
    }

    async fn upsert_many(&self, records: &[AttendeeImport]) -> anyhow::Result<ImportOutcome> {
        self.enter().await?;
        let now = Utc::now();
        let mut rows = self.rows.lock().unwrap();
        let mut outcome = ImportOutcome::default();
        for record in records {
            match rows.get_mut(record.scan_identifier.as_str()) {
                Some(existing) if existing.descriptive_fields_match(record) => {
                    outcome.unchanged += 1;
                }
                Some(existing) => {
                    existing.name = record.name.clone();
                    existing.phone = record.phone.clone();
                    existing.seat_id = record.seat_id.clone();
                    existing.category = record.category.clone();
                    existing.updated_at = now;
                    outcome.updated += 1;
                }
                None => {
                    rows.insert(
                        record.scan_identifier.as_str().to_string(),
                        Attendee::from_import(record, now),
                    );
                    outcome.inserted += 1;
                }
            }
        }
        Ok(outcome)
    }

    async fn list(
        &self,
        status: Option<AttendanceStatus>,
        limit: usize,
    ) -> anyhow::Result<Vec<Attendee>> {
        self.enter().await?;
        let mut rows = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|attendee| status.map_or(true, |status| attendee.status == status))
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn count_by_status(&self) -> anyhow::Result<StatusCounts> {
        self.enter().await?;
        let mut counts = StatusCounts::default();
        for attendee in self.rows.lock().unwrap().values() {
            counts.add(attendee.status, 1);
        }
        Ok(counts)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.enter().await
    }
}

#[derive(Default)]
pub struct FakeScanLog {
    entries: Mutex<Vec<ScanLogEntry>>,
    pub fail: AtomicBool,
}

impl FakeScanLog {
    pub fn entries(&self) -> Vec<ScanLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScanLogRepository for FakeScanLog {
    async fn append(&self, entry: &ScanLogEntry) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("scan_logs insert failed"));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_for_attendee(
        &self,
        attendee_id: AttendeeId,
        limit: usize,
    ) -> anyhow::Result<Vec<ScanLogEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|entry| entry.attendee_id == attendee_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_by_type(&self) -> anyhow::Result<ScanCounts> {
        let mut counts = ScanCounts::default();
        for entry in self.entries.lock().unwrap().iter() {
            match entry.scan_type {
                ScanAction::CheckIn => counts.check_ins += 1,
                ScanAction::CheckOut => counts.check_outs += 1,
            }
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct CountingRefresher {
    pub refreshes: AtomicUsize,
}

impl StatsRefresher for CountingRefresher {
    fn spawn_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeDecoder {
    pub rows: Mutex<Vec<SheetRow>>,
    pub fail: AtomicBool,
}

impl SheetDecoder for FakeDecoder {
    fn decode(&self, _format: SheetFormat, _bytes: &[u8]) -> anyhow::Result<Vec<SheetRow>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("not a spreadsheet"));
        }
        Ok(self.rows.lock().unwrap().clone())
    }
}

pub struct StoreHealth(pub Arc<FakeAttendeeStore>);

#[async_trait]
impl HealthCheckService for StoreHealth {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.0.ping().await.map(|_| true)
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub attendees: Arc<FakeAttendeeStore>,
    pub scan_log: Arc<FakeScanLog>,
    pub refresher: Arc<CountingRefresher>,
    pub decoder: Arc<FakeDecoder>,
}

impl TestHarness {
    pub fn new() -> Self {
        let attendees = Arc::new(FakeAttendeeStore::default());
        let scan_log = Arc::new(FakeScanLog::default());
        let refresher = Arc::new(CountingRefresher::default());
        let decoder = Arc::new(FakeDecoder::default());
        let config = RuntimeConfig::default();
        let state = AppState {
            policy: CheckInPolicy::new(config.rapid_rescan_cooldown_seconds),
            config,
            attendee_repo: attendees.clone(),
            scan_log_repo: scan_log.clone(),
            stats_refresher: refresher.clone(),
            sheet_decoder: decoder.clone(),
            health_service: Arc::new(StoreHealth(attendees.clone())),
            metrics: Arc::new(Metrics::default()),
        };
        Self {
            state,
            attendees,
            scan_log,
            refresher,
            decoder,
        }
    }
}

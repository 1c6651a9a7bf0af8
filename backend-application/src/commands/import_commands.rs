use std::collections::HashMap;

use tracing::{info, warn};

use backend_domain::{AttendeeImport, ScanIdentifier, SheetFormat, SheetRow};

use crate::dtos::ImportSummary;
use crate::store::with_store;
use crate::{AppError, AppState};

const NAME_COLUMNS: &[&str] = &["name"];
const PHONE_COLUMNS: &[&str] = &["phone"];
const SCAN_IDENTIFIER_COLUMNS: &[&str] = &[
    "qr payload",
    "qr_payload",
    "qrpayload",
    "scan_identifier",
    "scan identifier",
];
const SEAT_COLUMNS: &[&str] = &["seatid", "seat_id", "seat id"];
const CATEGORY_COLUMNS: &[&str] = &["category"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub records: Vec<AttendeeImport>,
    pub rows_read: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Maps decoded rows onto attendee records. Rows without a scan identifier are
/// dropped; a repeated identifier keeps its first position but takes the last row's values.
pub fn build_import_plan(rows: Vec<SheetRow>) -> ImportPlan {
    let mut plan = ImportPlan {
        rows_read: rows.len(),
        ..ImportPlan::default()
    };
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Ok(scan_identifier) = ScanIdentifier::parse(&column(&row, SCAN_IDENTIFIER_COLUMNS))
        else {
            plan.skipped += 1;
            continue;
        };
        let record = AttendeeImport {
            name: column(&row, NAME_COLUMNS),
            phone: column(&row, PHONE_COLUMNS),
            seat_id: column(&row, SEAT_COLUMNS),
            category: column(&row, CATEGORY_COLUMNS),
            scan_identifier,
        };
        match positions.get(record.scan_identifier.as_str()) {
            Some(&index) => {
                plan.duplicates += 1;
                plan.records[index] = record;
            }
            None => {
                positions.insert(
                    record.scan_identifier.as_str().to_string(),
                    plan.records.len(),
                );
                plan.records.push(record);
            }
        }
    }
    plan
}

fn column(row: &SheetRow, aliases: &[&str]) -> String {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub async fn import_attendees(
    state: &AppState,
    format: SheetFormat,
    bytes: &[u8],
) -> Result<ImportSummary, AppError> {
    let rows = state.sheet_decoder.decode(format, bytes).map_err(|err| {
        warn!(?format, error = %err, "failed to decode spreadsheet");
        AppError::Validation(format!("unreadable {} spreadsheet", format_name(format)))
    })?;
    let plan = build_import_plan(rows);
    if plan.skipped > 0 {
        warn!(
            "dropped {} rows without a scan identifier",
            plan.skipped
        );
    }

    let outcome = if plan.records.is_empty() {
        Default::default()
    } else {
        with_store(
            state,
            "upsert_attendees",
            state.bulk_timeout(),
            state.attendee_repo.upsert_many(&plan.records),
        )
        .await?
    };

    state.metrics.record_import(plan.records.len());
    if outcome.inserted > 0 || outcome.updated > 0 {
        state.refresh_stats();
    }
    info!(
        rows_read = plan.rows_read,
        imported = plan.records.len(),
        inserted = outcome.inserted,
        updated = outcome.updated,
        unchanged = outcome.unchanged,
        duplicates = plan.duplicates,
        "attendee import finished"
    );

    Ok(ImportSummary {
        success: true,
        rows_read: plan.rows_read,
        skipped: plan.skipped,
        duplicates: plan.duplicates,
        imported: plan.records.len(),
        inserted: outcome.inserted,
        updated: outcome.updated,
        unchanged: outcome.unchanged,
    })
}

fn format_name(format: SheetFormat) -> &'static str {
    match format {
        SheetFormat::Xlsx => "xlsx",
        SheetFormat::Csv => "csv",
    }
}

// In-process store for development and tests; state is lost on restart

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use backend_domain::{
    AttendanceStatus, Attendee, AttendeeChange, AttendeeId, AttendeeImport, AttendeeRepository,
    ImportOutcome, ScanAction, ScanCounts, ScanIdentifier, ScanLogEntry, ScanLogRepository,
    StatusCounts,
};

#[derive(Default)]
struct Tables {
    attendees: HashMap<AttendeeId, Attendee>,
    by_payload: HashMap<String, AttendeeId>,
    scan_logs: Vec<ScanLogEntry>,
}

#[derive(Default)]
pub struct InMemoryRepo {
    tables: RwLock<Tables>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendeeRepository for InMemoryRepo {
    async fn find_by_scan_identifier(
        &self,
        scan_identifier: &ScanIdentifier,
    ) -> Result<Option<Attendee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_payload
            .get(scan_identifier.as_str())
            .and_then(|id| tables.attendees.get(id))
            .cloned())
    }

    async fn update_if_status(
        &self,
        id: AttendeeId,
        expected: AttendanceStatus,
        change: &AttendeeChange,
    ) -> Result<Option<Attendee>> {
        let mut tables = self.tables.write().await;
        match tables.attendees.get_mut(&id) {
            Some(attendee) if attendee.status == expected => {
                attendee.apply(change);
                Ok(Some(attendee.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn upsert_many(&self, records: &[AttendeeImport]) -> Result<ImportOutcome> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let tables = &mut *tables;
        let mut outcome = ImportOutcome::default();
        for record in records {
            let existing = tables
                .by_payload
                .get(record.scan_identifier.as_str())
                .copied()
                .and_then(|id| tables.attendees.get_mut(&id));
            match existing {
                Some(attendee) if attendee.descriptive_fields_match(record) => {
                    outcome.unchanged += 1;
                }
                Some(attendee) => {
                    attendee.name = record.name.clone();
                    attendee.phone = record.phone.clone();
                    attendee.seat_id = record.seat_id.clone();
                    attendee.category = record.category.clone();
                    attendee.updated_at = now;
                    outcome.updated += 1;
                }
                None => {
                    let attendee = Attendee::from_import(record, now);
                    tables
                        .by_payload
                        .insert(record.scan_identifier.as_str().to_string(), attendee.id);
                    tables.attendees.insert(attendee.id, attendee);
                    outcome.inserted += 1;
                }
            }
        }
        Ok(outcome)
    }

    async fn list(&self, status: Option<AttendanceStatus>, limit: usize) -> Result<Vec<Attendee>> {
        let tables = self.tables.read().await;
        let mut attendees: Vec<Attendee> = tables
            .attendees
            .values()
            .filter(|attendee| status.map_or(true, |status| attendee.status == status))
            .cloned()
            .collect();
        attendees.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        attendees.truncate(limit);
        Ok(attendees)
    }

    async fn count_by_status(&self) -> Result<StatusCounts> {
        let tables = self.tables.read().await;
        let mut counts = StatusCounts::default();
        for attendee in tables.attendees.values() {
            counts.add(attendee.status, 1);
        }
        Ok(counts)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ScanLogRepository for InMemoryRepo {
    async fn append(&self, entry: &ScanLogEntry) -> Result<()> {
        self.tables.write().await.scan_logs.push(entry.clone());
        Ok(())
    }

    async fn list_for_attendee(
        &self,
        attendee_id: AttendeeId,
        limit: usize,
    ) -> Result<Vec<ScanLogEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<ScanLogEntry> = tables
            .scan_logs
            .iter()
            .rev()
            .filter(|entry| entry.attendee_id == attendee_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn count_by_type(&self) -> Result<ScanCounts> {
        let tables = self.tables.read().await;
        let mut counts = ScanCounts::default();
        for entry in &tables.scan_logs {
            match entry.scan_type {
                ScanAction::CheckIn => counts.check_ins += 1,
                ScanAction::CheckOut => counts.check_outs += 1,
            }
        }
        Ok(counts)
    }
}

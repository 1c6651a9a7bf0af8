use async_trait::async_trait;

use crate::entities::{
    Attendee,
    AttendeeChange,
    AttendeeImport,
    ImportOutcome,
    ScanCounts,
    ScanLogEntry,
    StatusCounts,
};
use crate::value_objects::{AttendanceStatus, AttendeeId, ScanIdentifier};

#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    async fn find_by_scan_identifier(
        &self,
        scan_identifier: &ScanIdentifier,
    ) -> anyhow::Result<Option<Attendee>>;

    /// Compare-and-swap on `status`: applies `change` only while the stored
    /// status still equals `expected`. `None` means another writer got there first.
    async fn update_if_status(
        &self,
        id: AttendeeId,
        expected: AttendanceStatus,
        change: &AttendeeChange,
    ) -> anyhow::Result<Option<Attendee>>;

    /// Upsert keyed by scan identifier. Never touches status, timestamps or
    /// scan provenance of existing attendees. Identifiers must be unique in `records`.
    async fn upsert_many(&self, records: &[AttendeeImport]) -> anyhow::Result<ImportOutcome>;

    async fn list(
        &self,
        status: Option<AttendanceStatus>,
        limit: usize,
    ) -> anyhow::Result<Vec<Attendee>>;

    async fn count_by_status(&self) -> anyhow::Result<StatusCounts>;

    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ScanLogRepository: Send + Sync {
    async fn append(&self, entry: &ScanLogEntry) -> anyhow::Result<()>;
    async fn list_for_attendee(
        &self,
        attendee_id: AttendeeId,
        limit: usize,
    ) -> anyhow::Result<Vec<ScanLogEntry>>;
    async fn count_by_type(&self) -> anyhow::Result<ScanCounts>;
}

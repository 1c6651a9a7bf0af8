// Attendee entity
// One ticket holder, keyed by the payload printed in their QR code

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::AttendeeImport;
use crate::value_objects::{AttendanceStatus, AttendeeId, ScanIdentifier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub scan_identifier: ScanIdentifier,
    pub name: String,
    pub phone: String,
    pub seat_id: String,
    pub category: String,
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub last_scanned_by: Option<String>,
    pub device_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attendee {
    /// A freshly imported attendee who has not been scanned yet.
    pub fn from_import(record: &AttendeeImport, now: DateTime<Utc>) -> Self {
        Self {
            id: AttendeeId::new(),
            scan_identifier: record.scan_identifier.clone(),
            name: record.name.clone(),
            phone: record.phone.clone(),
            seat_id: record.seat_id.clone(),
            category: record.category.clone(),
            status: AttendanceStatus::NotCheckedIn,
            check_in_time: None,
            check_out_time: None,
            last_scanned_by: None,
            device_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, change: &AttendeeChange) {
        self.status = change.status;
        self.check_in_time = change.check_in_time;
        self.check_out_time = change.check_out_time;
        self.last_scanned_by = change.last_scanned_by.clone();
        self.device_id = change.device_id.clone();
        self.updated_at = change.updated_at;
    }

    pub fn descriptive_fields_match(&self, record: &AttendeeImport) -> bool {
        self.name == record.name
            && self.phone == record.phone
            && self.seat_id == record.seat_id
            && self.category == record.category
    }
}

/// Fields written by an accepted scan. Descriptive attributes are never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeChange {
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub last_scanned_by: Option<String>,
    pub device_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

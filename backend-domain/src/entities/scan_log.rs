// Scan log entity
// Append-only audit trail of accepted entries and exits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AttendeeId, ScanAction, ScanLogId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanLogEntry {
    pub id: ScanLogId,
    pub attendee_id: AttendeeId,
    pub scan_type: ScanAction,
    pub device_id: Option<String>,
    pub operator_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Request and response payloads of the application commands and queries

use serde::{Deserialize, Serialize};

use backend_domain::{AttendanceStatus, Attendee, ScanAction, ScanLogEntry};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default, alias = "qrPayload", alias = "qr_payload")]
    pub scan_identifier: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, alias = "deviceId")]
    pub device_id: Option<String>,
    #[serde(default, alias = "operatorName")]
    pub operator_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanAccepted {
    pub success: bool,
    pub action: ScanAction,
    pub status: AttendanceStatus,
    pub attendee: Attendee,
    /// False when the attendee update committed but the scan log append did not.
    pub log_recorded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendeeListQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendeeList {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Attendee>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanHistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanHistory {
    pub attendee: Attendee,
    pub count: usize,
    pub entries: Vec<ScanLogEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub success: bool,
    pub rows_read: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub imported: usize,
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
}

// Import entities
// Rows produced by the spreadsheet pipeline and the outcome of upserting them

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::ScanIdentifier;

/// One decoded spreadsheet row, keyed by normalized header.
pub type SheetRow = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Xlsx,
    Csv,
}

impl SheetFormat {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        match mime.as_str() {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(SheetFormat::Xlsx)
            }
            "text/csv" | "application/csv" => Some(SheetFormat::Csv),
            _ => None,
        }
    }

    /// xlsx files are zip archives; anything else is treated as csv text.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"PK\x03\x04") {
            SheetFormat::Xlsx
        } else {
            SheetFormat::Csv
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeImport {
    pub scan_identifier: ScanIdentifier,
    pub name: String,
    pub phone: String,
    pub seat_id: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
}

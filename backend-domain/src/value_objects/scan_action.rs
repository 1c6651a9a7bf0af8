// Scan action value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Intent stated by the scanning device. Never inferred from the attendee's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAction {
    CheckIn,
    CheckOut,
}

impl ScanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanAction::CheckIn => "check_in",
            ScanAction::CheckOut => "check_out",
        }
    }
}

impl fmt::Display for ScanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "check_in" => Ok(ScanAction::CheckIn),
            "check_out" => Ok(ScanAction::CheckOut),
            other => Err(DomainError::InvalidAction(other.to_string())),
        }
    }
}

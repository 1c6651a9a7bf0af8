// Attendance status value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 3] = [
        AttendanceStatus::NotCheckedIn,
        AttendanceStatus::CheckedIn,
        AttendanceStatus::CheckedOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::NotCheckedIn => "not_checked_in",
            AttendanceStatus::CheckedIn => "checked_in",
            AttendanceStatus::CheckedOut => "checked_out",
        }
    }
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        AttendanceStatus::NotCheckedIn
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "not_checked_in" => Ok(AttendanceStatus::NotCheckedIn),
            "checked_in" => Ok(AttendanceStatus::CheckedIn),
            "checked_out" => Ok(AttendanceStatus::CheckedOut),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_stored_value() {
        for status in AttendanceStatus::ALL {
            assert_eq!(status.as_str().parse::<AttendanceStatus>(), Ok(status));
        }
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "inside".parse::<AttendanceStatus>().unwrap_err();
        assert_eq!(err, DomainError::InvalidStatus("inside".to_string()));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&AttendanceStatus::NotCheckedIn).unwrap();
        assert_eq!(json, "\"not_checked_in\"");
    }
}

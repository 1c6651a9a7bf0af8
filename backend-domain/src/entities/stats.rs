// Attendance statistics projection

use serde::{Deserialize, Serialize};

use crate::value_objects::AttendanceStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub not_checked_in: u64,
    pub checked_in: u64,
    pub checked_out: u64,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus, count: u64) {
        match status {
            AttendanceStatus::NotCheckedIn => self.not_checked_in += count,
            AttendanceStatus::CheckedIn => self.checked_in += count,
            AttendanceStatus::CheckedOut => self.checked_out += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.not_checked_in + self.checked_in + self.checked_out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCounts {
    pub check_ins: u64,
    pub check_outs: u64,
}

/// Status counts come from the attendee store; scan counts are audit figures
/// from the scan log and may lag behind if a log append failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeStats {
    pub total: u64,
    pub not_checked_in: u64,
    pub pending: u64,
    pub checked_in: u64,
    pub checked_out: u64,
    pub check_in_scans: u64,
    pub check_out_scans: u64,
    pub currently_inside: u64,
}

impl AttendeeStats {
    pub fn from_counts(statuses: StatusCounts, scans: ScanCounts) -> Self {
        Self {
            total: statuses.total(),
            not_checked_in: statuses.not_checked_in,
            pending: statuses.not_checked_in,
            checked_in: statuses.checked_in,
            checked_out: statuses.checked_out,
            check_in_scans: scans.check_ins,
            check_out_scans: scans.check_outs,
            currently_inside: statuses.checked_in,
        }
    }
}

//! Check-in state machine.
//!
//! The device always states its intent. The policy validates that intent
//! against the attendee's current status and either produces a transition or
//! a rejection; it never reinterprets a check-in as a check-out or vice versa.
//!
//! | status           | check_in           | check_out            |
//! |------------------|--------------------|----------------------|
//! | `not_checked_in` | -> `checked_in`    | not yet checked in   |
//! | `checked_in`     | already inside     | -> `checked_out`     |
//! | `checked_out`    | -> `checked_in`    | already checked out  |

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::entities::{Attendee, AttendeeChange};
use crate::value_objects::{AttendanceStatus, ScanAction};

pub const DEFAULT_RAPID_RESCAN_COOLDOWN_SECONDS: u64 = 10;
pub const MAX_RAPID_RESCAN_COOLDOWN_SECONDS: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInPolicy {
    rapid_rescan_cooldown: Duration,
}

impl Default for CheckInPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RAPID_RESCAN_COOLDOWN_SECONDS)
    }
}

impl CheckInPolicy {
    pub fn new(rapid_rescan_cooldown_seconds: u64) -> Self {
        let seconds = rapid_rescan_cooldown_seconds.min(MAX_RAPID_RESCAN_COOLDOWN_SECONDS);
        Self {
            rapid_rescan_cooldown: Duration::seconds(seconds as i64),
        }
    }

    pub fn rapid_rescan_cooldown(&self) -> Duration {
        self.rapid_rescan_cooldown
    }

    pub fn decide(
        &self,
        attendee: &Attendee,
        action: ScanAction,
        now: DateTime<Utc>,
    ) -> Result<Transition, Rejection> {
        let from = attendee.status;
        match (from, action) {
            (AttendanceStatus::NotCheckedIn, ScanAction::CheckIn)
            | (AttendanceStatus::CheckedOut, ScanAction::CheckIn) => Ok(Transition {
                from,
                to: AttendanceStatus::CheckedIn,
                action,
                check_in_time: Some(now),
                check_out_time: None,
                at: now,
            }),
            (AttendanceStatus::CheckedIn, ScanAction::CheckOut) => Ok(Transition {
                from,
                to: AttendanceStatus::CheckedOut,
                action,
                check_in_time: attendee.check_in_time,
                check_out_time: Some(now),
                at: now,
            }),
            (AttendanceStatus::NotCheckedIn, ScanAction::CheckOut) => {
                Err(Rejection::NotYetCheckedIn)
            }
            (AttendanceStatus::CheckedIn, ScanAction::CheckIn) => Err(Rejection::AlreadyInside {
                duplicate_submission: self.within_cooldown(attendee.check_in_time, now),
            }),
            (AttendanceStatus::CheckedOut, ScanAction::CheckOut) => {
                Err(Rejection::AlreadyCheckedOut)
            }
        }
    }

    // A repeat inside the window is most likely the same physical scan submitted twice.
    fn within_cooldown(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last {
            Some(last) => now.signed_duration_since(last) < self.rapid_rescan_cooldown,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: AttendanceStatus,
    pub to: AttendanceStatus,
    pub action: ScanAction,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub at: DateTime<Utc>,
}

impl Transition {
    pub fn into_change(
        self,
        device_id: Option<String>,
        operator_name: Option<String>,
    ) -> AttendeeChange {
        AttendeeChange {
            status: self.to,
            check_in_time: self.check_in_time,
            check_out_time: self.check_out_time,
            last_scanned_by: operator_name,
            device_id,
            updated_at: self.at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Rejection {
    #[error("not yet checked in")]
    NotYetCheckedIn,
    #[error("already inside")]
    AlreadyInside { duplicate_submission: bool },
    #[error("already checked out")]
    AlreadyCheckedOut,
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::NotYetCheckedIn => "not_checked_in",
            Rejection::AlreadyInside { .. } => "already_inside",
            Rejection::AlreadyCheckedOut => "already_checked_out",
        }
    }
}

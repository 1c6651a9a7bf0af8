use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use backend_domain::{
    normalize_optional_text, Attendee, Rejection, ScanAction, ScanIdentifier, ScanLogEntry,
    ScanLogId,
};

use crate::dtos::{ScanAccepted, ScanRequest};
use crate::store::with_store;
use crate::{AppError, AppState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCommand {
    pub scan_identifier: ScanIdentifier,
    pub action: ScanAction,
    pub device_id: Option<String>,
    pub operator_name: Option<String>,
}

impl TryFrom<ScanRequest> for ScanCommand {
    type Error = AppError;

    fn try_from(request: ScanRequest) -> Result<Self, Self::Error> {
        let scan_identifier = request
            .scan_identifier
            .as_deref()
            .ok_or_else(|| AppError::Validation("scan_identifier is required".to_string()))
            .and_then(|raw| {
                ScanIdentifier::parse(raw).map_err(|err| AppError::Validation(err.to_string()))
            })?;
        let action = request
            .action
            .as_deref()
            .ok_or_else(|| AppError::Validation("action is required".to_string()))
            .and_then(|raw| {
                raw.parse::<ScanAction>()
                    .map_err(|err| AppError::Validation(err.to_string()))
            })?;
        Ok(Self {
            scan_identifier,
            action,
            device_id: normalize_optional_text(request.device_id),
            operator_name: normalize_optional_text(request.operator_name),
        })
    }
}

pub async fn process_scan(state: &AppState, request: ScanRequest) -> Result<ScanAccepted, AppError> {
    let command = ScanCommand::try_from(request).map_err(|err| {
        state.metrics.record_scan_invalid();
        err
    })?;
    execute_scan(state, command, Utc::now()).await
}

pub async fn execute_scan(
    state: &AppState,
    command: ScanCommand,
    now: DateTime<Utc>,
) -> Result<ScanAccepted, AppError> {
    let attendee = with_store(
        state,
        "find_attendee",
        state.store_timeout(),
        state
            .attendee_repo
            .find_by_scan_identifier(&command.scan_identifier),
    )
    .await?;
    let Some(attendee) = attendee else {
        state.metrics.record_scan_not_found();
        info!(
            scan_identifier = %command.scan_identifier,
            action = %command.action,
            "scan rejected: invalid ticket"
        );
        return Err(AppError::NotFound);
    };

    let transition = match state.policy.decide(&attendee, command.action, now) {
        Ok(transition) => transition,
        Err(rejection) => return Err(reject(state, &command, attendee, rejection)),
    };

    let expected = attendee.status;
    let action = transition.action;
    let change = transition.into_change(command.device_id.clone(), command.operator_name.clone());
    let updated = with_store(
        state,
        "update_attendee",
        state.store_timeout(),
        state
            .attendee_repo
            .update_if_status(attendee.id, expected, &change),
    )
    .await?;
    let Some(updated) = updated else {
        return Err(concurrent_update(state, &command).await);
    };

    let entry = ScanLogEntry {
        id: ScanLogId::new(),
        attendee_id: updated.id,
        scan_type: action,
        device_id: command.device_id.clone(),
        operator_name: command.operator_name.clone(),
        created_at: change.updated_at,
    };
    let log_recorded = match with_store(
        state,
        "append_scan_log",
        state.store_timeout(),
        state.scan_log_repo.append(&entry),
    )
    .await
    {
        Ok(()) => true,
        Err(_) => {
            state.metrics.record_scan_log_failure();
            warn!(
                attendee_id = %updated.id,
                action = %action,
                "scan log append failed; attendee state already committed"
            );
            false
        }
    };

    state.refresh_stats();
    state.metrics.record_scan_accepted(action);
    info!(
        scan_identifier = %command.scan_identifier,
        attendee_id = %updated.id,
        from = %expected,
        to = %updated.status,
        device_id = command.device_id.as_deref().unwrap_or("-"),
        "scan accepted"
    );

    Ok(ScanAccepted {
        success: true,
        action,
        status: updated.status,
        attendee: updated,
        log_recorded,
    })
}

fn reject(
    state: &AppState,
    command: &ScanCommand,
    attendee: Attendee,
    rejection: Rejection,
) -> AppError {
    state.metrics.record_scan_rejected();
    if let Rejection::AlreadyInside {
        duplicate_submission: true,
    } = rejection
    {
        debug!(
            scan_identifier = %command.scan_identifier,
            cooldown_secs = state.policy.rapid_rescan_cooldown().num_seconds(),
            "repeat check-in inside the rescan cooldown"
        );
    }
    info!(
        scan_identifier = %command.scan_identifier,
        status = %attendee.status,
        action = %command.action,
        reason = rejection.code(),
        "scan rejected"
    );
    AppError::StateConflict {
        rejection,
        attendee: Box::new(attendee),
    }
}

// The compare-and-swap lost: report the state that won so the caller can decide.
async fn concurrent_update(state: &AppState, command: &ScanCommand) -> AppError {
    state.metrics.record_scan_conflict();
    let current = with_store(
        state,
        "refetch_attendee",
        state.store_timeout(),
        state
            .attendee_repo
            .find_by_scan_identifier(&command.scan_identifier),
    )
    .await
    .ok()
    .flatten();
    warn!(
        scan_identifier = %command.scan_identifier,
        action = %command.action,
        current_status = current.as_ref().map(|a| a.status.as_str()).unwrap_or("unknown"),
        "scan lost a concurrent update"
    );
    AppError::ConcurrencyConflict {
        attendee: current.map(Box::new),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use chrono::TimeZone;

    use backend_domain::AttendanceStatus;

    use super::*;
    use crate::test_support::{sample_import, TestHarness};

    fn request(identifier: &str, action: &str) -> ScanRequest {
        ScanRequest {
            scan_identifier: Some(identifier.to_string()),
            action: Some(action.to_string()),
            device_id: Some("gate-1".to_string()),
            operator_name: Some("  Sam ".to_string()),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 19, 0, 0).unwrap()
    }

    async fn scan_at(
        harness: &TestHarness,
        identifier: &str,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<ScanAccepted, AppError> {
        let command = ScanCommand::try_from(request(identifier, action))?;
        execute_scan(&harness.state, command, now).await
    }

    #[test]
    fn command_requires_identifier_and_action() {
        let missing_identifier = ScanRequest {
            action: Some("check_in".to_string()),
            ..ScanRequest::default()
        };
        assert!(matches!(
            ScanCommand::try_from(missing_identifier),
            Err(AppError::Validation(_))
        ));

        let blank_identifier = ScanRequest {
            scan_identifier: Some("   ".to_string()),
            action: Some("check_in".to_string()),
            ..ScanRequest::default()
        };
        assert!(matches!(
            ScanCommand::try_from(blank_identifier),
            Err(AppError::Validation(_))
        ));

        let missing_action = ScanRequest {
            scan_identifier: Some("QR1".to_string()),
            ..ScanRequest::default()
        };
        assert!(matches!(
            ScanCommand::try_from(missing_action),
            Err(AppError::Validation(message)) if message.contains("action")
        ));

        let toggle = ScanRequest {
            scan_identifier: Some("QR1".to_string()),
            action: Some("toggle".to_string()),
            ..ScanRequest::default()
        };
        assert!(matches!(
            ScanCommand::try_from(toggle),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn command_normalizes_optional_metadata() {
        let command = ScanCommand::try_from(ScanRequest {
            scan_identifier: Some(" QR1 ".to_string()),
            action: Some("check_out".to_string()),
            device_id: Some("   ".to_string()),
            operator_name: Some(" Sam ".to_string()),
        })
        .unwrap();
        assert_eq!(command.scan_identifier.as_str(), "QR1");
        assert_eq!(command.action, ScanAction::CheckOut);
        assert_eq!(command.device_id, None);
        assert_eq!(command.operator_name.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn invalid_request_never_touches_the_store() {
        let harness = TestHarness::new();
        let err = process_scan(&harness.state, ScanRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(harness.attendees.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_ticket_is_not_found_without_writes() {
        let harness = TestHarness::new();
        let err = scan_at(&harness, "NOPE", "check_in", t0()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
        assert_eq!(harness.attendees.updates.load(Ordering::SeqCst), 0);
        assert!(harness.scan_log.entries().is_empty());
    }

    #[tokio::test]
    async fn ticket_walkthrough_logs_only_accepted_scans() {
        let harness = TestHarness::new();
        harness.attendees.seed(sample_import("QR123"), t0());

        let first = scan_at(&harness, "QR123", "check_in", t0()).await.unwrap();
        assert_eq!(first.status, AttendanceStatus::CheckedIn);
        assert_eq!(first.action, ScanAction::CheckIn);
        assert_eq!(first.attendee.check_in_time, Some(t0()));
        assert_eq!(first.attendee.check_out_time, None);
        assert_eq!(first.attendee.last_scanned_by.as_deref(), Some("Sam"));
        assert!(first.log_recorded);

        let second = scan_at(&harness, "QR123", "check_in", t0() + chrono::Duration::seconds(2))
            .await
            .unwrap_err();
        match second {
            AppError::StateConflict {
                rejection,
                attendee,
            } => {
                assert_eq!(rejection.to_string(), "already inside");
                assert_eq!(attendee.status, AttendanceStatus::CheckedIn);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let later = t0() + chrono::Duration::minutes(40);
        let third = scan_at(&harness, "QR123", "check_out", later).await.unwrap();
        assert_eq!(third.status, AttendanceStatus::CheckedOut);
        assert_eq!(third.attendee.check_out_time, Some(later));

        let fourth = scan_at(&harness, "QR123", "check_in", later + chrono::Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(fourth.status, AttendanceStatus::CheckedIn);
        assert_eq!(fourth.attendee.check_out_time, None);

        let logged = harness
            .scan_log
            .entries()
            .into_iter()
            .map(|entry| entry.scan_type)
            .collect::<Vec<_>>();
        assert_eq!(
            logged,
            vec![ScanAction::CheckIn, ScanAction::CheckOut, ScanAction::CheckIn]
        );
        assert_eq!(harness.attendees.updates.load(Ordering::SeqCst), 3);
        assert_eq!(harness.refresher.refreshes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejected_scans_write_nothing() {
        let harness = TestHarness::new();
        harness.attendees.seed(sample_import("QR9"), t0());

        let err = scan_at(&harness, "QR9", "check_out", t0()).await.unwrap_err();
        assert_eq!(err.code(), "not_checked_in");
        assert_eq!(harness.attendees.updates.load(Ordering::SeqCst), 0);
        assert!(harness.scan_log.entries().is_empty());
        assert_eq!(harness.refresher.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lost_compare_and_swap_reports_concurrency_conflict() {
        let harness = TestHarness::new();
        harness.attendees.seed(sample_import("QR7"), t0());
        harness.attendees.race_next_update.store(true, Ordering::SeqCst);

        let err = scan_at(&harness, "QR7", "check_in", t0()).await.unwrap_err();
        match err {
            AppError::ConcurrencyConflict { attendee } => {
                let current = attendee.expect("refetched snapshot");
                assert_eq!(current.status, AttendanceStatus::CheckedIn);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(harness.scan_log.entries().is_empty());
        assert_eq!(harness.state.metrics.scan_conflicts(), 1);

        // Retrying re-reads the winner's state and is refused by the state machine.
        let retry = scan_at(&harness, "QR7", "check_in", t0()).await.unwrap_err();
        assert_eq!(retry.code(), "already_inside");
    }

    #[tokio::test]
    async fn log_failure_does_not_undo_the_scan() {
        let harness = TestHarness::new();
        harness.attendees.seed(sample_import("QR5"), t0());
        harness.scan_log.fail.store(true, Ordering::SeqCst);

        let accepted = scan_at(&harness, "QR5", "check_in", t0()).await.unwrap();
        assert_eq!(accepted.status, AttendanceStatus::CheckedIn);
        assert!(!accepted.log_recorded);
        assert_eq!(harness.state.metrics.scan_log_failures(), 1);
        assert_eq!(
            harness.attendees.status_of("QR5"),
            Some(AttendanceStatus::CheckedIn)
        );
    }

    #[tokio::test]
    async fn store_failure_is_unavailable_and_nothing_happens() {
        let harness = TestHarness::new();
        harness.attendees.seed(sample_import("QR6"), t0());
        harness.attendees.fail.store(true, Ordering::SeqCst);

        let err = scan_at(&harness, "QR6", "check_in", t0()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable));
        assert!(harness.scan_log.entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_times_out_as_unavailable() {
        let harness = TestHarness::new();
        harness.attendees.seed(sample_import("QR8"), t0());
        *harness.attendees.delay.lock().unwrap() = Some(Duration::from_secs(60));

        let err = scan_at(&harness, "QR8", "check_in", t0()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable));
        assert_eq!(harness.attendees.updates.load(Ordering::SeqCst), 0);
    }
}

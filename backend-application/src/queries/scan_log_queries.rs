use backend_domain::ScanIdentifier;

use crate::dtos::{ScanHistory, ScanHistoryQuery};
use crate::queries::attendee_queries::clamp_limit;
use crate::store::with_store;
use crate::{AppError, AppState};

pub async fn scan_history(
    state: &AppState,
    scan_identifier: &str,
    query: ScanHistoryQuery,
) -> Result<ScanHistory, AppError> {
    let scan_identifier = ScanIdentifier::parse(scan_identifier)
        .map_err(|err| AppError::Validation(err.to_string()))?;
    let attendee = with_store(
        state,
        "find_attendee",
        state.store_timeout(),
        state.attendee_repo.find_by_scan_identifier(&scan_identifier),
    )
    .await?
    .ok_or(AppError::NotFound)?;

    let limit = clamp_limit(state, query.limit);
    let entries = with_store(
        state,
        "list_scan_logs",
        state.store_timeout(),
        state.scan_log_repo.list_for_attendee(attendee.id, limit),
    )
    .await?;
    Ok(ScanHistory {
        attendee,
        count: entries.len(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use backend_domain::ScanAction;

    use super::*;
    use crate::commands::scan_commands::process_scan;
    use crate::dtos::ScanRequest;
    use crate::test_support::{sample_import, TestHarness};

    #[tokio::test]
    async fn history_is_newest_first() {
        let harness = TestHarness::new();
        harness.attendees.seed(sample_import("QR-H"), Utc::now());
        for action in ["check_in", "check_out", "check_in"] {
            process_scan(
                &harness.state,
                ScanRequest {
                    scan_identifier: Some("QR-H".to_string()),
                    action: Some(action.to_string()),
                    device_id: Some("kiosk-2".to_string()),
                    operator_name: None,
                },
            )
            .await
            .unwrap();
        }

        let history = scan_history(&harness.state, "QR-H", ScanHistoryQuery::default())
            .await
            .unwrap();
        assert_eq!(history.count, 3);
        let kinds = history
            .entries
            .iter()
            .map(|entry| entry.scan_type)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![ScanAction::CheckIn, ScanAction::CheckOut, ScanAction::CheckIn]
        );
        assert!(history
            .entries
            .iter()
            .all(|entry| entry.device_id.as_deref() == Some("kiosk-2")));
    }

    #[tokio::test]
    async fn unknown_ticket_has_no_history() {
        let harness = TestHarness::new();
        let err = scan_history(&harness.state, "missing", ScanHistoryQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}

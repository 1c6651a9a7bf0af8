use backend_domain::AttendanceStatus;

use crate::dtos::{AttendeeList, AttendeeListQuery};
use crate::store::with_store;
use crate::{AppError, AppState};

pub async fn list_attendees(
    state: &AppState,
    query: AttendeeListQuery,
) -> Result<AttendeeList, AppError> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<AttendanceStatus>()
                .map_err(|err| AppError::Validation(err.to_string()))?,
        ),
    };
    let limit = clamp_limit(state, query.limit);
    let data = with_store(
        state,
        "list_attendees",
        state.store_timeout(),
        state.attendee_repo.list(status, limit),
    )
    .await?;
    Ok(AttendeeList {
        success: true,
        count: data.len(),
        data,
    })
}

pub(crate) fn clamp_limit(state: &AppState, requested: Option<usize>) -> usize {
    let max = state.config.list_max_limit.max(1);
    requested
        .unwrap_or(state.config.list_default_limit)
        .clamp(1, max)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::commands::scan_commands::{execute_scan, ScanCommand};
    use crate::dtos::ScanRequest;
    use crate::test_support::{sample_import, TestHarness};

    #[tokio::test]
    async fn lists_newest_updates_first_with_status_filter() {
        let harness = TestHarness::new();
        let t0 = Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap();
        for (offset, id) in ["QR-A", "QR-B", "QR-C"].iter().enumerate() {
            harness
                .attendees
                .seed(sample_import(id), t0 + Duration::seconds(offset as i64));
        }
        let command = ScanCommand::try_from(ScanRequest {
            scan_identifier: Some("QR-A".to_string()),
            action: Some("check_in".to_string()),
            ..ScanRequest::default()
        })
        .unwrap();
        execute_scan(&harness.state, command, t0 + Duration::minutes(5))
            .await
            .unwrap();

        let all = list_attendees(&harness.state, AttendeeListQuery::default())
            .await
            .unwrap();
        let order = all
            .data
            .iter()
            .map(|attendee| attendee.scan_identifier.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["QR-A", "QR-C", "QR-B"]);

        let inside = list_attendees(
            &harness.state,
            AttendeeListQuery {
                status: Some("checked_in".to_string()),
                limit: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(inside.count, 1);
        assert_eq!(inside.data[0].scan_identifier.as_str(), "QR-A");
    }

    #[tokio::test]
    async fn rejects_unknown_status_filter() {
        let harness = TestHarness::new();
        let err = list_attendees(
            &harness.state,
            AttendeeListQuery {
                status: Some("inside".to_string()),
                limit: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn limit_is_capped() {
        let harness = TestHarness::new();
        assert_eq!(clamp_limit(&harness.state, None), 50);
        assert_eq!(clamp_limit(&harness.state, Some(0)), 1);
        assert_eq!(clamp_limit(&harness.state, Some(10_000)), 500);
    }
}

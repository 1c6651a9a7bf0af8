use backend_domain::AttendeeStats;

use crate::store::with_store;
use crate::{AppError, AppState};

pub async fn get_stats(state: &AppState) -> Result<AttendeeStats, AppError> {
    let (statuses, scans) = tokio::try_join!(
        with_store(
            state,
            "count_attendees_by_status",
            state.store_timeout(),
            state.attendee_repo.count_by_status(),
        ),
        with_store(
            state,
            "count_scans_by_type",
            state.store_timeout(),
            state.scan_log_repo.count_by_type(),
        ),
    )?;
    Ok(AttendeeStats::from_counts(statuses, scans))
}

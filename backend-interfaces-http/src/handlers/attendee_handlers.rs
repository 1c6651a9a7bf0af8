use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::dtos::{AttendeeList, AttendeeListQuery, ScanHistory, ScanHistoryQuery};
use backend_application::queries::{attendee_queries, scan_log_queries};
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::authorize;

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, HttpError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| HttpError::BadRequest(rejection.body_text()))
}

pub async fn list_attendees(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<AttendeeListQuery>, QueryRejection>,
) -> Result<Json<AttendeeList>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let list = attendee_queries::list_attendees(&state, query_params(query)?).await?;
    Ok(Json(list))
}

pub async fn attendee_scans(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(scan_identifier): Path<String>,
    query: Result<Query<ScanHistoryQuery>, QueryRejection>,
) -> Result<Json<ScanHistory>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let query = query_params(query)?;
    let history = scan_log_queries::scan_history(&state, &scan_identifier, query).await?;
    Ok(Json(history))
}

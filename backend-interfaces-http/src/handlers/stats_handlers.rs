use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::stats_queries;
use backend_application::AppState;
use backend_domain::AttendeeStats;

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn get_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AttendeeStats>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let stats = stats_queries::get_stats(&state).await?;
    Ok(Json(stats))
}

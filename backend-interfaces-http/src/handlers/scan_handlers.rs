use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::warn;

use backend_application::commands::scan_commands;
use backend_application::dtos::{ScanAccepted, ScanRequest};
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::{authorize, parse_json, BodyError};

pub async fn scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<ScanAccepted>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let request: ScanRequest = parse_json(&headers, &body, state.config.max_body_bytes)
        .map_err(|err| {
            warn!("failed to parse scan body: {}", err);
            state.metrics.record_scan_invalid();
            match err {
                BodyError::TooLarge => HttpError::BadRequest("upload too large".to_string()),
                _ => HttpError::BadRequest("body must be a JSON scan request".to_string()),
            }
        })?;

    let accepted = scan_commands::process_scan(&state, request).await?;
    Ok(Json(accepted))
}

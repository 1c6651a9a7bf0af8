use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::warn;

use backend_application::commands::import_commands;
use backend_application::dtos::ImportSummary;
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::{authorize, maybe_gunzip, sheet_format, BodyError};

pub async fn import_attendees(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<ImportSummary>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    if body.is_empty() {
        return Err(HttpError::BadRequest("empty upload".to_string()));
    }

    let content =
        maybe_gunzip(&headers, &body, state.config.max_body_bytes).map_err(|err| {
            warn!("failed to inflate import body: {}", err);
            match err {
                BodyError::TooLarge => HttpError::BadRequest("upload too large".to_string()),
                _ => HttpError::BadRequest("invalid gzip body".to_string()),
            }
        })?;
    let format = sheet_format(&headers, &content);

    let summary = import_commands::import_attendees(&state, format, &content).await?;
    Ok(Json(summary))
}

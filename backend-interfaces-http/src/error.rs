use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use backend_application::AppError;
use backend_domain::Attendee;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Conflict {
        code: &'static str,
        message: String,
        attendee: Option<Box<Attendee>>,
    },
    ServiceUnavailable(String),
    Internal(String),
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        let code = value.code();
        match value {
            AppError::Unauthorized => HttpError::Unauthorized,
            AppError::Validation(msg) => HttpError::BadRequest(msg),
            AppError::NotFound => HttpError::NotFound("Invalid ticket".to_string()),
            AppError::StateConflict {
                rejection,
                attendee,
            } => HttpError::Conflict {
                code,
                message: rejection.to_string(),
                attendee: Some(attendee),
            },
            AppError::ConcurrencyConflict { attendee } => HttpError::Conflict {
                code,
                message: "attendee was updated concurrently, scan again".to_string(),
                attendee,
            },
            AppError::StoreUnavailable => {
                HttpError::ServiceUnavailable("attendee store unavailable, retry later".to_string())
            }
            AppError::Internal(err) => HttpError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendee: Option<Box<Attendee>>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, code, message, attendee) = match self {
            HttpError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "unauthorized".to_string(),
                None,
            ),
            HttpError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "validation",
                format!("bad request: {}", msg),
                None,
            ),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, "invalid_ticket", msg, None),
            HttpError::Conflict {
                code,
                message,
                attendee,
            } => (StatusCode::CONFLICT, code, message, attendee),
            HttpError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                msg,
                None,
            ),
            HttpError::Internal(detail) => {
                error!("internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal error".to_string(),
                    None,
                )
            }
        };
        let body = ErrorBody {
            success: false,
            error: message,
            code,
            attendee,
        };
        (status, Json(body)).into_response()
    }
}

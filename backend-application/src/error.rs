use thiserror::Error;

use backend_domain::{Attendee, Rejection};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid ticket")]
    NotFound,
    #[error("{rejection}")]
    StateConflict {
        rejection: Rejection,
        attendee: Box<Attendee>,
    },
    #[error("attendee was updated concurrently, scan again")]
    ConcurrencyConflict { attendee: Option<Box<Attendee>> },
    #[error("attendee store unavailable, retry later")]
    StoreUnavailable,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::Validation(_) => "validation",
            AppError::NotFound => "invalid_ticket",
            AppError::StateConflict { rejection, .. } => rejection.code(),
            AppError::ConcurrencyConflict { .. } => "concurrent_update",
            AppError::StoreUnavailable => "store_unavailable",
            AppError::Internal(_) => "internal",
        }
    }
}

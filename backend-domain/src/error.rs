use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("scan identifier is required")]
    EmptyScanIdentifier,
    #[error("invalid attendance status '{0}'")]
    InvalidStatus(String),
    #[error("invalid scan action '{0}', expected 'check_in' or 'check_out'")]
    InvalidAction(String),
}

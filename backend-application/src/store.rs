use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tracing::error;

use crate::{AppError, AppState};

/// Runs one store call under a deadline. Errors and timeouts both surface as
/// `StoreUnavailable`; the underlying detail only goes to the log.
pub(crate) async fn with_store<T, F>(
    state: &AppState,
    operation: &'static str,
    deadline: Duration,
    call: F,
) -> Result<T, AppError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match timeout(deadline, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            state.metrics.record_store_failure();
            error!(operation, error = %err, "store call failed");
            Err(AppError::StoreUnavailable)
        }
        Err(_) => {
            state.metrics.record_store_failure();
            error!(
                operation,
                timeout_ms = deadline.as_millis() as u64,
                "store call timed out"
            );
            Err(AppError::StoreUnavailable)
        }
    }
}

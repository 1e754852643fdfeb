use std::future::Future;
use std::time::Duration;

use crate::user::errors::UserError;

/// Run a store call under a deadline.
///
/// Elapsing drops the inner future, which cancels the in-flight query, and
/// surfaces `UserError::Timeout` naming the operation.
pub async fn with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, UserError>
where
    F: Future<Output = Result<T, UserError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Store call exceeded deadline"
            );
            Err(UserError::Timeout(operation.to_string()))
        }
    }
}

//! Upper bound on persistence calls

use nearby_core::StoreError;
use std::future::Future;
use std::time::Duration;

/// Run a store call, failing with `DeadlineExceeded` once `limit` elapses
///
/// The inner future is dropped on timeout; no partial result is observed.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::DeadlineExceeded),
    }
}

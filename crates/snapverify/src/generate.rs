//! Async snapshot generation with a deadline.

use crate::error::{VerifyError, VerifyResult};
use crate::strategy::Strategy;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

/// Deadline applied when the caller does not choose one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a strategy's snapshot production under a deadline.
///
/// Production runs on a spawned task, so hitting the deadline ends the
/// wait rather than the production itself; a strategy that eventually
/// completes after a timeout has no artifact written for it. Panics and
/// other abnormal task exits surface as [`VerifyError::Generation`].
pub async fn generate<S: Strategy>(
    strategy: Arc<S>,
    value: S::Value,
    timeout: Duration,
) -> VerifyResult<S::Format> {
    let producer = tokio::spawn(async move { strategy.snapshot(value).await });

    match time::timeout(timeout, producer).await {
        Ok(Ok(Ok(format))) => Ok(format),
        Ok(Ok(Err(e))) => Err(VerifyError::Generation(e.to_string())),
        Ok(Err(join_error)) => Err(VerifyError::Generation(format!(
            "snapshot producer completed abnormally: {join_error}"
        ))),
        Err(_) => Err(VerifyError::Timeout { timeout }),
    }
}

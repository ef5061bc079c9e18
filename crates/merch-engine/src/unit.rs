//! Helpers shared by the engines for running one unit of work.

use std::future::Future;
use std::time::Duration;

use merch_core::store::UnitOfWork;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// Commits on success, rolls back on failure.
///
/// A failed rollback is logged and the original error returned; the store
/// discards the unit anyway once the handle is gone.
pub(crate) async fn finish<U, T>(unit: U, result: EngineResult<T>) -> EngineResult<T>
where
    U: UnitOfWork,
{
    match result {
        Ok(value) => {
            unit.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = unit.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Runs `op` under a deadline.
///
/// When the deadline fires the future is dropped mid-flight, which drops the
/// open unit and rolls it back.
pub(crate) async fn with_deadline<F, T>(timeout: Duration, operation: &str, op: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    match tokio::time::timeout(timeout, op).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = operation,
                timeout_ms = timeout.as_millis() as u64,
                "Operation deadline exceeded"
            );
            Err(EngineError::DeadlineExceeded)
        }
    }
}

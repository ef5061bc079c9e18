//! # Engine Errors
//!
//! What a transfer or purchase can fail with.
//!
//! ```text
//! EngineError
//! ├── Business(CoreError)   the request was wrong for the current state
//! │                         (insufficient funds, unknown recipient, ...)
//! ├── Store(StoreError)     the backend failed; the unit was rolled back
//! └── DeadlineExceeded      the unit ran past operation_timeout
//! ```

use merch_core::{CoreError, StoreError, ValidationError};
use thiserror::Error;

/// Error returned by the engines.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule rejection. Nothing was written.
    #[error(transparent)]
    Business(#[from] CoreError),

    /// Ledger store failure. Nothing was written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The operation did not finish within its deadline and was rolled back.
    #[error("Operation deadline exceeded")]
    DeadlineExceeded,
}

impl EngineError {
    /// Returns true when the caller sent something the current state rejects.
    pub fn is_client_error(&self) -> bool {
        matches!(self, EngineError::Business(_))
    }

    /// Returns true when running the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Business(_) => false,
            EngineError::Store(e) => e.is_retryable(),
            EngineError::DeadlineExceeded => true,
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Business(CoreError::Validation(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

//! # Error Types
//!
//! Domain-specific error types for merch-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  merch-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures (user-facing)           │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── StoreError       - What any ledger backend may report             │
//! │                                                                         │
//! │  merch-db errors (separate crate)                                      │
//! │  └── DbError          - sqlx failures, translated into StoreError      │
//! │                                                                         │
//! │  merch-engine errors                                                   │
//! │  └── EngineError      - CoreError | StoreError | DeadlineExceeded      │
//! │                                                                         │
//! │  shop-api errors                                                       │
//! │  └── ApiError         - What HTTP clients see (status + message)       │
//! │                                                                         │
//! │  Flow: DbError → StoreError ─┐                                         │
//! │                              ├─► EngineError → ApiError → client       │
//! │        ValidationError → CoreError ┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (username, item, amounts)
//! 3. Business failures and infrastructure failures never share a type

use thiserror::Error;

use crate::coins::Coins;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule failures.
///
/// These are expected, user-facing outcomes, not bugs. The HTTP layer maps
/// every variant to a client error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The wallet cannot cover the requested debit.
    ///
    /// ## When This Occurs
    /// - Transfer amount exceeds the sender's balance
    /// - Item price exceeds the buyer's balance
    ///
    /// The balance is read under the wallet lock, so `available` is the
    /// value the decision was actually made on.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: Coins, requested: Coins },

    /// The transfer recipient username does not exist.
    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    /// No catalog item has the requested name.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// The caller has no user or wallet.
    ///
    /// ## When This Occurs
    /// - A token refers to a user that no longer exists
    /// - The wallet row is missing for an existing user
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Sender and recipient resolve to the same user.
    #[error("Cannot transfer coins to yourself")]
    SelfTransfer,

    /// Username exists but the password does not match.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-alphanumeric username).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures a ledger backend reports through the store traits.
///
/// Backends translate their own error representation into this enum at the
/// store boundary, so engines never see driver-specific types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row the operation depends on does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A statement failed to execute.
    ///
    /// Non-retryable; indicates a schema or store fault.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row came back in a shape that could not be decoded.
    #[error("Scan failed: {0}")]
    ScanFailed(String),

    /// Begin, commit, rollback, lock wait or serialization failure.
    ///
    /// Retryable by the caller; no automatic retry happens.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A table constraint rejected the write (e.g. `balance >= 0`).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Returns true if retrying the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::TransactionFailed(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientFunds {
            available: Coins::new(100),
            requested: Coins::new(5000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: available 100 coins, requested 5000 coins"
        );

        let err = CoreError::RecipientNotFound("nonexistent".to_string());
        assert_eq!(err.to_string(), "Recipient not found: nonexistent");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: amount must be positive");
    }

    #[test]
    fn test_store_error_retryable() {
        assert!(StoreError::TransactionFailed("busy".into()).is_retryable());
        assert!(!StoreError::QueryFailed("syntax".into()).is_retryable());
        assert!(!StoreError::not_found("Wallet", 7).is_retryable());
        assert_eq!(StoreError::not_found("Wallet", 7).to_string(), "Wallet not found: 7");
    }
}

//! # Ledger Database Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──┬──► repositories (shop-api read paths)
//!                           └──► StoreError at the ledger trait boundary
//! ```
//!
//! Lock contention (SQLITE_BUSY / SQLITE_LOCKED, including extended codes)
//! is singled out as `TransactionFailed` so callers can tell a retryable
//! conflict from a broken query.

use std::borrow::Cow;

use merch_core::StoreError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// SQLite primary result codes that mean "someone else holds the lock".
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Categorized failure from the ledger database.
#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup by key matched no row.
    ///
    /// ## When This Occurs
    /// - A token's user id has no wallet
    /// - A balance adjustment targets a missing wallet
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write.
    ///
    /// ## When This Occurs
    /// - Two registrations race on the same username
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A row points at a user or item that does not exist.
    ///
    /// ## When This Occurs
    /// - History row referencing a non-existent user
    /// - Inventory row referencing a non-existent item
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A debit would take a wallet below zero (`balance >= 0`)
    /// - A non-positive amount reaches the history table
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// The file could not be opened or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// An embedded migration did not apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other statement failure.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row could not be decoded into the expected type.
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// Transaction failed: begin, commit, rollback or lock wait.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No pooled connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Driver failure outside the categories above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// `NotFound` for `entity` keyed by `id`.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// `UniqueViolation` with the offending value filled in.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wraps a failure of begin/commit/rollback.
    pub fn transaction(err: sqlx::Error) -> Self {
        match DbError::from(err) {
            // A lock timeout is already a transaction failure; anything else
            // is re-labelled so callers know the unit did not complete.
            DbError::TransactionFailed(msg) => DbError::TransactionFailed(msg),
            other => DbError::TransactionFailed(other.to_string()),
        }
    }
}

/// Returns true when a SQLite error code (possibly extended) is BUSY/LOCKED.
fn is_lock_contention(code: Option<Cow<'_, str>>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| matches!(c & 0xFF, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

/// Categorizes driver errors.
///
/// ```text
/// sqlx::Error::RowNotFound        → DbError::NotFound
/// sqlx::Error::Database           → by constraint kind / result code
///     SQLITE_BUSY, SQLITE_LOCKED  → DbError::TransactionFailed
/// sqlx::Error::ColumnDecode etc.  → DbError::DecodeFailed
/// sqlx::Error::PoolTimedOut       → DbError::PoolExhausted
/// Other                           → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                if is_lock_contention(db_err.code()) {
                    return DbError::TransactionFailed(msg);
                }

                match db_err.kind() {
                    ErrorKind::UniqueViolation => {
                        // SQLite reports "UNIQUE constraint failed: <table>.<column>"
                        let field = msg.rsplit(": ").next().unwrap_or(&msg).to_string();
                        DbError::UniqueViolation {
                            field,
                            value: String::new(),
                        }
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message: msg },
                    ErrorKind::CheckViolation => DbError::CheckViolation { message: msg },
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. } => DbError::DecodeFailed(err.to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Translation at the store trait boundary.
///
/// ```text
/// NotFound                          → StoreError::NotFound
/// Unique / ForeignKey / Check       → StoreError::ConstraintViolation
/// DecodeFailed                      → StoreError::ScanFailed
/// TransactionFailed / PoolExhausted
///   / ConnectionFailed              → StoreError::TransactionFailed (retryable)
/// everything else                   → StoreError::QueryFailed
/// ```
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::CheckViolation { .. } => StoreError::ConstraintViolation(err.to_string()),
            DbError::DecodeFailed(msg) => StoreError::ScanFailed(msg),
            DbError::TransactionFailed(msg) => StoreError::TransactionFailed(msg),
            DbError::PoolExhausted | DbError::ConnectionFailed(_) => {
                StoreError::TransactionFailed(err.to_string())
            }
            DbError::MigrationFailed(_) | DbError::QueryFailed(_) | DbError::Internal(_) => {
                StoreError::QueryFailed(err.to_string())
            }
        }
    }
}

/// Result alias used across merch-db.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_contention_codes() {
        assert!(is_lock_contention(Some(Cow::Borrowed("5"))));
        assert!(is_lock_contention(Some(Cow::Borrowed("6"))));
        // SQLITE_BUSY_SNAPSHOT (extended code of SQLITE_BUSY)
        assert!(is_lock_contention(Some(Cow::Borrowed("517"))));
        // SQLITE_CONSTRAINT_CHECK
        assert!(!is_lock_contention(Some(Cow::Borrowed("275"))));
        assert!(!is_lock_contention(None));
    }

    #[test]
    fn test_store_error_translation() {
        let store: StoreError = DbError::TransactionFailed("database is locked".into()).into();
        assert!(store.is_retryable());

        let store: StoreError = DbError::CheckViolation {
            message: "CHECK constraint failed: balance >= 0".into(),
        }
        .into();
        assert!(matches!(store, StoreError::ConstraintViolation(_)));

        let store: StoreError = DbError::DecodeFailed("bad column".into()).into();
        assert!(matches!(store, StoreError::ScanFailed(_)));

        let store: StoreError = DbError::not_found("Wallet", 3).into();
        assert!(matches!(store, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

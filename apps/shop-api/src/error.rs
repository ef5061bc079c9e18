//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Shop API                           │
//! │                                                                         │
//! │  Handler returns Result<T, ApiError>                                   │
//! │         │                                                               │
//! │         ├── CoreError (business rule)    ──► 400 / 401                 │
//! │         ├── EngineError::Business        ──► 400                       │
//! │         ├── EngineError::Store           ──► 500 (logged, generic msg) │
//! │         ├── EngineError::DeadlineExceeded ─► 504                       │
//! │         ├── DbError                      ──► 500 (logged, generic msg) │
//! │         └── missing / bad bearer token   ──► 401                       │
//! │                                                                         │
//! │  Body is always: {"errors": "<message>"}                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use merch_core::{CoreError, StoreError, ValidationError};
use merch_db::DbError;
use merch_engine::EngineError;
use serde::Serialize;

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: String,
}

/// API error returned from handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status sent to the client
    pub status: StatusCode,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// 400: the request is malformed or rejected by a business rule.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401: missing, invalid or expired credentials.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 500: generic message; the cause must already be logged.
    pub fn internal() -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            errors: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Converts business errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidCredentials => ApiError::unauthorized("invalid username or password"),
            CoreError::UserNotFound(_) => ApiError::unauthorized("user not found"),
            CoreError::InsufficientFunds { .. } => ApiError::bad_request("insufficient funds"),
            CoreError::RecipientNotFound(_) => ApiError::bad_request("recipient not found"),
            CoreError::ItemNotFound(_) => ApiError::bad_request("item not found"),
            CoreError::SelfTransfer => ApiError::bad_request("cannot send coins to yourself"),
            CoreError::Validation(e) => ApiError::bad_request(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

/// Converts store errors to API errors. Never exposes driver messages.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, retryable = err.is_retryable(), "Ledger store failure");
        ApiError::internal()
    }
}

/// Converts engine errors to API errors.
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Business(e) => e.into(),
            EngineError::Store(e) => e.into(),
            EngineError::DeadlineExceeded => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, "operation timed out")
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { field, .. } => {
                ApiError::bad_request(format!("{} already exists", field))
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::internal()
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merch_core::Coins;

    #[test]
    fn test_business_errors_are_400() {
        let err: ApiError = EngineError::Business(CoreError::InsufficientFunds {
            available: Coins::new(1),
            requested: Coins::new(2),
        })
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = CoreError::RecipientNotFound("ghost".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_auth_errors_are_401() {
        let err: ApiError = CoreError::InvalidCredentials.into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_infra_errors_are_generic_500() {
        let err: ApiError =
            EngineError::Store(StoreError::QueryFailed("no such table: wallets".into())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("wallets"));

        let err: ApiError = DbError::Internal("boom".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_deadline_is_504() {
        let err: ApiError = EngineError::DeadlineExceeded.into();
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
    }
}

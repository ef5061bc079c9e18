//! # Account Operations
//!
//! Login with auto-registration, and the read-side info view.
//!
//! ```text
//! authenticate_or_register("alice", pw)
//!        │
//!        ├── user exists ─────► verify pw ──► ok / InvalidCredentials
//!        │
//!        └── no such user ────► hash pw ──► create user + wallet (1000)
//!                                   │
//!                                   └── lost a registration race
//!                                       (username taken meanwhile)
//!                                       ──► re-read winner, verify pw
//! ```
//!
//! Password hashing and verification are CPU-bound and run on the blocking
//! pool.

use merch_core::{CoreError, User, UserId, UserInfo};
use merch_db::password::{hash_password, verify_password};
use merch_db::{Database, DbError};
use tracing::{info, warn};

use crate::error::ApiError;

/// Logs in `username`, registering it first if it does not exist yet.
///
/// ## Errors
/// * 401 `InvalidCredentials` - user exists with a different password
/// * 500 - database or hashing failure
pub async fn authenticate_or_register(
    db: &Database,
    username: &str,
    password: &str,
) -> Result<User, ApiError> {
    if let Some(user) = db.users().get_by_username(username).await? {
        return verify(user, password).await;
    }

    let hash = {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing task failed");
                ApiError::internal()
            })??
    };

    match db.users().create_with_wallet(username, &hash).await {
        Ok(user) => {
            info!(user_id = %user.id, username = %username, "Auto-registered new user");
            Ok(user)
        }
        Err(DbError::UniqueViolation { .. }) => {
            // Another request registered this name between our read and insert.
            let user = db
                .users()
                .get_by_username(username)
                .await?
                .ok_or_else(ApiError::internal)?;
            verify(user, password).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn verify(user: User, password: &str) -> Result<User, ApiError> {
    let password = password.to_string();
    let hash = user.password_hash.clone();

    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            ApiError::internal()
        })?;

    if ok {
        Ok(user)
    } else {
        warn!(username = %user.username, "Login rejected: wrong password");
        Err(CoreError::InvalidCredentials.into())
    }
}

/// Balance, inventory and coin history for the caller.
pub async fn user_info(db: &Database, user: UserId) -> Result<UserInfo, ApiError> {
    match db.users().info(user).await {
        Ok(info) => Ok(info),
        Err(DbError::NotFound { .. }) => Err(CoreError::UserNotFound(user.to_string()).into()),
        Err(e) => Err(e.into()),
    }
}

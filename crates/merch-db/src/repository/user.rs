//! # User Repository
//!
//! Users, their wallets, and the aggregated info view.
//!
//! ## Registration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_with_wallet("alice", hash)                                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO users   ... RETURNING id   ← UNIQUE(username)           │
//! │    INSERT INTO wallets (id, 1000)                                      │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A user never exists without a wallet, and vice versa.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use merch_core::{CoinHistory, Coins, User, UserId, UserInfo, STARTING_BALANCE};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::history::{fetch_received, fetch_sent};
use crate::repository::item::fetch_inventory;

/// Database row for `users`.
#[derive(Debug, FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        User {
            id: UserId(r.id),
            username: r.username,
            password_hash: r.password_hash,
            created_at: r.created_at,
        }
    }
}

/// Repository for user and wallet operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by login name.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        debug!(username = %username, "Looking up user");

        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: UserId) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Registers a user together with a wallet holding the starting balance.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the username is taken (possibly by a
    ///   registration that committed a moment earlier)
    pub async fn create_with_wallet(&self, username: &str, password_hash: &str) -> DbResult<User> {
        self.create_with_balance(username, password_hash, STARTING_BALANCE)
            .await
    }

    /// Registers a user with an explicit opening balance.
    ///
    /// Used by the seed tool; regular sign-up goes through
    /// [`create_with_wallet`](Self::create_with_wallet).
    pub async fn create_with_balance(
        &self,
        username: &str,
        password_hash: &str,
        balance: Coins,
    ) -> DbResult<User> {
        let now = Utc::now();

        debug!(username = %username, balance = %balance, "Creating user");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", username),
            other => other,
        })?;

        sqlx::query("INSERT INTO wallets (user_id, balance) VALUES (?1, ?2)")
            .bind(id)
            .bind(balance)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(user_id = id, username = %username, "User registered");

        Ok(User {
            id: UserId(id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    /// Current wallet balance. `None` when the user has no wallet.
    pub async fn get_balance(&self, id: UserId) -> DbResult<Option<Coins>> {
        let balance: Option<Coins> =
            sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(balance)
    }

    /// Number of registered users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Balance, inventory and coin history from one read snapshot.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - the user has no wallet
    pub async fn info(&self, id: UserId) -> DbResult<UserInfo> {
        debug!(user_id = %id, "Loading user info");

        // Deferred read transaction: all four reads see the same commit.
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let coins: Coins = sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Wallet", id))?;

        let inventory = fetch_inventory(&mut tx, id).await?;
        let received = fetch_received(&mut tx, id).await?;
        let sent = fetch_sent(&mut tx, id).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        Ok(UserInfo {
            coins,
            inventory,
            coin_history: CoinHistory { received, sent },
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

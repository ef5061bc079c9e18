//! # SQLite Ledger Store
//!
//! The store the transfer and purchase engines run on.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  One Unit of Work on SQLite                             │
//! │                                                                         │
//! │  BEGIN  (deferred: no lock yet)                                        │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  UPDATE wallets SET balance = balance      ← first statement is a      │
//! │   WHERE user_id = ? RETURNING balance        write: takes the database │
//! │    │                                         write lock, waiting up to │
//! │    │                                         busy_timeout              │
//! │    ▼                                                                    │
//! │  reads / relative updates / inserts        ← all see current state     │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  COMMIT  (or drop → ROLLBACK)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A no-op UPDATE is used instead of `SELECT ... FOR UPDATE`, which SQLite
//! does not have. Since every unit takes the write lock before its first
//! read, two units can never debit against the same pre-debit balance.

use async_trait::async_trait;
use chrono::Utc;
use merch_core::store::{LedgerStore, PurchaseOps, TransferOps, UnitOfWork, WalletLock};
use merch_core::{CoinTransfer, Coins, Item, ItemId, StoreResult, UserId};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbError;
use crate::repository::item::ItemRecord;

/// Ledger store backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Creates a ledger over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteLedger { pool }
    }
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    type Tx = SqliteUnit;

    async fn begin(&self) -> StoreResult<SqliteUnit> {
        let tx = self.pool.begin().await.map_err(DbError::transaction)?;
        Ok(SqliteUnit { tx })
    }

    async fn wallet_balance(&self, user: UserId) -> StoreResult<Option<Coins>> {
        let balance: Option<Coins> =
            sqlx::query_scalar("SELECT balance FROM wallets WHERE user_id = ?1")
                .bind(user)
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::from)?;

        Ok(balance)
    }
}

/// An open SQLite transaction.
///
/// Dropping it without [`commit`](UnitOfWork::commit) rolls back.
pub struct SqliteUnit {
    tx: Transaction<'static, Sqlite>,
}

impl std::fmt::Debug for SqliteUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteUnit").finish_non_exhaustive()
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnit {
    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(DbError::transaction)?;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await.map_err(DbError::transaction)?;
        Ok(())
    }
}

#[async_trait]
impl WalletLock for SqliteUnit {
    async fn lock_wallet_for_update(&mut self, user: UserId) -> StoreResult<Option<Coins>> {
        debug!(user_id = %user, "Locking wallet");

        let balance: Option<Coins> = sqlx::query_scalar(
            "UPDATE wallets SET balance = balance WHERE user_id = ?1 RETURNING balance",
        )
        .bind(user)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        Ok(balance)
    }

    async fn adjust_balance(&mut self, user: UserId, delta: Coins) -> StoreResult<Coins> {
        debug!(user_id = %user, delta = delta.amount(), "Adjusting balance");

        let balance: Option<Coins> = sqlx::query_scalar(
            "UPDATE wallets SET balance = balance + ?1 WHERE user_id = ?2 RETURNING balance",
        )
        .bind(delta)
        .bind(user)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        balance.ok_or_else(|| DbError::not_found("Wallet", user).into())
    }
}

#[async_trait]
impl TransferOps for SqliteUnit {
    async fn resolve_user(&mut self, username: &str) -> StoreResult<Option<UserId>> {
        let id: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(DbError::from)?;

        Ok(id)
    }

    async fn append_transfer(
        &mut self,
        from: UserId,
        to: UserId,
        amount: Coins,
    ) -> StoreResult<CoinTransfer> {
        let created_at = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO coin_transfers (from_user_id, to_user_id, amount, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(amount)
        .bind(created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        Ok(CoinTransfer {
            id,
            from_user: from,
            to_user: to,
            amount,
            created_at,
        })
    }
}

#[async_trait]
impl PurchaseOps for SqliteUnit {
    async fn lookup_item(&mut self, name: &str) -> StoreResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRecord>("SELECT id, name, price FROM items WHERE name = ?1")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(DbError::from)?;

        Ok(row.map(Item::from))
    }

    async fn upsert_inventory(&mut self, user: UserId, item: ItemId, increment: i64) -> StoreResult<i64> {
        let quantity: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO inventory (user_id, item_id, quantity)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id, item_id)
            DO UPDATE SET quantity = inventory.quantity + excluded.quantity
            RETURNING quantity
            "#,
        )
        .bind(user)
        .bind(item)
        .bind(increment)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        Ok(quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

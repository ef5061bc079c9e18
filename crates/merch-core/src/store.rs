//! # Store Capability Traits
//!
//! The minimal operation sets the engines need from a ledger backend.
//!
//! ## Capability Sets
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Unit-of-Work Capabilities                           │
//! │                                                                         │
//! │  LedgerStore::begin() ──► Tx                                           │
//! │                                                                         │
//! │                 ┌───────────────────────┐                               │
//! │                 │      UnitOfWork       │  commit / rollback            │
//! │                 │      WalletLock       │  lock_wallet_for_update       │
//! │                 │                       │  adjust_balance               │
//! │                 └───────────┬───────────┘                               │
//! │                ┌────────────┴────────────┐                              │
//! │     ┌──────────┴─────────┐   ┌───────────┴─────────┐                   │
//! │     │    TransferOps     │   │     PurchaseOps     │                   │
//! │     │  resolve_user      │   │  lookup_item        │                   │
//! │     │  append_transfer   │   │  upsert_inventory   │                   │
//! │     └────────────────────┘   └─────────────────────┘                   │
//! │                                                                         │
//! │  TransferEngine needs Tx: TransferOps                                  │
//! │  PurchaseEngine needs Tx: PurchaseOps                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! - Every operation on a `Tx` belongs to one atomic unit.
//! - `lock_wallet_for_update` holds the wallet exclusively until the unit
//!   ends; two units can never both observe the same pre-debit balance.
//! - Dropping a `Tx` without `commit` rolls the unit back.
//! - Backend failures come back as [`StoreError`](crate::StoreError); never as driver types.

use async_trait::async_trait;

use crate::coins::Coins;
use crate::error::StoreResult;
use crate::types::{CoinTransfer, Item, ItemId, UserId};

/// A ledger backend able to open units of work.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// The unit-of-work handle this backend hands out.
    type Tx: Send;

    /// Opens a new atomic unit of work.
    ///
    /// ## Errors
    /// [`StoreError::TransactionFailed`](crate::StoreError::TransactionFailed) if the backend cannot start one.
    async fn begin(&self) -> StoreResult<Self::Tx>;

    /// Reads a wallet balance outside any unit of work.
    ///
    /// The value may be stale by the time it is used; engines never base a
    /// debit decision on it.
    async fn wallet_balance(&self, user: UserId) -> StoreResult<Option<Coins>>;
}

/// Commit/rollback for a unit of work.
#[async_trait]
pub trait UnitOfWork: Send + Sized {
    /// Makes every change in this unit durable at once.
    async fn commit(self) -> StoreResult<()>;

    /// Discards every change in this unit.
    async fn rollback(self) -> StoreResult<()>;
}

/// Wallet row access inside a unit of work.
#[async_trait]
pub trait WalletLock: Send {
    /// Takes the exclusive lock on the user's wallet and returns the
    /// balance as of the lock. `None` when the user has no wallet.
    async fn lock_wallet_for_update(&mut self, user: UserId) -> StoreResult<Option<Coins>>;

    /// Applies a relative change to a wallet balance and returns the new
    /// balance. Negative deltas debit.
    async fn adjust_balance(&mut self, user: UserId, delta: Coins) -> StoreResult<Coins>;
}

/// Operations the transfer engine needs.
#[async_trait]
pub trait TransferOps: UnitOfWork + WalletLock {
    /// Resolves a username to its user id.
    async fn resolve_user(&mut self, username: &str) -> StoreResult<Option<UserId>>;

    /// Appends a history record and returns it as stored.
    async fn append_transfer(&mut self, from: UserId, to: UserId, amount: Coins) -> StoreResult<CoinTransfer>;
}

/// Operations the purchase engine needs.
#[async_trait]
pub trait PurchaseOps: UnitOfWork + WalletLock {
    /// Looks up a catalog item by its unique name.
    async fn lookup_item(&mut self, name: &str) -> StoreResult<Option<Item>>;

    /// Adds `increment` to the (user, item) inventory row, creating it when
    /// absent. Returns the resulting quantity.
    async fn upsert_inventory(&mut self, user: UserId, item: ItemId, increment: i64) -> StoreResult<i64>;
}

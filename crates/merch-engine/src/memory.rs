//! In-memory ledger for engine unit tests.
//!
//! A unit of work holds the ledger mutex from `begin` until commit/rollback
//! and mutates a private copy of the state; commit swaps the copy in. That
//! gives the same all-or-nothing and serialization behavior as the SQLite
//! ledger, plus switches to inject failures at specific steps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use merch_core::store::{LedgerStore, PurchaseOps, TransferOps, UnitOfWork, WalletLock};
use merch_core::{CoinTransfer, Coins, Item, ItemId, StoreError, StoreResult, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
pub(crate) struct LedgerState {
    users: HashMap<String, UserId>,
    wallets: HashMap<UserId, Coins>,
    items: HashMap<String, Item>,
    inventory: HashMap<(UserId, ItemId), i64>,
    transfers: Vec<(UserId, UserId, Coins)>,
    next_user: i64,
}

/// Failure switches, checked at the matching step.
#[derive(Debug, Default)]
pub(crate) struct Faults {
    pub fail_append: AtomicBool,
    pub fail_upsert: AtomicBool,
    pub fail_commit: AtomicBool,
    pub lock_delay_ms: AtomicU64,
}

#[derive(Debug, Clone)]
pub(crate) struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
    pub faults: Arc<Faults>,
}

impl MemoryLedger {
    /// A ledger with a small catalog: cup 20, pen 10, pink-hoody 500.
    pub fn new() -> Self {
        let mut state = LedgerState::default();
        for (id, (name, price)) in [("cup", 20), ("pen", 10), ("pink-hoody", 500)]
            .into_iter()
            .enumerate()
        {
            state.items.insert(
                name.to_string(),
                Item {
                    id: ItemId(id as i64 + 1),
                    name: name.to_string(),
                    price: Coins::new(price),
                },
            );
        }

        MemoryLedger {
            state: Arc::new(Mutex::new(state)),
            faults: Arc::new(Faults::default()),
        }
    }

    pub async fn add_user(&self, username: &str, balance: i64) -> UserId {
        let mut state = self.state.lock().await;
        state.next_user += 1;
        let id = UserId(state.next_user);
        state.users.insert(username.to_string(), id);
        state.wallets.insert(id, Coins::new(balance));
        id
    }

    pub async fn balance(&self, user: UserId) -> Option<Coins> {
        self.state.lock().await.wallets.get(&user).copied()
    }

    pub async fn transfers(&self) -> Vec<(UserId, UserId, Coins)> {
        self.state.lock().await.transfers.clone()
    }

    pub async fn quantity(&self, user: UserId, item: &str) -> i64 {
        let state = self.state.lock().await;
        state
            .items
            .get(item)
            .and_then(|i| state.inventory.get(&(user, i.id)).copied())
            .unwrap_or(0)
    }

    pub async fn total_supply(&self) -> Coins {
        self.state.lock().await.wallets.values().copied().sum()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    type Tx = MemoryUnit;

    async fn begin(&self) -> StoreResult<MemoryUnit> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(MemoryUnit {
            guard,
            work,
            faults: self.faults.clone(),
        })
    }

    async fn wallet_balance(&self, user: UserId) -> StoreResult<Option<Coins>> {
        Ok(self.balance(user).await)
    }
}

pub(crate) struct MemoryUnit {
    guard: OwnedMutexGuard<LedgerState>,
    work: LedgerState,
    faults: Arc<Faults>,
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn commit(self) -> StoreResult<()> {
        if self.faults.fail_commit.load(Ordering::SeqCst) {
            return Err(StoreError::TransactionFailed("injected commit failure".into()));
        }
        let MemoryUnit { mut guard, work, .. } = self;
        *guard = work;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl WalletLock for MemoryUnit {
    async fn lock_wallet_for_update(&mut self, user: UserId) -> StoreResult<Option<Coins>> {
        let delay = self.faults.lock_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(self.work.wallets.get(&user).copied())
    }

    async fn adjust_balance(&mut self, user: UserId, delta: Coins) -> StoreResult<Coins> {
        let balance = self
            .work
            .wallets
            .get_mut(&user)
            .ok_or_else(|| StoreError::not_found("Wallet", user))?;

        let updated = *balance + delta;
        if updated.is_negative() {
            return Err(StoreError::ConstraintViolation("balance >= 0".into()));
        }
        *balance = updated;
        Ok(updated)
    }
}

#[async_trait]
impl TransferOps for MemoryUnit {
    async fn resolve_user(&mut self, username: &str) -> StoreResult<Option<UserId>> {
        Ok(self.work.users.get(username).copied())
    }

    async fn append_transfer(
        &mut self,
        from: UserId,
        to: UserId,
        amount: Coins,
    ) -> StoreResult<CoinTransfer> {
        if self.faults.fail_append.load(Ordering::SeqCst) {
            return Err(StoreError::QueryFailed("injected append failure".into()));
        }
        self.work.transfers.push((from, to, amount));
        Ok(CoinTransfer {
            id: self.work.transfers.len() as i64,
            from_user: from,
            to_user: to,
            amount,
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl PurchaseOps for MemoryUnit {
    async fn lookup_item(&mut self, name: &str) -> StoreResult<Option<Item>> {
        Ok(self.work.items.get(name).cloned())
    }

    async fn upsert_inventory(&mut self, user: UserId, item: ItemId, increment: i64) -> StoreResult<i64> {
        if self.faults.fail_upsert.load(Ordering::SeqCst) {
            return Err(StoreError::QueryFailed("injected upsert failure".into()));
        }
        let quantity = self.work.inventory.entry((user, item)).or_insert(0);
        *quantity += increment;
        Ok(*quantity)
    }
}

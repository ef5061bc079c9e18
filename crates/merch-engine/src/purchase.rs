//! # Purchase Engine
//!
//! Buys one catalog item for one user as a single unit of work.
//!
//! ```text
//! begin ─► lock buyer's wallet ─► look up item ─► balance < price?
//!                                                   │ no
//!                                                   ▼
//!                                  debit price ─► inventory +1 ─► commit
//! ```
//!
//! The balance used for the check is the one read under the lock, never a
//! value cached by the caller. Two purchases by the same user queue on the
//! wallet lock and the second sees the first's debit.

use merch_core::store::{LedgerStore, PurchaseOps, WalletLock};
use merch_core::validation::validate_item_name;
use merch_core::{CoreError, PurchaseReceipt, UserId};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::unit::{finish, with_deadline};

/// Item purchases over any ledger store.
#[derive(Debug, Clone)]
pub struct PurchaseEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S> PurchaseEngine<S>
where
    S: LedgerStore,
    S::Tx: PurchaseOps,
{
    /// Creates an engine over `store`.
    pub fn new(store: S, config: EngineConfig) -> Self {
        PurchaseEngine { store, config }
    }

    /// Buys one `item_name` for `user`.
    ///
    /// ## Errors
    /// * `Business(Validation)` - malformed item name
    /// * `Business(UserNotFound)` - `user` has no wallet
    /// * `Business(ItemNotFound)` - no such catalog item
    /// * `Business(InsufficientFunds)` - balance at lock time < price
    /// * `Store(_)` - backend failure, unit rolled back
    /// * `DeadlineExceeded` - unit did not finish within `operation_timeout`
    pub async fn purchase(&self, user: UserId, item_name: &str) -> EngineResult<PurchaseReceipt> {
        validate_item_name(item_name)?;

        debug!(user_id = %user, item = %item_name, "Purchase requested");

        with_deadline(
            self.config.operation_timeout,
            "purchase",
            self.run(user, item_name),
        )
        .await
    }

    async fn run(&self, user: UserId, item_name: &str) -> EngineResult<PurchaseReceipt> {
        let mut unit = self.store.begin().await?;
        let result = Self::apply(&mut unit, user, item_name).await;
        let receipt = finish(unit, result).await?;

        info!(
            user_id = %receipt.user_id,
            item = %receipt.item,
            price = %receipt.price,
            balance = %receipt.balance,
            "Purchase committed"
        );

        Ok(receipt)
    }

    async fn apply(unit: &mut S::Tx, user: UserId, item_name: &str) -> EngineResult<PurchaseReceipt> {
        let balance = unit
            .lock_wallet_for_update(user)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(user.to_string()))?;

        let item = match unit.lookup_item(item_name).await? {
            Some(item) => item,
            None => {
                warn!(user_id = %user, item = %item_name, "Purchase rejected: unknown item");
                return Err(CoreError::ItemNotFound(item_name.to_string()).into());
            }
        };

        if !balance.covers(item.price) {
            warn!(
                user_id = %user,
                item = %item.name,
                available = %balance,
                price = %item.price,
                "Purchase rejected: insufficient funds"
            );
            return Err(CoreError::InsufficientFunds {
                available: balance,
                requested: item.price,
            }
            .into());
        }

        let balance = unit.adjust_balance(user, -item.price).await?;
        let quantity = unit.upsert_inventory(user, item.id, 1).await?;

        Ok(PurchaseReceipt {
            user_id: user,
            item: item.name,
            price: item.price,
            balance,
            quantity,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::memory::MemoryLedger;
    use merch_core::{Coins, StoreError};
    use std::sync::atomic::Ordering;

    fn engine(ledger: &MemoryLedger) -> PurchaseEngine<MemoryLedger> {
        PurchaseEngine::new(ledger.clone(), EngineConfig::default())
    }

    #[tokio::test]
    async fn test_purchase_debits_and_adds_item() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 1000).await;

        let receipt = engine(&ledger).purchase(alice, "cup").await.unwrap();

        assert_eq!(receipt.price, Coins::new(20));
        assert_eq!(receipt.balance, Coins::new(980));
        assert_eq!(receipt.quantity, 1);
        assert_eq!(ledger.quantity(alice, "cup").await, 1);
    }

    #[tokio::test]
    async fn test_repeat_purchase_increments_quantity() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 1000).await;
        let engine = engine(&ledger);

        engine.purchase(alice, "pen").await.unwrap();
        let receipt = engine.purchase(alice, "pen").await.unwrap();

        assert_eq!(receipt.quantity, 2);
        assert_eq!(ledger.quantity(alice, "pen").await, 2);
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(980)));
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 1000).await;

        let err = engine(&ledger).purchase(alice, "spaceship").await.unwrap_err();

        assert!(matches!(err, EngineError::Business(CoreError::ItemNotFound(_))));
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(1000)));
    }

    #[tokio::test]
    async fn test_cannot_afford() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 499).await;

        let err = engine(&ledger).purchase(alice, "pink-hoody").await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::Business(CoreError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.quantity(alice, "pink-hoody").await, 0);
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(499)));
    }

    #[tokio::test]
    async fn test_exact_price_allowed() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;

        let receipt = engine(&ledger).purchase(alice, "pink-hoody").await.unwrap();

        assert!(receipt.balance.is_zero());
    }

    #[tokio::test]
    async fn test_inventory_failure_refunds() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 1000).await;
        ledger.faults.fail_upsert.store(true, Ordering::SeqCst);

        let err = engine(&ledger).purchase(alice, "cup").await.unwrap_err();

        assert!(matches!(err, EngineError::Store(StoreError::QueryFailed(_))));
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(1000)));
        assert_eq!(ledger.quantity(alice, "cup").await, 0);
    }

    #[tokio::test]
    async fn test_malformed_item_name() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 1000).await;

        let err = engine(&ledger).purchase(alice, "cup; --").await.unwrap_err();

        assert!(matches!(err, EngineError::Business(CoreError::Validation(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_purchases_never_overdraw() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 50).await;
        let engine = engine(&ledger);

        let mut handles = Vec::new();
        for _ in 0..5 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move { engine.purchase(alice, "pen").await }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }

        assert_eq!(ok, 5);
        assert_eq!(ledger.balance(alice).await, Some(Coins::zero()));

        let err = engine.purchase(alice, "pen").await.unwrap_err();
        assert!(matches!(err, EngineError::Business(CoreError::InsufficientFunds { .. })));
        assert_eq!(ledger.quantity(alice, "pen").await, 5);
    }
}

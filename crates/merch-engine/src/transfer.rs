//! # Transfer Engine
//!
//! Moves coins from one user to another as a single unit of work.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  transfer(alice, "bob", 100)                                            │
//! │                                                                         │
//! │  validate amount > 0 ──────────────────────────► Validation            │
//! │       │                                                                 │
//! │  begin ─► lock alice's wallet (balance 500) ───► UserNotFound          │
//! │       │                                                                 │
//! │  resolve "bob" ────────────────────────────────► RecipientNotFound     │
//! │       │                                                                 │
//! │  bob == alice? ────────────────────────────────► SelfTransfer          │
//! │       │                                                                 │
//! │  500 < 100? ───────────────────────────────────► InsufficientFunds     │
//! │       │                                                                 │
//! │  alice -= 100, bob += 100, append history                              │
//! │       │                                                                 │
//! │  commit                                                                 │
//! │                                                                         │
//! │  Any arrow to the right rolls the unit back: no debit, no credit,      │
//! │  no history row.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sender's wallet lock is the only lock taken and is taken first, so two
//! opposite transfers (A→B and B→A) queue instead of deadlocking.

use merch_core::store::{LedgerStore, TransferOps, WalletLock};
use merch_core::validation::validate_amount;
use merch_core::{Coins, CoreError, TransferReceipt, UserId};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::unit::{finish, with_deadline};

/// Peer-to-peer coin transfers over any ledger store.
#[derive(Debug, Clone)]
pub struct TransferEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S> TransferEngine<S>
where
    S: LedgerStore,
    S::Tx: TransferOps,
{
    /// Creates an engine over `store`.
    pub fn new(store: S, config: EngineConfig) -> Self {
        TransferEngine { store, config }
    }

    /// Transfers `amount` coins from `from` to the user named `to_username`.
    ///
    /// ## Errors
    /// * `Business(Validation)` - `amount` is zero or negative
    /// * `Business(UserNotFound)` - `from` has no wallet
    /// * `Business(RecipientNotFound)` - no user named `to_username`
    /// * `Business(SelfTransfer)` - `to_username` is the sender
    /// * `Business(InsufficientFunds)` - balance at lock time < `amount`
    /// * `Store(_)` - backend failure, unit rolled back
    /// * `DeadlineExceeded` - unit did not finish within `operation_timeout`
    pub async fn transfer(
        &self,
        from: UserId,
        to_username: &str,
        amount: Coins,
    ) -> EngineResult<TransferReceipt> {
        validate_amount(amount)?;

        debug!(from = %from, to = %to_username, amount = %amount, "Transfer requested");

        with_deadline(
            self.config.operation_timeout,
            "transfer",
            self.run(from, to_username, amount),
        )
        .await
    }

    async fn run(&self, from: UserId, to_username: &str, amount: Coins) -> EngineResult<TransferReceipt> {
        let mut unit = self.store.begin().await?;
        let result = Self::apply(&mut unit, from, to_username, amount).await;
        let receipt = finish(unit, result).await?;

        info!(
            from = %receipt.from_user,
            to = %receipt.to_user,
            amount = %receipt.amount,
            sender_balance = %receipt.sender_balance,
            "Transfer committed"
        );

        Ok(receipt)
    }

    async fn apply(
        unit: &mut S::Tx,
        from: UserId,
        to_username: &str,
        amount: Coins,
    ) -> EngineResult<TransferReceipt> {
        let balance = unit
            .lock_wallet_for_update(from)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(from.to_string()))?;

        let to = match unit.resolve_user(to_username).await? {
            Some(id) => id,
            None => {
                warn!(from = %from, to = %to_username, "Transfer rejected: unknown recipient");
                return Err(CoreError::RecipientNotFound(to_username.to_string()).into());
            }
        };

        if to == from {
            warn!(from = %from, "Transfer rejected: self-transfer");
            return Err(CoreError::SelfTransfer.into());
        }

        if !balance.covers(amount) {
            warn!(
                from = %from,
                available = %balance,
                requested = %amount,
                "Transfer rejected: insufficient funds"
            );
            return Err(CoreError::InsufficientFunds {
                available: balance,
                requested: amount,
            }
            .into());
        }

        let sender_balance = unit.adjust_balance(from, -amount).await?;
        unit.adjust_balance(to, amount).await?;
        let record = unit.append_transfer(from, to, amount).await?;

        Ok(TransferReceipt {
            transfer_id: record.id,
            from_user: from,
            to_user: to,
            amount,
            sender_balance,
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
    use merch_core::{StoreError, ValidationError};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn engine(ledger: &MemoryLedger) -> TransferEngine<MemoryLedger> {
        TransferEngine::new(ledger.clone(), EngineConfig::default())
    }

    #[tokio::test]
    async fn test_transfer_moves_coins_and_records_history() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;
        let bob = ledger.add_user("bob", 0).await;

        let receipt = engine(&ledger)
            .transfer(alice, "bob", Coins::new(100))
            .await
            .unwrap();

        assert_eq!(receipt.transfer_id, 1);
        assert_eq!(receipt.sender_balance, Coins::new(400));
        assert_eq!(receipt.to_user, bob);
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(400)));
        assert_eq!(ledger.balance(bob).await, Some(Coins::new(100)));
        assert_eq!(ledger.transfers().await, vec![(alice, bob, Coins::new(100))]);
    }

    #[tokio::test]
    async fn test_insufficient_funds_changes_nothing() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 100).await;
        let bob = ledger.add_user("bob", 0).await;

        let err = engine(&ledger)
            .transfer(alice, "bob", Coins::new(5000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::Business(CoreError::InsufficientFunds { available, requested })
                if available == Coins::new(100) && requested == Coins::new(5000)
        ));
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(100)));
        assert_eq!(ledger.balance(bob).await, Some(Coins::zero()));
        assert!(ledger.transfers().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_recipient() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;

        let err = engine(&ledger)
            .transfer(alice, "nonexistent", Coins::new(10))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Business(CoreError::RecipientNotFound(ref n)) if n == "nonexistent"));
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(500)));
        assert!(ledger.transfers().await.is_empty());
    }

    #[tokio::test]
    async fn test_self_transfer_rejected() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;

        let err = engine(&ledger)
            .transfer(alice, "alice", Coins::new(10))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Business(CoreError::SelfTransfer)));
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(500)));
    }

    #[tokio::test]
    async fn test_exact_balance_drains_wallet() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 250).await;
        ledger.add_user("bob", 0).await;

        let receipt = engine(&ledger)
            .transfer(alice, "bob", Coins::new(250))
            .await
            .unwrap();

        assert!(receipt.sender_balance.is_zero());
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;
        ledger.add_user("bob", 0).await;

        for amount in [0, -5] {
            let err = engine(&ledger)
                .transfer(alice, "bob", Coins::new(amount))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                EngineError::Business(CoreError::Validation(ValidationError::MustBePositive { .. }))
            ));
        }
        assert!(ledger.transfers().await.is_empty());
    }

    #[tokio::test]
    async fn test_sender_without_wallet() {
        let ledger = MemoryLedger::new();
        ledger.add_user("bob", 0).await;

        let err = engine(&ledger)
            .transfer(UserId(77), "bob", Coins::new(1))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Business(CoreError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_history_failure_rolls_back_debit_and_credit() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;
        let bob = ledger.add_user("bob", 0).await;
        ledger.faults.fail_append.store(true, Ordering::SeqCst);

        let err = engine(&ledger)
            .transfer(alice, "bob", Coins::new(100))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Store(StoreError::QueryFailed(_))));
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(500)));
        assert_eq!(ledger.balance(bob).await, Some(Coins::zero()));
        assert!(ledger.transfers().await.is_empty());
    }

    #[tokio::test]
    async fn test_commit_failure_surfaces_as_retryable() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;
        ledger.add_user("bob", 0).await;
        ledger.faults.fail_commit.store(true, Ordering::SeqCst);

        let err = engine(&ledger)
            .transfer(alice, "bob", Coins::new(100))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(500)));
    }

    #[tokio::test]
    async fn test_deadline_rolls_back() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;
        ledger.add_user("bob", 0).await;
        ledger.faults.lock_delay_ms.store(200, Ordering::SeqCst);

        let engine = TransferEngine::new(
            ledger.clone(),
            EngineConfig::default().with_operation_timeout(Duration::from_millis(20)),
        );
        let err = engine
            .transfer(alice, "bob", Coins::new(100))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::DeadlineExceeded));
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(500)));
        assert!(ledger.transfers().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transfers_exactly_one_succeeds() {
        let ledger = MemoryLedger::new();
        let alice = ledger.add_user("alice", 500).await;
        let bob = ledger.add_user("bob", 0).await;
        let engine = engine(&ledger);

        let (a, b) = tokio::join!(
            engine.transfer(alice, "bob", Coins::new(300)),
            engine.transfer(alice, "bob", Coins::new(300)),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(ledger.balance(alice).await, Some(Coins::new(200)));
        assert_eq!(ledger.balance(bob).await, Some(Coins::new(300)));
        assert_eq!(ledger.total_supply().await, Coins::new(500));
    }
}

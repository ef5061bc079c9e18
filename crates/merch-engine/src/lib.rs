//! # merch-engine: Transfer and Purchase Engines
//!
//! The two operations that move coins, each run as one atomic unit of work
//! on a [`LedgerStore`](merch_core::store::LedgerStore).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   shop-api handler (caller identity already resolved to a UserId)      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────────────┐      ┌──────────────────────┐               │
//! │   │   TransferEngine     │      │   PurchaseEngine     │   ◄── HERE    │
//! │   │   S::Tx: TransferOps │      │   S::Tx: PurchaseOps │               │
//! │   └──────────┬───────────┘      └──────────┬───────────┘               │
//! │              └──────────────┬──────────────┘                           │
//! │                             ▼                                           │
//! │                 LedgerStore (merch-db SqliteLedger)                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - Every call is all-or-nothing: on any error nothing is persisted.
//! - The sender/buyer wallet lock is the first thing taken and the only
//!   lock, so concurrent calls serialize without deadlock.
//! - A balance never goes below zero.
//! - Each call runs under [`EngineConfig::operation_timeout`].
//! - No automatic retries: [`EngineError::is_retryable`] tells the caller
//!   whether trying again may help.
//!
//! ## Usage
//! ```rust,ignore
//! use merch_engine::{EngineConfig, TransferEngine};
//!
//! let engine = TransferEngine::new(db.ledger(), EngineConfig::default());
//! let receipt = engine.transfer(alice, "bob", Coins::new(100)).await?;
//! ```

pub mod config;
pub mod error;
pub mod purchase;
pub mod transfer;

mod unit;

#[cfg(test)]
mod memory;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use purchase::PurchaseEngine;
pub use transfer::TransferEngine;

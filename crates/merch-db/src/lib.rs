//! # merch-db: Ledger Store for the Merch Shop
//!
//! SQLite-backed persistence for users, wallets, the item catalog,
//! inventory and coin history, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Merch Shop Layers                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/shop-api (axum)                         │   │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘   │
//! │                  │ reads, registration         │ transfers, purchases  │
//! │                  ▼                             ▼                       │
//! │  ┌───────────────────────────┐   ┌─────────────────────────────────┐   │
//! │  │  merch-db repositories    │   │  merch-engine                   │   │
//! │  └─────────────┬─────────────┘   └───────────────┬─────────────────┘   │
//! │                │                                 │ LedgerStore traits  │
//! │                │                                 ▼                     │
//! │                │                 ┌─────────────────────────────────┐   │
//! │                │                 │  merch-db SqliteLedger (HERE)   │   │
//! │                │                 └───────────────┬─────────────────┘   │
//! │                ▼                                 ▼                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      SQLite (WAL)                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Users, catalog/inventory, coin history
//! - [`ledger`] - Units of work for the engines
//! - [`password`] - Argon2 credential hashing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use merch_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./merch.db")).await?;
//!
//! let user = db.users().create_with_wallet("alice", &hash).await?;
//! let info = db.users().info(user.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::{SqliteLedger, SqliteUnit};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::history::HistoryRepository;
pub use repository::item::ItemRepository;
pub use repository::user::UserRepository;

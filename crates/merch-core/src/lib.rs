//! # merch-core: Pure Business Logic for the Merch Shop
//!
//! This crate is the **heart** of the merch shop. It owns the domain types,
//! the coin arithmetic, the error taxonomy and the store capability traits
//! the engines are written against. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Merch Shop Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    shop-api (axum)                              │   │
//! │  │    /api/auth ──► /api/info ──► /api/buy/{item} ──► /api/sendCoin│   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    merch-engine                                 │   │
//! │  │         TransferEngine            PurchaseEngine                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ store traits                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ merch-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   coins   │  │   store   │  │ validation│  │   │
//! │  │   │   User    │  │   Coins   │  │ LedgerStore│ │   rules   │  │   │
//! │  │   │   Item    │  │           │  │ TransferOps│ │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │                    merch-db (SQLite ledger)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Item, CoinTransfer, UserInfo, etc.)
//! - [`coins`] - Coin amount type with checked integer arithmetic
//! - [`error`] - Domain and store error types
//! - [`validation`] - Input validation rules
//! - [`store`] - Capability traits a ledger backend must satisfy
//!
//! ## Example Usage
//!
//! ```rust
//! use merch_core::Coins;
//!
//! let balance = Coins::new(500);
//! let price = Coins::new(300);
//!
//! assert!(balance.covers(price));
//! assert_eq!((balance - price).amount(), 200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coins;
pub mod error;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use coins::Coins;
pub use error::{CoreError, CoreResult, StoreError, StoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Coins granted to a wallet when its user auto-registers.
pub const STARTING_BALANCE: Coins = Coins::new(1000);

/// Maximum length of a username.
pub const MAX_USERNAME_LEN: usize = 255;

/// Minimum length of a password.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Maximum length of a password.
pub const MAX_PASSWORD_LEN: usize = 128;

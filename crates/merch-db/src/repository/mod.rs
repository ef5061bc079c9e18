//! # Repository Module
//!
//! Read-side and registration access to the ledger database.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Touches What                                     │
//! │                                                                         │
//! │  shop-api handlers                                                     │
//! │       │                                                                 │
//! │       ├── db.users()    register, login lookup, balance, user info     │
//! │       ├── db.items()    catalog, inventory                             │
//! │       └── db.history()  received / sent transfers                      │
//! │                                                                         │
//! │  merch-engine                                                          │
//! │       └── db.ledger()   units of work (see ledger.rs)                  │
//! │                                                                         │
//! │  Repositories never debit or credit a wallet. Balance changes only     │
//! │  happen inside ledger units of work.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Users, wallets, user info
//! - [`ItemRepository`](item::ItemRepository) - Catalog and inventory
//! - [`HistoryRepository`](history::HistoryRepository) - Coin history

pub mod history;
pub mod item;
pub mod user;

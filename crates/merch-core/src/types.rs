//! # Domain Types
//!
//! Core domain types used throughout the merch shop.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Wallet      │   │      Item       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UserId)    │1─1│  user_id        │   │  id (ItemId)    │       │
//! │  │  username       │   │  balance ≥ 0    │   │  name (unique)  │       │
//! │  │  password_hash  │   └─────────────────┘   │  price > 0      │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐     │
//! │  │ InventoryItem   │   │          CoinTransfer (append-only)     │     │
//! │  │  ─────────────  │   │  ─────────────────────────────────────  │     │
//! │  │  (user, item)   │   │  from_user → to_user, amount > 0        │     │
//! │  │  quantity ≥ 1   │   │  created_at                             │     │
//! │  └─────────────────┘   └─────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coins::Coins;

// =============================================================================
// Identifiers
// =============================================================================

/// Immutable user identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered shop user.
///
/// Users are created on their first successful authentication and never
/// deleted. The wallet is created in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,

    /// Login name, unique across users.
    pub username: String,

    /// Argon2 PHC string. Never serialized back to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Item
// =============================================================================

/// A merch catalog entry. Read-only to the engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Coins,
}

/// One line of a user's inventory: how many of an item they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item name (the original API calls this the item "type").
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i64,
}

// =============================================================================
// Coin History
// =============================================================================

/// An immutable record of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinTransfer {
    pub id: i64,
    pub from_user: UserId,
    pub to_user: UserId,
    pub amount: Coins,
    pub created_at: DateTime<Utc>,
}

/// A transfer seen from the recipient's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedCoins {
    pub from_user: String,
    pub amount: Coins,
}

/// A transfer seen from the sender's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentCoins {
    pub to_user: String,
    pub amount: Coins,
}

/// Both directions of a user's transfer history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    pub received: Vec<ReceivedCoins>,
    pub sent: Vec<SentCoins>,
}

/// Everything the info endpoint reports about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub coins: Coins,
    pub inventory: Vec<InventoryItem>,
    pub coin_history: CoinHistory,
}

// =============================================================================
// Engine Results
// =============================================================================

/// Outcome of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Id of the history row written by this transfer.
    pub transfer_id: i64,
    pub from_user: UserId,
    pub to_user: UserId,
    pub amount: Coins,
    /// Sender balance after the debit.
    pub sender_balance: Coins,
}

/// Outcome of a committed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub user_id: UserId,
    pub item: String,
    pub price: Coins,
    /// Buyer balance after the debit.
    pub balance: Coins,
    /// Quantity of this item owned after the purchase.
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

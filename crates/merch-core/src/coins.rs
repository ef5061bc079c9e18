//! # Coins Module
//!
//! Provides the `Coins` type for wallet balances, prices and transfer amounts.
//!
//! ## Why a Newtype?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE COINS FLOW                                                       │
//! │                                                                         │
//! │  Wallet.balance ──┬──► Transfer amount ──► Recipient wallet             │
//! │                   │                                                     │
//! │                   └──► Item.price ──► Inventory row                     │
//! │                                                                         │
//! │  Every amount that moves between wallets flows through this type, so   │
//! │  a user id or a quantity can never be passed where coins are expected. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Coins are whole integers. Balances are never negative at a commit
//! boundary; a negative `Coins` only ever exists as a debit delta handed to
//! the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

// =============================================================================
// Coins Type
// =============================================================================

/// An amount of shop coins.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative deltas for debits
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Transparent serde**: Serializes as a bare JSON number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Coins(i64);

impl Coins {
    /// Creates a coin amount.
    ///
    /// ## Example
    /// ```rust
    /// use merch_core::Coins;
    ///
    /// let price = Coins::new(300);
    /// assert_eq!(price.amount(), 300);
    /// ```
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Coins(amount)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Zero coins.
    #[inline]
    pub const fn zero() -> Self {
        Coins(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns true when this balance is enough to pay `cost`.
    ///
    /// The rule is `balance >= cost`: paying exactly the whole balance is
    /// allowed and leaves the wallet at zero.
    ///
    /// ## Example
    /// ```rust
    /// use merch_core::Coins;
    ///
    /// assert!(Coins::new(100).covers(Coins::new(100)));
    /// assert!(!Coins::new(99).covers(Coins::new(100)));
    /// ```
    #[inline]
    pub const fn covers(&self, cost: Coins) -> bool {
        self.0 >= cost.0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Coins) -> Option<Coins> {
        self.0.checked_add(other.0).map(Coins)
    }

    /// Subtracts two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Coins) -> Option<Coins> {
        self.0.checked_sub(other.0).map(Coins)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} coins", self.0)
    }
}

impl Default for Coins {
    fn default() -> Self {
        Coins::zero()
    }
}

impl From<i64> for Coins {
    fn from(amount: i64) -> Self {
        Coins(amount)
    }
}

impl Add for Coins {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Coins(self.0 + other.0)
    }
}

impl AddAssign for Coins {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Coins {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Coins(self.0 - other.0)
    }
}

impl SubAssign for Coins {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation turns a credit into the matching debit delta.
impl Neg for Coins {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Coins(-self.0)
    }
}

impl std::iter::Sum for Coins {
    fn sum<I: Iterator<Item = Coins>>(iter: I) -> Self {
        iter.fold(Coins::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_is_inclusive() {
        let balance = Coins::new(500);
        assert!(balance.covers(Coins::new(499)));
        assert!(balance.covers(Coins::new(500)));
        assert!(!balance.covers(Coins::new(501)));
    }

    #[test]
    fn test_arithmetic() {
        let a = Coins::new(1000);
        let b = Coins::new(300);

        assert_eq!((a + b).amount(), 1300);
        assert_eq!((a - b).amount(), 700);
        assert_eq!((-b).amount(), -300);

        let mut c = a;
        c -= b;
        c += Coins::new(50);
        assert_eq!(c.amount(), 750);
    }

    #[test]
    fn test_checked_overflow() {
        assert_eq!(Coins::new(i64::MAX).checked_add(Coins::new(1)), None);
        assert_eq!(Coins::new(i64::MIN).checked_sub(Coins::new(1)), None);
        assert_eq!(
            Coins::new(10).checked_sub(Coins::new(3)),
            Some(Coins::new(7))
        );
    }

    #[test]
    fn test_sign_checks() {
        assert!(Coins::zero().is_zero());
        assert!(Coins::new(1).is_positive());
        assert!(Coins::new(-1).is_negative());
        assert!(!Coins::zero().is_positive());
    }

    #[test]
    fn test_sum_of_balances() {
        let total: Coins = [100, 200, 700].into_iter().map(Coins::new).sum();
        assert_eq!(total, Coins::new(1000));
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Coins::new(42).to_string(), "42 coins");
        assert_eq!(serde_json::to_string(&Coins::new(42)).unwrap(), "42");
        let parsed: Coins = serde_json::from_str("17").unwrap();
        assert_eq!(parsed, Coins::new(17));
    }
}

//! # Validation Module
//!
//! Input validation run before any transaction is opened.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (shop-api)                                   │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Usernames, passwords, amounts                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (balance >= 0), CHECK (amount > 0)                          │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use merch_core::validation::{validate_amount, validate_username};
//! use merch_core::Coins;
//!
//! validate_username("alice").unwrap();
//! validate_amount(Coins::new(100)).unwrap();
//! assert!(validate_amount(Coins::zero()).is_err());
//! ```

use crate::coins::Coins;
use crate::error::ValidationError;
use crate::{MAX_PASSWORD_LEN, MAX_USERNAME_LEN, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a username (login or transfer recipient).
///
/// ## Rules
/// - Must not be empty
/// - At most 255 characters
/// - ASCII letters and digits only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    validate_alphanumeric("username", username, 1, MAX_USERNAME_LEN)
}

/// Validates a password supplied at authentication.
///
/// ## Rules
/// - Between 4 and 128 characters
/// - ASCII letters and digits only
pub fn validate_password(password: &str) -> ValidationResult<()> {
    validate_alphanumeric("password", password, MIN_PASSWORD_LEN, MAX_PASSWORD_LEN)
}

/// Validates an item name from the purchase path.
///
/// Catalog names contain hyphens (`pink-hoody`, `t-shirt`), so hyphens are
/// allowed here.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "item".to_string(),
        });
    }

    if name.len() > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "item".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "item".to_string(),
            reason: "must contain only letters, numbers and hyphens".to_string(),
        });
    }

    Ok(())
}

fn validate_alphanumeric(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters and numbers".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a transfer amount.
///
/// ## Rules
/// - Must be strictly positive
pub fn validate_amount(amount: Coins) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("user42").is_ok());
        assert!(matches!(
            validate_username(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_username("bad name"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_username(&"a".repeat(256)),
            Err(ValidationError::TooLong { max: 255, .. })
        ));
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("pass").is_ok());
        assert!(matches!(
            validate_password("abc"),
            Err(ValidationError::TooShort { min: 4, .. })
        ));
        assert!(validate_password(&"p".repeat(129)).is_err());
        assert!(validate_password("pa$$word").is_err());
    }

    #[test]
    fn test_item_name_allows_hyphens() {
        assert!(validate_item_name("pink-hoody").is_ok());
        assert!(validate_item_name("t-shirt").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("cup; drop").is_err());
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(validate_amount(Coins::new(1)).is_ok());
        assert!(validate_amount(Coins::zero()).is_err());
        assert!(validate_amount(Coins::new(-5)).is_err());
    }
}

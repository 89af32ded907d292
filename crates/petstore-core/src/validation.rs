//! # Validation Module
//!
//! Input validation utilities for the pet store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Domain record (check_data)                                   │
//! │  ├── Required fields, positive costs and quantities                    │
//! │  └── Built from the helpers in THIS MODULE                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service (petstore-db)                                        │
//! │  ├── Referenced parents exist, credit card is acceptable               │
//! │  └── Passwords match                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY uniqueness (DuplicateKey)                             │
//! │  ├── CHECK constraints on costs and quantities                         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use petstore_core::validation::{validate_quantity, validate_search_keyword};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert_eq!(validate_search_keyword("  poodle ").unwrap(), "poodle");
//! ```

use chrono::{Datelike, NaiveDate};

use crate::error::ValidationError;
use crate::types::CreditCard;
use crate::{ACCEPTED_CARD_TYPES, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest name or description accepted for a catalog record.
pub const MAX_TEXT_LEN: usize = 255;

/// Longest search keyword accepted.
pub const MAX_KEYWORD_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Fails with `Required` when `value` is empty or whitespace only.
pub fn require(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates a free-text attribute such as a name or a description.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_TEXT_LEN`] characters
pub fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    require(field, value)?;

    if value.trim().chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates an identifier passed in by a caller.
///
/// Returns the trimmed id so callers look up exactly what was checked.
pub fn validate_id<'a>(field: &str, id: &'a str) -> ValidationResult<&'a str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(id)
}

/// Validates a catalog search keyword.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_KEYWORD_LEN`] characters
///
/// ## Returns
/// The trimmed keyword.
pub fn validate_search_keyword(keyword: &str) -> ValidationResult<String> {
    let keyword = keyword.trim();

    if keyword.is_empty() {
        return Err(ValidationError::required("keyword"));
    }

    if keyword.chars().count() > MAX_KEYWORD_LEN {
        return Err(ValidationError::TooLong {
            field: "keyword".to_string(),
            max: MAX_KEYWORD_LEN,
        });
    }

    Ok(keyword.to_string())
}

/// A password must be supplied before it can be hashed or compared.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit cost in cents. Free items are not sold.
pub fn validate_unit_cost_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "unit cost".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Credit Card Validators
// =============================================================================

/// Verifies that a credit card can be charged on `today`.
///
/// ## Checks
/// ```text
/// card_type    ──► one of ACCEPTED_CARD_TYPES
/// card_number  ──► 13..=19 digits (spaces/hyphens ignored), Luhn checksum
/// card_expiry  ──► "MM/YY", not before the month of `today`
/// ```
///
/// `today` is a parameter so the check stays pure.
pub fn validate_credit_card(card: &CreditCard, today: NaiveDate) -> ValidationResult<()> {
    require("credit card number", &card.card_number)?;
    require("credit card type", &card.card_type)?;
    require("credit card expiry date", &card.card_expiry)?;

    if !ACCEPTED_CARD_TYPES.contains(&card.card_type.trim()) {
        return Err(ValidationError::NotAllowed {
            field: "credit card type".to_string(),
            allowed: ACCEPTED_CARD_TYPES.iter().map(|t| t.to_string()).collect(),
        });
    }

    let digits: Vec<u32> = card
        .card_number
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .map(|c| c.to_digit(10))
        .collect::<Option<_>>()
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "credit card number".to_string(),
            reason: "must contain only digits".to_string(),
        })?;

    if !(13..=19).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "credit card number".to_string(),
            reason: "must have between 13 and 19 digits".to_string(),
        });
    }

    if !passes_luhn(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "credit card number".to_string(),
            reason: "checksum failed".to_string(),
        });
    }

    let (year, month) = parse_card_expiry(&card.card_expiry)?;
    if (year, month) < (today.year(), today.month()) {
        return Err(ValidationError::InvalidFormat {
            field: "credit card expiry date".to_string(),
            reason: "card has expired".to_string(),
        });
    }

    Ok(())
}

/// Parses a `MM/YY` expiry date into `(year, month)`.
pub fn parse_card_expiry(expiry: &str) -> ValidationResult<(i32, u32)> {
    let invalid = || ValidationError::InvalidFormat {
        field: "credit card expiry date".to_string(),
        reason: "expected MM/YY".to_string(),
    };

    let (month, year) = expiry.trim().split_once('/').ok_or_else(invalid)?;
    if month.len() != 2 || year.len() != 2 {
        return Err(invalid());
    }

    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }

    Ok((2000 + year, month))
}

fn passes_luhn(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str, card_type: &str, expiry: &str) -> CreditCard {
        CreditCard {
            card_number: number.to_string(),
            card_type: card_type.to_string(),
            card_expiry: expiry.to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_require_and_text() {
        assert!(require("name", "Fish").is_ok());
        assert_eq!(require("name", "   "), Err(ValidationError::required("name")));
        assert!(validate_text("name", &"A".repeat(MAX_TEXT_LEN)).is_ok());
        assert!(validate_text("name", &"A".repeat(MAX_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_id_trims() {
        assert_eq!(validate_id("id", "  C1 ").unwrap(), "C1");
        assert!(validate_id("id", "").is_err());
    }

    #[test]
    fn test_validate_search_keyword() {
        assert_eq!(validate_search_keyword(" Goldfish ").unwrap(), "Goldfish");
        assert!(validate_search_keyword("").is_err());
        assert!(validate_search_keyword(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_unit_cost() {
        assert!(validate_unit_cost_cents(1).is_ok());
        assert!(validate_unit_cost_cents(0).is_err());
        assert!(validate_unit_cost_cents(-10).is_err());
    }

    #[test]
    fn test_valid_credit_card() {
        let visa = card("4111 1111 1111 1111", "Visa", "12/27");
        assert!(validate_credit_card(&visa, today()).is_ok());

        // Still valid during its expiry month
        let edge = card("5500-0000-0000-0004", "Master Card", "10/26");
        assert!(validate_credit_card(&edge, today()).is_ok());
    }

    #[test]
    fn test_invalid_credit_cards() {
        let bad_luhn = card("4111111111111112", "Visa", "12/27");
        assert!(matches!(
            validate_credit_card(&bad_luhn, today()),
            Err(ValidationError::InvalidFormat { .. })
        ));

        let expired = card("4111111111111111", "Visa", "09/26");
        assert!(validate_credit_card(&expired, today()).is_err());

        let unknown_type = card("4111111111111111", "Diners", "12/27");
        assert!(matches!(
            validate_credit_card(&unknown_type, today()),
            Err(ValidationError::NotAllowed { .. })
        ));

        let letters = card("4111abcd11111111", "Visa", "12/27");
        assert!(validate_credit_card(&letters, today()).is_err());

        let blank = CreditCard::default();
        assert!(matches!(
            validate_credit_card(&blank, today()),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_parse_card_expiry() {
        assert_eq!(parse_card_expiry("01/30").unwrap(), (2030, 1));
        assert!(parse_card_expiry("13/30").is_err());
        assert!(parse_card_expiry("1/30").is_err());
        assert!(parse_card_expiry("0130").is_err());
    }
}

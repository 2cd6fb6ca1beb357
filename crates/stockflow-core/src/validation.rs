//! # Validation Module
//!
//! Parsing and validation of the string fields a batch row arrives with.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form                                                      │
//! │  └── Immediate feedback while staging rows                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (before any storage work)                        │
//! │  ├── Dates parse to real calendar dates                                │
//! │  ├── Quantities are positive whole numbers                             │
//! │  └── Ids and user names are present and bounded                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine (inside the batch transaction)                        │
//! │  ├── Locations exist and have the right kind                           │
//! │  └── Stock and cash are sufficient                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite                                                       │
//! │  └── CHECK (quantity >= 0), foreign keys, immutability triggers        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::MAX_ROW_QUANTITY;

/// Result type for field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted identifier.
const MAX_ID_LEN: usize = 64;

/// Date formats accepted from the UI, tried in order.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

// =============================================================================
// Dates
// =============================================================================

/// Parses a business date.
///
/// ## Rules
/// - Locale form `DD/MM/YYYY` (what the date pickers emit) or ISO `YYYY-MM-DD`
/// - Must be a real calendar date: `31/02/2024` is rejected
///
/// ## Example
/// ```rust
/// use stockflow_core::validation::parse_date;
///
/// assert_eq!(parse_date("20/02/2024").unwrap().to_string(), "2024-02-20");
/// assert_eq!(parse_date("2024-02-20").unwrap().to_string(), "2024-02-20");
/// assert!(parse_date("30/02/2024").is_err());
/// ```
pub fn parse_date(value: &str) -> CoreResult<NaiveDate> {
    let trimmed = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| CoreError::InvalidDate {
            value: value.to_string(),
        })
}

// =============================================================================
// Numbers
// =============================================================================

/// Parses a row quantity.
///
/// ## Rules
/// - Whole number, no sign, no decimals
/// - Between 1 and [`MAX_ROW_QUANTITY`]
///
/// ## Example
/// ```rust
/// use stockflow_core::validation::parse_quantity;
///
/// assert_eq!(parse_quantity(" 50 ").unwrap(), 50);
/// assert!(parse_quantity("0").is_err());
/// assert!(parse_quantity("2.5").is_err());
/// assert!(parse_quantity("-3").is_err());
/// ```
pub fn parse_quantity(value: &str) -> CoreResult<i64> {
    let trimmed = value.trim();

    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::invalid_quantity(value));
    }

    let qty: i64 = trimmed
        .parse()
        .map_err(|_| CoreError::invalid_quantity(value))?;

    validate_quantity(qty).map_err(|_| CoreError::invalid_quantity(value))?;
    Ok(qty)
}

/// Validates an already-numeric quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 || qty > MAX_ROW_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ROW_QUANTITY,
        });
    }

    Ok(())
}

/// Parses a strictly positive monetary amount (withdrawals).
///
/// ## Example
/// ```rust
/// use stockflow_core::validation::parse_positive_amount;
///
/// assert_eq!(parse_positive_amount("70.00").unwrap().cents(), 7000);
/// assert!(parse_positive_amount("0").is_err());
/// assert!(parse_positive_amount("-1").is_err());
/// ```
pub fn parse_positive_amount(value: &str) -> CoreResult<Money> {
    let amount: Money = value.parse()?;

    if !amount.is_positive() {
        return Err(CoreError::InvalidAmount {
            value: value.to_string(),
        });
    }

    Ok(amount)
}

/// Validates a minimum-stock threshold.
pub fn validate_min_stock(min_stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_ROW_QUANTITY).contains(&min_stock) {
        return Err(ValidationError::OutOfRange {
            field: "min_stock".to_string(),
            min: 0,
            max: MAX_ROW_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates an opaque identifier (location, product, store, user).
///
/// ## Rules
/// - Must not be blank
/// - At most 64 characters
///
/// Returns the trimmed id.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<String> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LEN,
        });
    }

    if id.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(id.to_string())
}

/// Validates a free-text name (provider company, product name).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        assert_eq!(parse_date("20/02/2024").unwrap(), expected);
        assert_eq!(parse_date("2024-02-20").unwrap(), expected);
        assert_eq!(parse_date(" 2024-02-20 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_impossible_dates() {
        for bad in ["31/02/2024", "29/02/2023", "2024-13-01", "", "yesterday", "20-02-2024"] {
            assert!(
                matches!(parse_date(bad), Err(CoreError::InvalidDate { .. })),
                "{bad:?} should be rejected"
            );
        }
        // Leap day exists in 2024
        assert!(parse_date("29/02/2024").is_ok());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("1").unwrap(), 1);
        assert_eq!(parse_quantity("50").unwrap(), 50);
        assert_eq!(parse_quantity("1000000").unwrap(), MAX_ROW_QUANTITY);

        for bad in ["0", "-1", "+1", "1.5", "", " ", "ten", "1000001", "99999999999999999999"] {
            assert!(
                matches!(parse_quantity(bad), Err(CoreError::InvalidQuantity { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_positive_amount() {
        assert_eq!(parse_positive_amount("0.01").unwrap().cents(), 1);
        assert!(parse_positive_amount("0.00").is_err());
        assert!(parse_positive_amount("-10").is_err());
        assert!(parse_positive_amount("ten").is_err());
    }

    #[test]
    fn test_validate_min_stock() {
        assert!(validate_min_stock(0).is_ok());
        assert!(validate_min_stock(25).is_ok());
        assert!(validate_min_stock(-1).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("product", "  P-1 ").unwrap(), "P-1");
        assert!(validate_id("product", "").is_err());
        assert!(validate_id("product", "   ").is_err());
        assert!(validate_id("product", &"x".repeat(65)).is_err());
        assert!(validate_id("product", "a\nb").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("provider", " Acme ").unwrap(), "Acme");
        assert!(validate_name("provider", "").is_err());
        assert!(validate_name("provider", &"A".repeat(201)).is_err());
    }
}

//! # Monetary Computation
//!
//! Derives the cost and sale valuation of a ledger row from the product's
//! reference prices.
//!
//! ## When Amounts Are Frozen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI stages row (qty 3)  ──►  submit batch  ──►  engine commits          │
//! │                                                    │                    │
//! │                                   read product prices inside the same   │
//! │                                   transaction, compute_amounts() ◄──────┤
//! │                                                    │                    │
//! │                                   amounts written on the ledger record  │
//! │                                   and never recomputed afterwards       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Amounts are never taken from the client payload. A price edited between
//! staging and commit is reflected in the committed record.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::MAX_ROW_QUANTITY;

/// Valuation of one ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Amounts {
    pub cost_amount: Money,
    pub sale_amount: Money,
}

impl std::ops::Add for Amounts {
    type Output = Amounts;

    fn add(self, other: Amounts) -> Amounts {
        Amounts {
            cost_amount: self.cost_amount + other.cost_amount,
            sale_amount: self.sale_amount + other.sale_amount,
        }
    }
}

/// Computes `{cost_price × quantity, sale_price × quantity}`.
///
/// ## Errors
/// A quantity outside `1..=MAX_ROW_QUANTITY` is a precondition failure of the
/// calling operation and is reported as [`CoreError::InvalidQuantity`] rather
/// than silently valued at zero.
///
/// ## Example
/// ```rust
/// use stockflow_core::amounts::compute_amounts;
/// use stockflow_core::types::Product;
///
/// let product = Product::new("p", "Tea", "unit", 850, 1999);
/// let amounts = compute_amounts(&product, 3).unwrap();
/// assert_eq!(amounts.cost_amount.to_string(), "25.50");
/// assert_eq!(amounts.sale_amount.to_string(), "59.97");
///
/// assert!(compute_amounts(&product, 0).is_err());
/// ```
pub fn compute_amounts(product: &Product, quantity: i64) -> CoreResult<Amounts> {
    if quantity <= 0 || quantity > MAX_ROW_QUANTITY {
        return Err(CoreError::invalid_quantity(quantity.to_string()));
    }

    let overflow = || CoreError::InvalidAmount {
        value: format!("{} x {}", product.id, quantity),
    };

    Ok(Amounts {
        cost_amount: product
            .cost_price
            .checked_multiply_quantity(quantity)
            .ok_or_else(overflow)?,
        sale_amount: product
            .sale_price
            .checked_multiply_quantity(quantity)
            .ok_or_else(overflow)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_amounts_are_exact() {
        let product = Product::new("P", "Coffee", "unit", 850, 1999);
        let amounts = compute_amounts(&product, 3).unwrap();

        assert_eq!(amounts.cost_amount, Money::from_cents(2550));
        assert_eq!(amounts.sale_amount, Money::from_cents(5997));
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        let product = Product::new("P", "Coffee", "unit", 850, 1999);

        assert!(matches!(
            compute_amounts(&product, 0),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            compute_amounts(&product, -4),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(compute_amounts(&product, MAX_ROW_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_free_product_has_zero_amounts() {
        let product = Product::new("P", "Sample", "unit", 0, 0);
        let amounts = compute_amounts(&product, 7).unwrap();
        assert_eq!(amounts, Amounts::default());
    }

    #[test]
    fn test_overflowing_price_is_rejected() {
        let product = Product::new("P", "Gold", "bar", i64::MAX / 2, 1);
        assert!(matches!(
            compute_amounts(&product, 3),
            Err(CoreError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_amounts_add() {
        let a = Amounts {
            cost_amount: Money::from_cents(100),
            sale_amount: Money::from_cents(200),
        };
        let sum = a + a;
        assert_eq!(sum.cost_amount.cents(), 200);
        assert_eq!(sum.sale_amount.cents(), 400);
    }
}

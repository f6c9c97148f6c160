//! # Refund Calculator
//!
//! Quotes how much goes back to the customer when items from a completed
//! sale are returned.
//!
//! ## User Workflow
//! ```text
//! Cashier opens invoice INV-1042
//!      │
//!      ▼
//! Picks lines and quantities to return ──► quote_refund()
//!      │                                     │
//!      │                                     ├── full line → whole line total
//!      │                                     └── part line → pro-rated, round2
//!      ▼
//! Types a reason (≥ 10 chars) ──► validate_return_reason()
//!      │
//!      ▼
//! Returns API records the return and restocks
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::ProductId;
use crate::validation::ValidationResult;

/// Shortest accepted return reason, in characters.
pub const MIN_RETURN_REASON_LEN: usize = 10;

/// One line of a completed sale, as recorded by the Sales API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SoldLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
    pub discount: Money,
}

impl SoldLine {
    /// What the customer actually paid for this line.
    ///
    /// Sale records come off the wire, so an amount outside the i64 range
    /// is reported as `InvalidAmount`.
    pub fn line_total(&self) -> CoreResult<Money> {
        self.unit_price
            .checked_multiply_quantity(self.quantity)
            .and_then(|gross| gross.checked_sub(self.discount))
            .ok_or_else(|| {
                CoreError::InvalidAmount(format!(
                    "line total for product {} is out of range",
                    self.product_id
                ))
            })
    }
}

/// A quantity of one product the customer is bringing back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReturnLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub refund: Money,
}

/// The refund owed for a set of return lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefundQuote {
    pub lines: Vec<RefundLine>,
    pub total_quantity: i64,
    pub total_refund: Money,
}

/// Prices `returns` against the lines of the original sale.
///
/// Return lines for the same product are checked against the sold quantity
/// together, so two partial returns cannot add up to more than was sold.
///
/// ```rust
/// use shopdesk_core::money::Money;
/// use shopdesk_core::returns::{quote_refund, ReturnLine, SoldLine};
/// use shopdesk_core::types::ProductId;
///
/// let sold = vec![SoldLine {
///     product_id: ProductId(1),
///     quantity: 3,
///     unit_price: Money::from_major(100),
///     discount: Money::zero(),
/// }];
/// let quote = quote_refund(&sold, &[ReturnLine { product_id: ProductId(1), quantity: 1 }]).unwrap();
/// assert_eq!(quote.total_refund, Money::from_major(100));
/// ```
pub fn quote_refund(sold: &[SoldLine], returns: &[ReturnLine]) -> CoreResult<RefundQuote> {
    let sold_by_product: HashMap<ProductId, &SoldLine> =
        sold.iter().map(|line| (line.product_id, line)).collect();
    let mut returned_so_far: HashMap<ProductId, i64> = HashMap::new();

    let mut lines = Vec::with_capacity(returns.len());
    for ret in returns {
        let sold_line = sold_by_product
            .get(&ret.product_id)
            .ok_or(CoreError::ProductNotInSale(ret.product_id))?;

        if ret.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "return quantity".to_string(),
            }
            .into());
        }

        let already = returned_so_far.entry(ret.product_id).or_insert(0);
        let requested = already.saturating_add(ret.quantity);
        if requested > sold_line.quantity {
            return Err(CoreError::ReturnExceedsSold {
                product_id: ret.product_id,
                sold: sold_line.quantity,
                requested,
            });
        }
        *already = requested;

        let line_total = sold_line.line_total()?;
        let refund = if ret.quantity == sold_line.quantity {
            line_total
        } else {
            line_total.pro_rata(ret.quantity, sold_line.quantity)
        };

        lines.push(RefundLine {
            product_id: ret.product_id,
            quantity: ret.quantity,
            refund,
        });
    }

    let total_refund = lines
        .iter()
        .try_fold(Money::zero(), |acc, line| acc.checked_add(line.refund))
        .ok_or_else(|| CoreError::InvalidAmount("refund total is out of range".to_string()))?;

    Ok(RefundQuote {
        // Each product's quantity is bounded by what was sold.
        total_quantity: lines
            .iter()
            .fold(0, |acc: i64, line| acc.saturating_add(line.quantity)),
        total_refund,
        lines,
    })
}

/// A return needs a reason the store manager can act on.
pub fn validate_return_reason(reason: &str) -> ValidationResult<()> {
    if reason.trim().chars().count() < MIN_RETURN_REASON_LEN {
        return Err(ValidationError::TooShort {
            field: "reason".to_string(),
            min: MIN_RETURN_REASON_LEN,
        });
    }

    Ok(())
}

//! # Pricing Engine
//!
//! Pure functions turning cart lines into the numbers on the checkout
//! panel. Nothing here is cached: the summary is recomputed from the lines
//! every time it is asked for, so it can never drift from the cart.
//!
//! ## Calculation Order
//! ```text
//! lines ──► Σ unit_price × quantity ──► subtotal     (exact, in paise)
//!                                          │
//!                                          ▼
//!                         tax = round2(subtotal × rate)
//!                                          │
//!                                          ▼
//!                         total = subtotal + tax
//! ```
//!
//! Because every amount is already whole paise, "round2" only ever happens
//! once, on the tax multiplication.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::LineItem;
use crate::money::Money;
use crate::types::TaxRate;

/// Checkout totals derived from a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingSummary {
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub total: Money,
    /// Distinct lines.
    pub item_count: usize,
    /// Units across all lines.
    pub total_quantity: i64,
}

impl PricingSummary {
    /// The summary of an empty cart at the given rate.
    pub fn empty(tax_rate: TaxRate) -> Self {
        PricingSummary {
            subtotal: Money::zero(),
            tax_rate,
            tax_amount: Money::zero(),
            total: Money::zero(),
            item_count: 0,
            total_quantity: 0,
        }
    }
}

/// Unit price × quantity for one line.
///
/// Saturates at the i64 range; lines built by `CartStore` stay below
/// [`Money::MAX_AMOUNT`].
#[inline]
pub fn line_total(line: &LineItem) -> Money {
    Money::from_minor(line.unit_price.minor().saturating_mul(line.quantity))
}

/// Computes subtotal, tax and total for `lines`.
///
/// ```rust
/// use shopdesk_core::pricing::compute_summary;
/// use shopdesk_core::types::TaxRate;
///
/// let summary = compute_summary(&[], TaxRate::GST_STANDARD);
/// assert!(summary.total.is_zero());
/// ```
pub fn compute_summary(lines: &[LineItem], tax_rate: TaxRate) -> PricingSummary {
    let subtotal = Money::from_minor(
        lines
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line_total(line).minor())),
    );
    let tax_amount = subtotal.calculate_tax(tax_rate);

    PricingSummary {
        subtotal,
        tax_rate,
        tax_amount,
        total: Money::from_minor(subtotal.minor().saturating_add(tax_amount.minor())),
        item_count: lines.len(),
        total_quantity: lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;
    use chrono::Utc;
    use proptest::prelude::*;

    fn line(id: i64, unit_minor: i64, quantity: i64) -> LineItem {
        LineItem {
            product_id: ProductId(id),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            brand: None,
            unit_price: Money::from_minor(unit_minor),
            quantity,
            stock_ceiling: quantity,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        assert_eq!(
            compute_summary(&[], TaxRate::GST_STANDARD),
            PricingSummary::empty(TaxRate::GST_STANDARD)
        );
    }

    #[test]
    fn test_standard_gst() {
        let lines = vec![line(1, 1000_00, 2)];
        let summary = compute_summary(&lines, TaxRate::GST_STANDARD);

        assert_eq!(summary.subtotal, Money::from_major(2000));
        assert_eq!(summary.tax_amount, Money::from_major(360));
        assert_eq!(summary.total, Money::from_major(2360));
        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.total_quantity, 2);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 0.25 × 18% = 0.045 → 0.05
        let summary = compute_summary(&[line(1, 25, 1)], TaxRate::GST_STANDARD);
        assert_eq!(summary.tax_amount, Money::from_minor(5));
        assert_eq!(summary.total, Money::from_minor(30));

        // 9.99 + 0.01 × 3 items
        let summary = compute_summary(
            &[line(1, 999, 1), line(2, 1, 3)],
            TaxRate::GST_STANDARD,
        );
        assert_eq!(summary.subtotal, Money::from_minor(1002));
        assert_eq!(summary.tax_amount, Money::from_minor(180)); // 180.36
    }

    #[test]
    fn test_zero_rate() {
        let summary = compute_summary(&[line(1, 4999, 3)], TaxRate::zero());
        assert_eq!(summary.tax_amount, Money::zero());
        assert_eq!(summary.total, summary.subtotal);
    }

    #[test]
    fn test_oversized_lines_saturate_instead_of_panicking() {
        let lines = vec![line(1, i64::MAX / 2, 3), line(2, i64::MAX / 2, 3)];
        let summary = compute_summary(&lines, TaxRate::GST_STANDARD);
        assert_eq!(summary.subtotal.minor(), i64::MAX);
        assert_eq!(summary.total.minor(), i64::MAX);
    }

    /// The rounding law in f64, scaled to paise so round2 is `round()` and
    /// every intermediate stays an exactly representable value.
    fn rounding_law_total(subtotal_paise: i64, bps: u32) -> f64 {
        let round2 = |paise: f64| paise.round();
        let s = round2(subtotal_paise as f64);
        let tax = round2(s * bps as f64 / 10_000.0);
        round2(s + tax)
    }

    proptest! {
        #[test]
        fn prop_total_matches_float_rounding_law(
            prices in prop::collection::vec((0i64..100_000, 1i64..20), 0..10),
            bps in 0u32..3000,
        ) {
            let lines: Vec<LineItem> = prices
                .iter()
                .enumerate()
                .map(|(i, (unit, qty))| line(i as i64, *unit, *qty))
                .collect();
            let summary = compute_summary(&lines, TaxRate::from_bps(bps));

            let expected = rounding_law_total(summary.subtotal.minor(), bps);
            prop_assert_eq!(summary.total.minor() as f64, expected);
        }

        /// total == round2(round2(S) + round2(round2(S) × r)), with round2
        /// checked independently: |tax × 10000 − S × bps| ≤ 5000.
        #[test]
        fn prop_rounding_law(
            prices in prop::collection::vec((0i64..10_000_000, 1i64..50), 0..20),
            bps in 0u32..3000,
        ) {
            let lines: Vec<LineItem> = prices
                .iter()
                .enumerate()
                .map(|(i, (unit, qty))| line(i as i64, *unit, *qty))
                .collect();
            let rate = TaxRate::from_bps(bps);
            let summary = compute_summary(&lines, rate);

            let exact: i128 = prices.iter().map(|(u, q)| *u as i128 * *q as i128).sum();
            prop_assert_eq!(summary.subtotal.minor() as i128, exact);

            let scaled = exact * bps as i128;
            let tax = summary.tax_amount.minor() as i128;
            prop_assert!((tax * 10_000 - scaled).abs() <= 5_000);

            prop_assert_eq!(summary.total, summary.subtotal + summary.tax_amount);
        }
    }
}

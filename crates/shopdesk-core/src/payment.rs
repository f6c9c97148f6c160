//! # Payment Reconciler
//!
//! Turns "total + what the customer handed over" into change or a
//! shortfall, and suggests round cash amounts for the quick-tender buttons.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  method == cash?                                                        │
//! │     │                                                                   │
//! │     ├── no ──► tendered = total, change = 0, sufficient                 │
//! │     │          (card / upi / online capture the exact amount)           │
//! │     │                                                                   │
//! │     └── yes ─► tendered = round2(raw input)                             │
//! │                change   = tendered − total   (negative while short)     │
//! │                sufficient = tendered ≥ total                            │
//! │                                                                         │
//! │  Preview never fails on a short payment. finalize() does.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;

/// Rupee steps offered as quick cash amounts.
pub const QUICK_AMOUNT_STEPS: [Money; 3] = [
    Money::from_major(100),
    Money::from_major(500),
    Money::from_major(1000),
];

// =============================================================================
// Payment Result
// =============================================================================

/// A payment preview for a given total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentResult {
    pub method: PaymentMethod,
    pub total: Money,
    pub amount_tendered: Money,
    /// Negative while the customer has not handed over enough cash.
    pub change: Money,
    pub is_sufficient: bool,
}

impl PaymentResult {
    /// Confirms the payment covers the total.
    ///
    /// ```rust
    /// use shopdesk_core::money::Money;
    /// use shopdesk_core::payment::compute_change;
    /// use shopdesk_core::types::PaymentMethod;
    ///
    /// let short = compute_change(Money::from_major(100), PaymentMethod::Cash, "99.99").unwrap();
    /// assert!(short.finalize().is_err());
    /// ```
    pub fn finalize(self) -> CoreResult<PaymentResult> {
        if self.is_sufficient {
            Ok(self)
        } else {
            Err(CoreError::InsufficientPayment {
                total: self.total,
                tendered: self.amount_tendered,
            })
        }
    }

    /// Amount still owed (zero once sufficient).
    pub fn shortfall(&self) -> Money {
        if self.change.is_negative() {
            self.change.abs()
        } else {
            Money::zero()
        }
    }
}

/// Computes a payment preview from the raw text in the amount field.
///
/// ## Behavior
/// - Non-cash methods ignore `amount_received` entirely
/// - Cash input is parsed and rounded to paise ("99.999999" → 100.00)
/// - A blank cash field previews as nothing tendered
///
/// ## Errors
/// `InvalidAmount` when cash input is not a number or is negative.
pub fn compute_change(
    total: Money,
    method: PaymentMethod,
    amount_received: &str,
) -> CoreResult<PaymentResult> {
    if !method.is_cash() {
        return Ok(exact_payment(total, method));
    }

    let trimmed = amount_received.trim();
    let tendered = if trimmed.is_empty() {
        Money::zero()
    } else {
        trimmed.parse::<Money>()?
    };

    compute_change_amount(total, method, tendered)
}

/// Same as [`compute_change`] for an amount that is already Money
/// (quick-amount buttons).
pub fn compute_change_amount(
    total: Money,
    method: PaymentMethod,
    tendered: Money,
) -> CoreResult<PaymentResult> {
    if !method.is_cash() {
        return Ok(exact_payment(total, method));
    }
    if tendered.is_negative() {
        return Err(CoreError::InvalidAmount(format!(
            "amount received cannot be negative: {}",
            tendered
        )));
    }

    Ok(PaymentResult {
        method,
        total,
        amount_tendered: tendered,
        change: tendered - total,
        is_sufficient: tendered >= total,
    })
}

fn exact_payment(total: Money, method: PaymentMethod) -> PaymentResult {
    PaymentResult {
        method,
        total,
        amount_tendered: total,
        change: Money::zero(),
        is_sufficient: true,
    }
}

// =============================================================================
// Quick Amounts
// =============================================================================

/// A suggested tender amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuickAmount {
    pub amount: Money,
    /// The exact total (the "exact change" button).
    pub is_exact: bool,
}

/// The exact total plus the next ₹100, ₹500 and ₹1000 at or above it.
///
/// Duplicates collapse, so a round total yields fewer buttons.
///
/// ```rust
/// use shopdesk_core::money::Money;
/// use shopdesk_core::payment::suggest_quick_amounts;
///
/// let amounts: Vec<i64> = suggest_quick_amounts(Money::from_major(134_900))
///     .iter()
///     .map(|q| q.amount.major())
///     .collect();
/// assert_eq!(amounts, vec![134_900, 135_000]);
/// ```
pub fn suggest_quick_amounts(total: Money) -> Vec<QuickAmount> {
    let mut amounts: Vec<Money> = Vec::with_capacity(QUICK_AMOUNT_STEPS.len() + 1);
    amounts.push(total);
    amounts.extend(
        QUICK_AMOUNT_STEPS
            .iter()
            .map(|step| total.ceil_to_multiple(*step)),
    );
    amounts.sort();
    amounts.dedup();

    amounts
        .into_iter()
        .map(|amount| QuickAmount {
            amount,
            is_exact: amount == total,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hundred() -> Money {
        Money::from_major(100)
    }

    #[test]
    fn test_cash_overpayment() {
        let result = compute_change(hundred(), PaymentMethod::Cash, "150.00").unwrap();
        assert_eq!(result.amount_tendered, Money::from_major(150));
        assert_eq!(result.change, Money::from_major(50));
        assert!(result.is_sufficient);
        assert!(result.finalize().is_ok());
    }

    #[test]
    fn test_cash_one_paisa_short() {
        let result = compute_change(hundred(), PaymentMethod::Cash, "99.99").unwrap();
        assert_eq!(result.change, Money::from_minor(-1));
        assert!(!result.is_sufficient);
        assert_eq!(result.shortfall(), Money::from_minor(1));
        assert_eq!(
            result.finalize(),
            Err(CoreError::InsufficientPayment {
                total: hundred(),
                tendered: Money::from_minor(9999),
            })
        );
    }

    #[test]
    fn test_cash_input_rounds_before_comparison() {
        let result = compute_change(hundred(), PaymentMethod::Cash, "99.999999").unwrap();
        assert_eq!(result.amount_tendered, hundred());
        assert_eq!(result.change, Money::zero());
        assert!(result.is_sufficient);
    }

    #[test]
    fn test_non_cash_ignores_input() {
        for method in [PaymentMethod::Card, PaymentMethod::Upi, PaymentMethod::Online] {
            let result = compute_change(hundred(), method, "not a number").unwrap();
            assert_eq!(result.amount_tendered, hundred());
            assert_eq!(result.change, Money::zero());
            assert!(result.is_sufficient);
        }
    }

    #[test]
    fn test_blank_cash_previews_as_zero() {
        let result = compute_change(hundred(), PaymentMethod::Cash, "  ").unwrap();
        assert_eq!(result.amount_tendered, Money::zero());
        assert_eq!(result.change, Money::from_major(-100));
        assert!(!result.is_sufficient);
    }

    #[test]
    fn test_invalid_cash_input() {
        assert!(matches!(
            compute_change(hundred(), PaymentMethod::Cash, "abc"),
            Err(CoreError::InvalidAmount(_))
        ));
        assert!(matches!(
            compute_change(hundred(), PaymentMethod::Cash, "-5"),
            Err(CoreError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_quick_amounts_for_round_total() {
        let amounts = suggest_quick_amounts(Money::from_major(134_900));
        assert_eq!(
            amounts,
            vec![
                QuickAmount {
                    amount: Money::from_major(134_900),
                    is_exact: true
                },
                QuickAmount {
                    amount: Money::from_major(135_000),
                    is_exact: false
                },
            ]
        );
    }

    #[test]
    fn test_quick_amounts_for_odd_total() {
        let amounts: Vec<Money> = suggest_quick_amounts(Money::from_minor(236_050))
            .into_iter()
            .map(|q| q.amount)
            .collect();
        assert_eq!(
            amounts,
            vec![
                Money::from_minor(236_050),
                Money::from_major(2_400),
                Money::from_major(2_500),
                Money::from_major(3_000),
            ]
        );
    }

    #[test]
    fn test_quick_amounts_for_zero_total() {
        let amounts = suggest_quick_amounts(Money::zero());
        assert_eq!(amounts.len(), 1);
        assert!(amounts[0].is_exact);
    }
}

//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Browser cart math:                                                     │
//! │    subtotal * 0.18   → 179.82000000000002                               │
//! │    "99.999999" >= 100 → false  (cash drawer says otherwise)             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise)                              │
//! │    ₹999.00 = 99900 paise, tax = (99900 × 1800 + 5000) / 10000 paise    │
//! │    Text and float inputs are rounded to paise ONCE, at the boundary.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Rule
//! Every derived figure is rounded to 2 decimals (round half away from zero)
//! at the moment it is produced. In paise that is integer division with a
//! half-divisor bias, so values never drift across repeated recomputation.
//!
//! ## Usage
//! ```rust
//! use shopdesk_core::money::Money;
//!
//! let price = Money::from_major(1000);           // ₹1000.00
//! let tendered: Money = "150.005".parse().unwrap(); // rounds to ₹150.01
//! assert_eq!(tendered.minor(), 15001);
//! assert_eq!((price * 2).minor(), 200_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

use crate::types::TaxRate;

/// Minor units per major unit (paise per rupee).
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Parse Errors
// =============================================================================

/// Why a piece of text (or a float) could not become a `Money` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal amount")]
    InvalidFormat(String),

    #[error("'{0}' is too large")]
    Overflow(String),

    #[error("amount is not a finite number")]
    NotFinite,
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: change previews go negative when cash is short
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as minor units** for the frontend; the REST boundary
///   converts to decimal numbers in `shopdesk-checkout`
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► LineItem.unit_price ──► line total ──► subtotal
///                                                            │
///                      tax (18%) ◄───────────────────────────┤
///                                                            ▼
///                        total ──► PaymentReconciler ──► change / shortfall
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Largest amount accepted from text or wire numbers: ₹100 crore.
    ///
    /// A cart line is capped at this value, so a full cart's subtotal and
    /// tax stay far inside i64.
    pub const MAX_AMOUNT: Money = Money(100_00_00_000 * MINOR_PER_MAJOR);

    /// Creates a Money value from minor units (paise).
    ///
    /// ```rust
    /// use shopdesk_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(134_900_00).major(), 134_900);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Converts a float into Money, rounding to 2 decimals.
    ///
    /// The float is rendered with its shortest exact decimal form and then
    /// parsed, so `1.005` becomes ₹1.01 rather than the ₹1.00 that
    /// `(1.005 * 100.0).round()` would give.
    pub fn from_f64_rounded(value: f64) -> Result<Self, ParseMoneyError> {
        if !value.is_finite() {
            return Err(ParseMoneyError::NotFinite);
        }
        value.to_string().parse()
    }

    /// Returns the value in minor units (paise).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns the amount as a float, for wire formats that insist on JSON
    /// numbers. Never feed the result back into arithmetic.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax at the given rate, rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use shopdesk_core::money::Money;
    /// use shopdesk_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_minor(999); // ₹9.99
    /// let tax = subtotal.calculate_tax(TaxRate::GST_STANDARD);
    /// // ₹9.99 × 18% = ₹1.7982 → ₹1.80
    /// assert_eq!(tax.minor(), 180);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps `amount * bps` from overflowing on large carts
        let scaled = self.0 as i128 * rate.bps() as i128;
        Money(saturate(div_round_half_away(scaled, 10_000)))
    }

    /// Multiplies money by a quantity, or `None` on overflow.
    ///
    /// ```rust
    /// use shopdesk_core::money::Money;
    ///
    /// let unit_price = Money::from_major(1000);
    /// assert_eq!(unit_price.checked_multiply_quantity(2), Some(Money::from_major(2000)));
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Returns `self × numerator / denominator`, rounded half away from zero.
    ///
    /// Used for pro-rated refunds. A zero denominator yields zero.
    pub fn pro_rata(&self, numerator: i64, denominator: i64) -> Money {
        if denominator == 0 {
            return Money::zero();
        }
        let scaled = self.0 as i128 * numerator as i128;
        Money(saturate(div_round_half_away(scaled, denominator as i128)))
    }

    /// Rounds up to the next multiple of `step` (or returns `self` when it
    /// already is one).
    ///
    /// ```rust
    /// use shopdesk_core::money::Money;
    ///
    /// let total = Money::from_minor(134_900_50);
    /// assert_eq!(total.ceil_to_multiple(Money::from_major(100)), Money::from_major(135_000));
    /// assert_eq!(Money::from_major(500).ceil_to_multiple(Money::from_major(500)), Money::from_major(500));
    /// ```
    pub fn ceil_to_multiple(&self, step: Money) -> Money {
        if step.0 <= 0 {
            return *self;
        }
        let remainder = self.0.rem_euclid(step.0);
        if remainder == 0 {
            *self
        } else {
            Money(self.0 - remainder + step.0)
        }
    }
}

/// Narrows an i128 intermediate back to paise, clamping at the i64 range.
fn saturate(n: i128) -> i64 {
    i64::try_from(n).unwrap_or(if n < 0 { i64::MIN } else { i64::MAX })
}

/// Integer division rounding half away from zero. `d` must be positive.
fn div_round_half_away(n: i128, d: i128) -> i128 {
    let half = d / 2;
    if n >= 0 {
        (n + half) / d
    } else {
        (n - half) / d
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a plain decimal string ("150", "99.99", "-5.5", " 99.999999 ").
///
/// Extra fraction digits are rounded half away from zero into paise.
/// Thousands separators and currency symbols are presentation concerns and
/// are rejected.
impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let invalid = || ParseMoneyError::InvalidFormat(trimmed.to_string());
        let overflow = || ParseMoneyError::Overflow(trimmed.to_string());

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut minor: i64 = 0;
        for b in int_part.bytes() {
            minor = minor
                .checked_mul(10)
                .and_then(|m| m.checked_add((b - b'0') as i64))
                .ok_or_else(overflow)?;
        }
        minor = minor.checked_mul(MINOR_PER_MAJOR).ok_or_else(overflow)?;

        let frac = frac_part.as_bytes();
        let digit = |i: usize| frac.get(i).map(|b| (b - b'0') as i64).unwrap_or(0);
        minor = minor
            .checked_add(digit(0) * 10 + digit(1))
            .ok_or_else(overflow)?;
        if digit(2) >= 5 {
            minor = minor.checked_add(1).ok_or_else(overflow)?;
        }

        if minor > Money::MAX_AMOUNT.0 {
            return Err(overflow());
        }

        Ok(Money(if negative { -minor } else { minor }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering ("1234.50", "-0.01").
///
/// Currency symbols and digit grouping belong to the presentation adapter
/// in `shopdesk-checkout`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_and_parts() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
        assert_eq!(Money::from_minor(-550).minor_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "10.99");
        assert_eq!(Money::from_major(134_900).to_string(), "134900.00");
        assert_eq!(Money::from_minor(-1).to_string(), "-0.01");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse_plain_amounts() {
        assert_eq!("150".parse::<Money>().unwrap(), Money::from_major(150));
        assert_eq!("150.00".parse::<Money>().unwrap(), Money::from_major(150));
        assert_eq!("99.99".parse::<Money>().unwrap().minor(), 9999);
        assert_eq!(".5".parse::<Money>().unwrap().minor(), 50);
        assert_eq!("7.".parse::<Money>().unwrap().minor(), 700);
        assert_eq!("  42.1 ".parse::<Money>().unwrap().minor(), 4210);
        assert_eq!("-5.5".parse::<Money>().unwrap().minor(), -550);
    }

    #[test]
    fn test_parse_rounds_to_paise() {
        // Float noise from a number input must not make ₹100 look short.
        assert_eq!("99.999999".parse::<Money>().unwrap(), Money::from_major(100));
        assert_eq!("150.005".parse::<Money>().unwrap().minor(), 15001);
        assert_eq!("150.004".parse::<Money>().unwrap().minor(), 15000);
        assert_eq!("-0.005".parse::<Money>().unwrap().minor(), -1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Money>(), Err(ParseMoneyError::Empty));
        assert!(matches!(
            "1,000".parse::<Money>(),
            Err(ParseMoneyError::InvalidFormat(_))
        ));
        assert!("₹100".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
        assert!(matches!(
            "99999999999999999999".parse::<Money>(),
            Err(ParseMoneyError::Overflow(_))
        ));
    }

    #[test]
    fn test_parse_bounded_by_max_amount() {
        assert_eq!("1000000000".parse::<Money>().unwrap(), Money::MAX_AMOUNT);
        assert_eq!("-1000000000.00".parse::<Money>().unwrap(), -Money::MAX_AMOUNT);
        assert!(matches!(
            "1000000000.01".parse::<Money>(),
            Err(ParseMoneyError::Overflow(_))
        ));
        assert!(matches!(
            "50000000000000000".parse::<Money>(),
            Err(ParseMoneyError::Overflow(_))
        ));
        assert!(matches!(
            Money::from_f64_rounded(5e16),
            Err(ParseMoneyError::Overflow(_))
        ));
    }

    #[test]
    fn test_checked_ops() {
        assert_eq!(
            Money::from_major(10).checked_multiply_quantity(3),
            Some(Money::from_major(30))
        );
        assert_eq!(Money::MAX_AMOUNT.checked_multiply_quantity(i64::MAX), None);
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(i64::MIN).checked_sub(Money::from_minor(1)), None);
        assert_eq!(
            Money::from_major(5).checked_sub(Money::from_major(2)),
            Some(Money::from_major(3))
        );
    }

    #[test]
    fn test_tax_saturates_instead_of_wrapping() {
        let huge = Money::from_minor(i64::MAX);
        assert_eq!(huge.calculate_tax(TaxRate::from_bps(20_000)).minor(), i64::MAX);
        assert_eq!((-huge).calculate_tax(TaxRate::from_bps(20_000)).minor(), i64::MIN);
    }

    #[test]
    fn test_from_f64_rounded() {
        assert_eq!(Money::from_f64_rounded(1.005).unwrap().minor(), 101);
        assert_eq!(Money::from_f64_rounded(0.1 + 0.2).unwrap().minor(), 30);
        assert_eq!(Money::from_f64_rounded(1000.0).unwrap(), Money::from_major(1000));
        assert_eq!(
            Money::from_f64_rounded(f64::NAN),
            Err(ParseMoneyError::NotFinite)
        );
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // ₹0.25 at 18% = 4.5 paise → 5 paise
        assert_eq!(Money::from_minor(25).calculate_tax(TaxRate::GST_STANDARD).minor(), 5);
        // ₹0.24 at 18% = 4.32 paise → 4 paise
        assert_eq!(Money::from_minor(24).calculate_tax(TaxRate::GST_STANDARD).minor(), 4);
        assert_eq!(Money::from_minor(-25).calculate_tax(TaxRate::GST_STANDARD).minor(), -5);
        assert!(Money::from_major(500).calculate_tax(TaxRate::zero()).is_zero());
    }

    #[test]
    fn test_pro_rata() {
        let line = Money::from_minor(1000);
        assert_eq!(line.pro_rata(1, 3).minor(), 333);
        assert_eq!(line.pro_rata(2, 3).minor(), 667);
        assert_eq!(line.pro_rata(3, 3), line);
        assert!(line.pro_rata(1, 0).is_zero());
    }

    #[test]
    fn test_ceil_to_multiple() {
        let hundred = Money::from_major(100);
        assert_eq!(Money::from_major(134_900).ceil_to_multiple(hundred), Money::from_major(134_900));
        assert_eq!(Money::from_minor(1).ceil_to_multiple(hundred), hundred);
        assert_eq!(Money::zero().ceil_to_multiple(hundred), Money::zero());
        assert_eq!(Money::from_major(7).ceil_to_multiple(Money::zero()), Money::from_major(7));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);
        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((-a).minor(), -1000);
        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }
}

//! # Currency Formatting
//!
//! Presentation of Money for receipts and the cart panel. Pricing math
//! never goes through here.
//!
//! ```text
//! Money(13_490_000) ──► CurrencyFormatter ──► "₹1,34,900.00"  (indian)
//!                                        └──► "₹134,900.00"   (western)
//! ```

use shopdesk_core::Money;

use crate::config::{CurrencySettings, DigitGrouping};

/// Formats Money with a currency symbol and digit grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyFormatter {
    symbol: String,
    decimals: u8,
    grouping: DigitGrouping,
}

impl CurrencyFormatter {
    pub fn new(symbol: impl Into<String>, decimals: u8, grouping: DigitGrouping) -> Self {
        CurrencyFormatter {
            symbol: symbol.into(),
            decimals,
            grouping,
        }
    }

    pub fn from_settings(settings: &CurrencySettings) -> Self {
        Self::new(settings.symbol.clone(), settings.decimals, settings.grouping)
    }

    /// Formats an amount, e.g. `₹1,34,900.00` or `-₹0.01`.
    ///
    /// With zero decimals the paise are rounded half away from zero.
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let abs = amount.abs();

        if self.decimals == 0 {
            let whole = (abs.minor() + 50) / 100;
            return format!("{}{}{}", sign, self.symbol, self.group(whole));
        }

        format!(
            "{}{}{}.{:02}",
            sign,
            self.symbol,
            self.group(abs.major()),
            abs.minor_part()
        )
    }

    fn group(&self, whole: i64) -> String {
        let digits = whole.to_string();
        if digits.len() <= 3 {
            return digits;
        }

        let (head, last_three) = digits.split_at(digits.len() - 3);
        let head_group = match self.grouping {
            DigitGrouping::Indian => 2,
            DigitGrouping::Western => 3,
        };

        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(head_group);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        groups.push(last_three);
        groups.join(",")
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::from_settings(&CurrencySettings::default())
    }
}

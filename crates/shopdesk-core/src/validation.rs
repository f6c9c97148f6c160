//! # Validation Module
//!
//! Input checks for the values a cashier or the REST boundary hands to the
//! checkout.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser UI (React)                                           │
//! │  ├── Required fields, numeric inputs                                   │
//! │  └── Immediate feedback                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Checkout session (Rust)                                      │
//! │  ├── DTO normalization (shopdesk-checkout::api)                        │
//! │  └── THIS MODULE: format and range rules                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Sales API                                                    │
//! │  └── Authoritative stock and schema checks                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopdesk_core::validation::{validate_customer_phone, validate_payment_reference};
//!
//! validate_payment_reference("REF-1718000000000").unwrap();
//! validate_customer_phone("+91 98765 43210").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_CART_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest payment reference the Sales API stores.
pub const MAX_PAYMENT_REFERENCE_LEN: usize = 100;

/// Longest free-text sale note.
pub const MAX_NOTES_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a card / UPI transaction reference.
///
/// Empty is allowed here; whether a reference is required is the session's
/// decision (it generates one for non-cash sales).
pub fn validate_payment_reference(reference: &str) -> ValidationResult<()> {
    if reference.trim().chars().count() > MAX_PAYMENT_REFERENCE_LEN {
        return Err(ValidationError::TooLong {
            field: "payment_reference".to_string(),
            max: MAX_PAYMENT_REFERENCE_LEN,
        });
    }

    Ok(())
}

/// Validates a customer phone number.
///
/// ## Rules
/// - Optional leading `+`
/// - Spaces and dashes are ignored
/// - 7 to 15 digits remain
///
/// ## Example
/// ```rust
/// use shopdesk_core::validation::validate_customer_phone;
///
/// assert!(validate_customer_phone("98765-43210").is_ok());
/// assert!(validate_customer_phone("12345").is_err());
/// assert!(validate_customer_phone("call me").is_err());
/// ```
pub fn validate_customer_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    let digits_part = phone.strip_prefix('+').unwrap_or(phone);

    let mut digits = 0usize;
    for c in digits_part.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {}
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "customer_phone".to_string(),
                    reason: "may contain only digits, spaces, dashes and a leading +".to_string(),
                })
            }
        }
    }

    if !(7..=15).contains(&digits) {
        return Err(ValidationError::OutOfRange {
            field: "customer_phone digits".to_string(),
            min: 7,
            max: 15,
        });
    }

    Ok(())
}

pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a selling price: zero up to [`Money::MAX_AMOUNT`].
///
/// ## Example
/// ```rust
/// use shopdesk_core::money::Money;
/// use shopdesk_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_minor(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());     // Free item
/// assert!(validate_price(Money::from_minor(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > Money::MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: Money::MAX_AMOUNT.minor(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a configured cart line limit (1 to `MAX_CART_ITEMS`).
pub fn validate_cart_size(max_items: usize) -> ValidationResult<()> {
    if max_items == 0 || max_items > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "max_cart_items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
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
    fn test_validate_payment_reference() {
        assert!(validate_payment_reference("").is_ok());
        assert!(validate_payment_reference("UPI-88213").is_ok());
        assert!(validate_payment_reference(&"R".repeat(100)).is_ok());
        assert!(validate_payment_reference(&"R".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_customer_phone() {
        assert!(validate_customer_phone("9876543210").is_ok());
        assert!(validate_customer_phone("+91 98765 43210").is_ok());
        assert!(validate_customer_phone("022-2345678").is_ok());

        assert!(validate_customer_phone("").is_err());
        assert!(validate_customer_phone("123456").is_err());
        assert!(validate_customer_phone("1234567890123456").is_err());
        assert!(validate_customer_phone("98765x43210").is_err());
        assert!(validate_customer_phone("++919876543210").is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes("").is_ok());
        assert!(validate_notes(&"n".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::MAX_AMOUNT).is_ok());
        assert!(validate_price(Money::from_minor(-1)).is_err());
        assert!(validate_price(Money::MAX_AMOUNT + Money::from_minor(1)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1800).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_ok());
        assert!(validate_cart_size(0).is_err());
        assert!(validate_cart_size(MAX_CART_ITEMS + 1).is_err());
    }
}

//! # Error Types
//!
//! Domain-specific error types for shopdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopdesk-core errors (this file)                                      │
//! │  ├── CoreError        - Cart, payment, stock and refund rule failures  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopdesk-checkout errors (separate crate)                             │
//! │  ├── CheckoutError    - Session / upstream API failures                │
//! │  └── ErrorReport      - What the browser UI sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ErrorReport → UI  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant here is recoverable by the cashier (re-enter an amount,
//! lower a quantity, refresh stock). None of them is fatal to the process.

use thiserror::Error;

use crate::money::{Money, ParseMoneyError};
use crate::stock::StockShortfall;
use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Checkout business rule violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Not enough sellable stock for the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Tap product (already 3 in cart)
    ///      │
    ///      ▼
    /// available = on_hand - reserved = 3
    ///      │
    ///      ▼
    /// OutOfStock { sku: "RICE-5KG", available: 3, requested: 4 }
    ///      │
    ///      ▼
    /// UI toast: "Cannot add more. Stock limit reached!" (cart unchanged)
    /// ```
    #[error("Out of stock for {sku}: available {available}, requested {requested}")]
    OutOfStock {
        product_id: ProductId,
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Cash tendered is below the total at finalize time.
    #[error("Insufficient payment: total {total}, tendered {tendered}")]
    InsufficientPayment { total: Money, tendered: Money },

    /// The Inventory / Sales API reports less stock than the cart assumed.
    ///
    /// The sale is rejected and the cart is left as-is so the cashier can
    /// adjust it; quantities are never corrected silently.
    #[error("Stock changed since items were added: {}", describe_shortfalls(.shortfalls))]
    StaleStock { shortfalls: Vec<StockShortfall> },

    #[error("Product {0} is not in the cart")]
    ProductNotInCart(ProductId),

    /// A stock snapshot for one product was supplied alongside another.
    #[error("Stock snapshot is for product {snapshot}, expected {expected}")]
    SnapshotMismatch {
        expected: ProductId,
        snapshot: ProductId,
    },

    /// Cart has reached its maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartFull { max: usize },

    /// A monetary input could not be interpreted.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Product {0} was not part of this sale")]
    ProductNotInSale(ProductId),

    #[error("Cannot return {requested} of product {product_id}: only {sold} sold")]
    ReturnExceedsSold {
        product_id: ProductId,
        sold: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<ParseMoneyError> for CoreError {
    fn from(err: ParseMoneyError) -> Self {
        CoreError::InvalidAmount(err.to_string())
    }
}

fn describe_shortfalls(shortfalls: &[StockShortfall]) -> String {
    shortfalls
        .iter()
        .map(|s| format!("{} (in cart {}, available {})", s.sku, s.in_cart, s.available))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs, mostly at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

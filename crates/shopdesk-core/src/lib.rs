//! # shopdesk-core: Pure Checkout Logic for ShopDesk POS
//!
//! The cart, pricing, payment and stock rules behind the POS screen, as
//! pure functions over plain data. The REST plumbing lives in
//! `shopdesk-checkout`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ShopDesk POS Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser UI (React)                           │   │
//! │  │    Product grid ──► Cart panel ──► Payment modal ──► Receipt   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              shopdesk-checkout (PosSession)                     │   │
//! │  │    config, DTO normalization, Inventory / Sales API calls       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopdesk-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐       │   │
//! │  │   │   cart   │  │ pricing  │  │ payment  │  │  stock   │       │   │
//! │  │   │CartStore │  │ Summary  │  │  change  │  │ ceilings │       │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO LOGGING • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type in paise with exact rounding
//! - [`types`] - Product, StockSnapshot, PaymentMethod, TaxRate
//! - [`cart`] - CartStore and LineItem
//! - [`pricing`] - Subtotal / tax / total
//! - [`payment`] - Change, sufficiency, quick amounts
//! - [`stock`] - Available quantity and shortfall detection
//! - [`returns`] - Refund quotes
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shopdesk_core::{CartStore, Money, PaymentMethod, Product, ProductId, StockSnapshot, TaxRate};
//! use shopdesk_core::payment::compute_change;
//!
//! let kettle = Product {
//!     id: ProductId(11),
//!     name: "Electric Kettle".to_string(),
//!     sku: "KTL-15".to_string(),
//!     brand: Some("Prestige".to_string()),
//!     price: Money::from_major(1200),
//!     discount_price: Some(Money::from_major(1000)),
//! };
//!
//! let mut cart = CartStore::new();
//! cart.add_item(&kettle, &StockSnapshot::new(ProductId(11), 5, 1)).unwrap();
//! cart.add_item(&kettle, &StockSnapshot::new(ProductId(11), 5, 1)).unwrap();
//!
//! let summary = cart.summary(TaxRate::GST_STANDARD);
//! assert_eq!(summary.total, Money::from_major(2360));
//!
//! let payment = compute_change(summary.total, PaymentMethod::Cash, "2500").unwrap();
//! assert_eq!(payment.change, Money::from_major(140));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod returns;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartState, CartStore, LineItem, QuantityChange};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{PaymentResult, QuickAmount};
pub use pricing::PricingSummary;
pub use stock::StockShortfall;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

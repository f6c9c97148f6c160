//! # shopdesk-checkout
//!
//! Boundary layer for the ShopDesk POS checkout: configuration, REST DTO
//! normalization, the Inventory / Sales API seams and the session that
//! ties them to `shopdesk-core`.
//!
//! ## Module Organization
//! ```text
//! shopdesk_checkout/
//! ├── lib.rs          ◄─── You are here
//! ├── config.rs       ◄─── checkout.toml + SHOPDESK_* env
//! ├── api.rs          ◄─── DTOs, InventoryApi / SalesApi traits
//! ├── session.rs      ◄─── PosSession (cart → payment → sale)
//! ├── memory.rs       ◄─── In-memory API implementations
//! ├── format.rs       ◄─── ₹1,34,900.00 formatting
//! ├── logging.rs      ◄─── tracing subscriber setup
//! ├── error.rs        ◄─── CheckoutError, ErrorReport
//! └── bin/pos-sim.rs  ◄─── Scripted demo checkout
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod memory;
pub mod session;

pub use api::{InventoryApi, SalesApi};
pub use config::CheckoutConfig;
pub use error::{CheckoutError, CheckoutResult, ErrorCode, ErrorReport};
pub use format::CurrencyFormatter;
pub use session::{CartView, CompletedSale, FinalizeRequest, PosSession};

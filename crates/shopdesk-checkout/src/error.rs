//! # Checkout Error Types
//!
//! Errors raised while driving a POS session, and the report shape the
//! browser UI receives when a command fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in ShopDesk Checkout                      │
//! │                                                                         │
//! │  PosSession command                                                     │
//! │         │                                                               │
//! │         ├── CoreError (OutOfStock, InsufficientPayment, StaleStock…)    │
//! │         ├── InventoryApiError / SalesApiError (upstream failure)        │
//! │         └── ConfigError (checkout.toml, env)                            │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │               CheckoutError ───► ErrorReport { code, message } ───► UI  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await finalizeSale(...)                                              │
//! │  } catch (e) {                                                          │
//! │    // e.code = "STALE_STOCK"                                            │
//! │    // e.message = "Stock changed since items were added: ..."           │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopdesk_core::{CoreError, StockShortfall};

use crate::api::{InventoryApiError, SalesApiError};

/// Result type alias for session operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// Everything that can stop a session command.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A checkout rule from the core (stock, payment, validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Finalize was requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Inventory API error: {0}")]
    Inventory(#[from] InventoryApiError),

    /// Sales API failure other than a stock conflict (those surface as
    /// `CoreError::StaleStock`).
    #[error("Sales API error: {0}")]
    Sales(SalesApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CheckoutError {
    /// Whether the cashier can fix this by changing the cart or the payment.
    pub fn is_user_recoverable(&self) -> bool {
        match self {
            CheckoutError::Core(CoreError::SnapshotMismatch { .. }) => false,
            CheckoutError::Core(_) | CheckoutError::EmptyCart => true,
            CheckoutError::Inventory(_) | CheckoutError::Sales(_) | CheckoutError::Config(_) => {
                false
            }
        }
    }
}

// =============================================================================
// Config Error
// =============================================================================

/// Failures while loading or saving `checkout.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config directory available on this platform")]
    NoConfigDir,
}

// =============================================================================
// Error Report (what the UI sees)
// =============================================================================

/// Machine-readable failure codes for the UI.
///
/// ## Usage in Frontend
/// ```typescript
/// switch (e.code) {
///   case 'OUT_OF_STOCK':
///     toast.warning('Cannot add more. Stock limit reached!');
///     break;
///   case 'STALE_STOCK':
///     highlightLines(e.shortfalls);
///     break;
///   default:
///     toast.error(e.message);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    OutOfStock,
    InsufficientPayment,
    StaleStock,
    ValidationError,
    NotFound,
    /// Inventory or Sales API failed (network or rejected request)
    UpstreamError,
    ConfigError,
    Internal,
}

/// Serialized error returned to the UI.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_PAYMENT",
///   "message": "Insufficient payment: total 100.00, tendered 99.99"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    /// Lines to highlight when the code is `STALE_STOCK`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shortfalls: Vec<StockShortfall>,
}

impl ErrorReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ErrorReport {
            code,
            message: message.into(),
            shortfalls: Vec::new(),
        }
    }
}

impl From<&CoreError> for ErrorReport {
    fn from(err: &CoreError) -> Self {
        let code = match err {
            CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CoreError::InsufficientPayment { .. } => ErrorCode::InsufficientPayment,
            CoreError::StaleStock { shortfalls } => {
                return ErrorReport {
                    code: ErrorCode::StaleStock,
                    message: err.to_string(),
                    shortfalls: shortfalls.clone(),
                };
            }
            CoreError::ProductNotInCart(_) | CoreError::ProductNotInSale(_) => ErrorCode::NotFound,
            CoreError::CartFull { .. }
            | CoreError::InvalidAmount(_)
            | CoreError::ReturnExceedsSold { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::SnapshotMismatch { .. } => {
                tracing::error!("Stock snapshot mismatch: {}", err);
                return ErrorReport::new(ErrorCode::Internal, "Stock lookup returned the wrong product");
            }
        };
        ErrorReport::new(code, err.to_string())
    }
}

impl From<&CheckoutError> for ErrorReport {
    fn from(err: &CheckoutError) -> Self {
        match err {
            CheckoutError::Core(core) => ErrorReport::from(core),
            CheckoutError::EmptyCart => ErrorReport::new(ErrorCode::ValidationError, err.to_string()),
            CheckoutError::Inventory(e) => {
                tracing::error!("Inventory API failed: {}", e);
                ErrorReport::new(ErrorCode::UpstreamError, "Could not check stock. Please retry.")
            }
            CheckoutError::Sales(e) => {
                tracing::error!("Sales API failed: {}", e);
                ErrorReport::new(
                    ErrorCode::UpstreamError,
                    "The sale could not be recorded. The cart was kept; please retry.",
                )
            }
            CheckoutError::Config(e) => ErrorReport::new(ErrorCode::ConfigError, e.to_string()),
        }
    }
}

impl From<CheckoutError> for ErrorReport {
    fn from(err: CheckoutError) -> Self {
        ErrorReport::from(&err)
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorReport {}

// =============================================================================
// Unit Tests
// =============================================================================

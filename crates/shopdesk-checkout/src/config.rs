//! # Checkout Configuration
//!
//! Shop identity, tax rate, currency display and checkout behavior for a
//! POS terminal.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPDESK_SHOP_ID=3                                                 │
//! │     SHOPDESK_TAX_RATE=18                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopdesk/checkout.toml (Linux)                           │
//! │     ~/Library/Application Support/com.shopdesk.pos/checkout.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     shop 1, 18% GST, ₹ with Indian digit grouping                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [shop]
//! id = 3
//! name = "MG Road Branch"
//!
//! [pricing]
//! tax_rate_bps = 1800  # 18% GST
//!
//! [currency]
//! code = "INR"
//! symbol = "₹"
//! decimals = 2
//! grouping = "indian"  # indian | western
//!
//! [checkout]
//! verify_stock_before_submit = true
//! max_cart_items = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use shopdesk_core::validation::{validate_cart_size, validate_tax_rate_bps};
use shopdesk_core::{ShopId, TaxRate, MAX_CART_ITEMS};

use crate::error::ConfigError;

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "checkout.toml";

// =============================================================================
// Shop
// =============================================================================

/// The branch this terminal sells for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSettings {
    pub id: i64,

    /// Printed on receipts.
    #[serde(default = "default_shop_name")]
    pub name: String,
}

fn default_shop_name() -> String {
    "ShopDesk Store".to_string()
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            id: 1,
            name: default_shop_name(),
        }
    }
}

// =============================================================================
// Pricing
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Flat tax applied at checkout, in basis points (1800 = 18%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,
}

fn default_tax_rate_bps() -> u32 {
    TaxRate::GST_STANDARD.bps()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_rate_bps: default_tax_rate_bps(),
        }
    }
}

// =============================================================================
// Currency
// =============================================================================

/// How digits are grouped left of the decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitGrouping {
    /// 1,34,900.00 (lakh / crore)
    #[default]
    Indian,

    /// 134,900.00
    Western,
}

impl std::str::FromStr for DigitGrouping {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "indian" | "lakh" => Ok(DigitGrouping::Indian),
            "western" | "international" => Ok(DigitGrouping::Western),
            other => Err(ConfigError::Invalid(format!(
                "Unknown digit grouping: '{}'. Valid options: indian, western",
                other
            ))),
        }
    }
}

/// Currency display settings. Amounts themselves are always paise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// ISO 4217 code.
    #[serde(default = "default_currency_code")]
    pub code: String,

    #[serde(default = "default_currency_symbol")]
    pub symbol: String,

    /// 2 shows paise, 0 rounds to whole rupees on screen.
    #[serde(default = "default_currency_decimals")]
    pub decimals: u8,

    #[serde(default)]
    pub grouping: DigitGrouping,
}

fn default_currency_code() -> String {
    "INR".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_currency_decimals() -> u8 {
    2
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: default_currency_code(),
            symbol: default_currency_symbol(),
            decimals: default_currency_decimals(),
            grouping: DigitGrouping::default(),
        }
    }
}

// =============================================================================
// Checkout behavior
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Re-fetch stock for every cart line right before submitting a sale.
    #[serde(default = "default_true")]
    pub verify_stock_before_submit: bool,

    /// Distinct lines allowed in one cart.
    #[serde(default = "default_max_cart_items")]
    pub max_cart_items: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_cart_items() -> usize {
    MAX_CART_ITEMS
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            verify_stock_before_submit: true,
            max_cart_items: default_max_cart_items(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub shop: ShopSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Writes the configuration as TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Checkout config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shop.id <= 0 {
            return Err(ConfigError::Invalid(format!(
                "shop.id must be positive, got {}",
                self.shop.id
            )));
        }

        validate_tax_rate_bps(self.pricing.tax_rate_bps)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        validate_cart_size(self.checkout.max_cart_items)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let code = &self.currency.code;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid(format!(
                "currency.code must be a 3-letter ISO code, got '{}'",
                code
            )));
        }

        if self.currency.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("currency.symbol is required".into()));
        }

        if !matches!(self.currency.decimals, 0 | 2) {
            return Err(ConfigError::Invalid(format!(
                "currency.decimals must be 0 or 2, got {}",
                self.currency.decimals
            )));
        }

        Ok(())
    }

    /// Applies `SHOPDESK_*` overrides read through `lookup`.
    ///
    /// `load` passes the process environment; tests pass a map.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("SHOPDESK_SHOP_ID") {
            match id.trim().parse::<i64>() {
                Ok(parsed) => {
                    debug!(shop_id = parsed, "Overriding shop ID from environment");
                    self.shop.id = parsed;
                }
                Err(_) => warn!(value = %id, "Ignoring non-numeric SHOPDESK_SHOP_ID"),
            }
        }

        if let Some(name) = lookup("SHOPDESK_SHOP_NAME") {
            self.shop.name = name;
        }

        // Percent, e.g. "18" or "12.5"
        if let Some(rate) = lookup("SHOPDESK_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) if pct.is_finite() && pct >= 0.0 => {
                    let bps = TaxRate::from_percentage(pct).bps();
                    debug!(tax_rate_bps = bps, "Overriding tax rate from environment");
                    self.pricing.tax_rate_bps = bps;
                }
                _ => warn!(value = %rate, "Ignoring invalid SHOPDESK_TAX_RATE"),
            }
        }

        if let Some(symbol) = lookup("SHOPDESK_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Some(grouping) = lookup("SHOPDESK_DIGIT_GROUPING") {
            match grouping.parse() {
                Ok(parsed) => self.currency.grouping = parsed,
                Err(e) => warn!("{}", e),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopdesk", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn shop_id(&self) -> ShopId {
        ShopId(self.shop.id)
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.pricing.tax_rate_bps)
    }
}

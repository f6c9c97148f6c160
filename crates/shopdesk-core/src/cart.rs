//! # Cart Store
//!
//! The cart for one POS session: an insertion-ordered list of line items,
//! unique by product, each bounded by the stock ceiling that was available
//! when it was added.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Cashier Action           Operation               State Change          │
//! │  ──────────────           ─────────               ────────────          │
//! │                                                                         │
//! │  Tap product ───────────► add_item() ──────────► push / qty + 1        │
//! │                                                   (OutOfStock if full)  │
//! │                                                                         │
//! │  Edit quantity ─────────► update_quantity() ───► clamp to [1, ceiling] │
//! │                                                   0 removes the line    │
//! │                                                                         │
//! │  Click remove ──────────► remove_item() ───────► retain (idempotent)   │
//! │                                                                         │
//! │  New sale / completed ──► clear() ─────────────► empty                 │
//! │                                                                         │
//! │  States: Empty ⇄ NonEmpty. Nothing else is observable.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart never touches inventory. Reserving or decrementing stock is the
//! Sales API's job once payment is confirmed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{self, PricingSummary};
use crate::stock::{available_quantity, can_add};
use crate::types::{Product, ProductId, StockSnapshot, TaxRate};
use crate::validation::validate_price;
use crate::MAX_CART_ITEMS;

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart.
///
/// ## Invariants
/// - `1 <= quantity <= stock_ceiling`
/// - `0 <= unit_price` and `line_total() <= Money::MAX_AMOUNT`
/// - `unit_price` is frozen when the line is created; later catalog price
///   changes do not reach an open cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    pub brand: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
    pub stock_ceiling: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    fn from_product(product: &Product, stock_ceiling: i64) -> Self {
        LineItem {
            product_id: product.id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            brand: product.brand.clone(),
            unit_price: product.selling_price(),
            quantity: 1,
            stock_ceiling,
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        pricing::line_total(self)
    }

    /// Whether another unit would exceed the stock ceiling.
    #[inline]
    pub fn at_ceiling(&self) -> bool {
        self.quantity >= self.stock_ceiling
    }

    /// Most units the line may hold: the stock ceiling, further capped so
    /// the line total never passes [`Money::MAX_AMOUNT`].
    pub fn max_quantity(&self) -> i64 {
        let stock = self.stock_ceiling.max(1);
        if self.unit_price.is_positive() {
            stock.min(Money::MAX_AMOUNT.minor() / self.unit_price.minor())
        } else {
            stock
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Observable cart states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    Empty,
    NonEmpty,
}

/// Result of [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuantityChange {
    /// Quantity set to `applied`; `clamped` when it differs from `requested`.
    Updated {
        requested: i64,
        applied: i64,
        clamped: bool,
    },
    /// A request of zero or less removed the line.
    Removed,
}

// =============================================================================
// Cart Store
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (re-adding increments quantity)
/// - Lines keep insertion order (display order)
/// - No line is ever kept at quantity zero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartStore {
    items: Vec<LineItem>,
    max_items: usize,
    created_at: DateTime<Utc>,
}

impl CartStore {
    /// Creates an empty cart allowing up to [`MAX_CART_ITEMS`] lines.
    pub fn new() -> Self {
        Self::with_max_items(MAX_CART_ITEMS)
    }

    /// Creates an empty cart; `max_items` is capped at [`MAX_CART_ITEMS`].
    pub fn with_max_items(max_items: usize) -> Self {
        CartStore {
            items: Vec::new(),
            max_items: max_items.min(MAX_CART_ITEMS),
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Product already in cart: same as `update_quantity(id, qty + 1)`,
    ///   after the line's ceiling is refreshed from `snapshot`
    /// - Product not in cart: new line at quantity 1, priced at the
    ///   discount price when there is one
    ///
    /// ## Returns
    /// - `Ok(quantity)` with the line's new quantity
    /// - `Err(OutOfStock)` when no further unit is available
    /// - `Err(Validation)` for a negative or oversized selling price
    /// - `Err(InvalidAmount)` when one more unit would push the line total
    ///   past [`Money::MAX_AMOUNT`]
    ///
    /// The cart is left untouched on every error.
    ///
    /// ```rust
    /// use shopdesk_core::cart::CartStore;
    /// use shopdesk_core::money::Money;
    /// use shopdesk_core::types::{Product, ProductId, StockSnapshot};
    /// use shopdesk_core::CoreError;
    ///
    /// let product = Product {
    ///     id: ProductId(1),
    ///     name: "Sunflower Oil 1L".into(),
    ///     sku: "OIL-1L".into(),
    ///     brand: None,
    ///     price: Money::from_major(180),
    ///     discount_price: None,
    /// };
    /// let mut cart = CartStore::new();
    /// let empty_shelf = StockSnapshot::new(ProductId(1), 0, 0);
    ///
    /// assert!(matches!(cart.add_item(&product, &empty_shelf), Err(CoreError::OutOfStock { .. })));
    /// assert!(cart.is_empty());
    /// ```
    pub fn add_item(&mut self, product: &Product, snapshot: &StockSnapshot) -> CoreResult<i64> {
        if snapshot.product_id != product.id {
            return Err(CoreError::SnapshotMismatch {
                expected: product.id,
                snapshot: snapshot.product_id,
            });
        }

        validate_price(product.selling_price())?;

        let available = available_quantity(snapshot);

        if let Some(index) = self.position(product.id) {
            let line = &self.items[index];
            let requested = line.quantity + 1;
            if !can_add(snapshot, requested) {
                return Err(CoreError::OutOfStock {
                    product_id: product.id,
                    sku: product.sku.clone(),
                    available,
                    requested,
                });
            }
            let within_cap = line
                .unit_price
                .checked_multiply_quantity(requested)
                .is_some_and(|total| total <= Money::MAX_AMOUNT);
            if !within_cap {
                return Err(CoreError::InvalidAmount(format!(
                    "line total for {} would exceed {}",
                    product.sku,
                    Money::MAX_AMOUNT
                )));
            }
            self.items[index].stock_ceiling = available;
            return match self.update_quantity(product.id, requested)? {
                QuantityChange::Updated { applied, .. } => Ok(applied),
                QuantityChange::Removed => Ok(0),
            };
        }

        if available <= 0 {
            return Err(CoreError::OutOfStock {
                product_id: product.id,
                sku: product.sku.clone(),
                available: 0,
                requested: 1,
            });
        }

        if self.items.len() >= self.max_items {
            return Err(CoreError::CartFull {
                max: self.max_items,
            });
        }

        self.items.push(LineItem::from_product(product, available));
        Ok(1)
    }

    /// Sets a line's quantity, clamped to `[1, max_quantity]`.
    ///
    /// A request of zero (or below) removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        new_quantity: i64,
    ) -> CoreResult<QuantityChange> {
        let index = self
            .position(product_id)
            .ok_or(CoreError::ProductNotInCart(product_id))?;

        if new_quantity <= 0 {
            self.items.remove(index);
            return Ok(QuantityChange::Removed);
        }

        let line = &mut self.items[index];
        let applied = new_quantity.clamp(1, line.max_quantity());
        line.quantity = applied;

        Ok(QuantityChange::Updated {
            requested: new_quantity,
            applied,
            clamped: applied != new_quantity,
        })
    }

    /// Removes a line. Absent products are a no-op.
    ///
    /// Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.product_id != product_id);
        self.items.len() != before
    }

    /// Empties the cart (sale completed or cashier reset).
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Lines in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::NonEmpty
        }
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// When the cart was created or last cleared.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Recomputes the pricing summary from the current lines.
    pub fn summary(&self, tax_rate: TaxRate) -> PricingSummary {
        pricing::compute_summary(&self.items, tax_rate)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|line| line.product_id == product_id)
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

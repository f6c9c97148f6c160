//! # Stock Gate
//!
//! Answers "may N units of this product go into a cart?" from nothing but
//! the snapshot the caller supplies. There is no cache and no refresh here:
//! the snapshot is as fresh as the Inventory API call that produced it.
//!
//! ```text
//! StockSnapshot { on_hand: 12, reserved: 4 }
//!        │
//!        ▼
//! available_quantity = max(0, 12 - 4) = 8
//!        │
//!        ├── can_add(snapshot, 8) → true
//!        └── can_add(snapshot, 9) → false
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::LineItem;
use crate::types::{ProductId, StockSnapshot};

/// Sellable units: on hand minus reserved, never negative.
///
/// ```rust
/// use shopdesk_core::stock::available_quantity;
/// use shopdesk_core::types::{ProductId, StockSnapshot};
///
/// assert_eq!(available_quantity(&StockSnapshot::new(ProductId(1), 12, 4)), 8);
/// assert_eq!(available_quantity(&StockSnapshot::new(ProductId(1), 2, 5)), 0);
/// ```
#[inline]
pub fn available_quantity(snapshot: &StockSnapshot) -> i64 {
    (snapshot.quantity_on_hand - snapshot.quantity_reserved).max(0)
}

/// Whether `requested_qty` units fit inside the available quantity.
#[inline]
pub fn can_add(snapshot: &StockSnapshot, requested_qty: i64) -> bool {
    requested_qty <= available_quantity(snapshot)
}

// =============================================================================
// Shortfalls
// =============================================================================

/// One cart line that asks for more than the latest stock report allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockShortfall {
    pub product_id: ProductId,
    pub sku: String,
    pub in_cart: i64,
    pub available: i64,
}

/// Compares cart lines against fresh snapshots.
///
/// A line without a matching snapshot counts as zero available: the
/// Inventory API no longer lists the product for this shop.
/// Result order follows cart order.
pub fn find_shortfalls(lines: &[LineItem], snapshots: &[StockSnapshot]) -> Vec<StockShortfall> {
    let by_product: HashMap<ProductId, &StockSnapshot> =
        snapshots.iter().map(|s| (s.product_id, s)).collect();

    lines
        .iter()
        .filter_map(|line| {
            let available = by_product
                .get(&line.product_id)
                .map(|s| available_quantity(s))
                .unwrap_or(0);
            (line.quantity > available).then(|| StockShortfall {
                product_id: line.product_id,
                sku: line.sku.clone(),
                in_cart: line.quantity,
                available,
            })
        })
        .collect()
}

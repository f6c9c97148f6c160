//! # In-Memory APIs
//!
//! Inventory and Sales API implementations backed by a shared map, for
//! tests and the `pos-sim` demo.
//!
//! ```text
//! ┌───────────────────────┐        shared Arc<Mutex<StockTable>>
//! │  InMemoryInventory    │◄──────────────────────────┐
//! │  fetch_stock()        │                           │
//! └───────────────────────┘                           │
//! ┌───────────────────────┐                           │
//! │  InMemorySales        │── check all lines ──► decrement on_hand
//! │  create_sale()        │   (one lock: all or nothing)
//! └───────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use shopdesk_core::stock::available_quantity;
use shopdesk_core::{Money, ProductId, ShopId, StockSnapshot, TaxRate};

use crate::api::{
    CreateSaleRequest, InventoryApi, InventoryApiError, SaleReceipt, SalesApi, SalesApiError,
};

type StockTable = HashMap<ProductId, StockSnapshot>;

// =============================================================================
// Inventory
// =============================================================================

/// Stock levels for a single shop.
#[derive(Debug, Clone)]
pub struct InMemoryInventory {
    shop_id: ShopId,
    stock: Arc<Mutex<StockTable>>,
}

impl InMemoryInventory {
    pub fn new(shop_id: ShopId) -> Self {
        InMemoryInventory {
            shop_id,
            stock: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn shop_id(&self) -> ShopId {
        self.shop_id
    }

    /// Sets (or replaces) one product's levels.
    pub async fn set_stock(&self, product_id: ProductId, on_hand: i64, reserved: i64) {
        self.stock
            .lock()
            .await
            .insert(product_id, StockSnapshot::new(product_id, on_hand, reserved));
    }

    pub async fn snapshot(&self, product_id: ProductId) -> Option<StockSnapshot> {
        self.stock.lock().await.get(&product_id).copied()
    }
}

#[async_trait]
impl InventoryApi for InMemoryInventory {
    async fn fetch_stock(
        &self,
        shop_id: ShopId,
        product_ids: &[ProductId],
    ) -> Result<Vec<StockSnapshot>, InventoryApiError> {
        if shop_id != self.shop_id {
            return Ok(Vec::new());
        }

        let stock = self.stock.lock().await;
        Ok(product_ids
            .iter()
            .filter_map(|id| stock.get(id).copied())
            .collect())
    }
}

// =============================================================================
// Sales
// =============================================================================

/// Records sales and decrements the shared inventory.
#[derive(Debug, Clone)]
pub struct InMemorySales {
    inventory: InMemoryInventory,
    tax_rate: TaxRate,
    state: Arc<Mutex<SalesState>>,
}

#[derive(Debug, Default)]
struct SalesState {
    recorded: Vec<CreateSaleRequest>,
    fail_next: Option<SalesApiError>,
}

impl InMemorySales {
    pub fn new(inventory: InMemoryInventory, tax_rate: TaxRate) -> Self {
        InMemorySales {
            inventory,
            tax_rate,
            state: Arc::new(Mutex::new(SalesState::default())),
        }
    }

    /// Every accepted sale request, oldest first.
    pub async fn recorded(&self) -> Vec<CreateSaleRequest> {
        self.state.lock().await.recorded.clone()
    }

    /// Makes the next `create_sale` fail with `error` without touching stock.
    pub async fn fail_next(&self, error: SalesApiError) {
        self.state.lock().await.fail_next = Some(error);
    }
}

#[async_trait]
impl SalesApi for InMemorySales {
    async fn create_sale(&self, request: &CreateSaleRequest) -> Result<SaleReceipt, SalesApiError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        if ShopId(request.shop_id) != self.inventory.shop_id {
            return Err(SalesApiError::Rejected {
                status: 404,
                detail: format!("Shop {} not found", request.shop_id),
            });
        }
        if request.items.is_empty() {
            return Err(SalesApiError::Rejected {
                status: 422,
                detail: "Sale must contain at least one item".to_string(),
            });
        }

        let total_amount = request
            .items
            .iter()
            .try_fold(Money::zero(), |acc, item| {
                item.unit_price
                    .checked_multiply_quantity(item.quantity)
                    .and_then(|gross| gross.checked_sub(item.discount))
                    .and_then(|net| acc.checked_add(net))
            })
            .and_then(|subtotal| subtotal.checked_add(subtotal.calculate_tax(self.tax_rate)))
            .ok_or_else(|| SalesApiError::Rejected {
                status: 422,
                detail: "Sale amounts are out of range".to_string(),
            })?;

        let mut stock = self.inventory.stock.lock().await;

        for item in &request.items {
            let product_id = ProductId(item.product_id);
            let available = stock.get(&product_id).map(available_quantity).unwrap_or(0);
            if item.quantity > available {
                return Err(SalesApiError::InsufficientStock {
                    product_id,
                    available,
                });
            }
        }

        for item in &request.items {
            if let Some(level) = stock.get_mut(&ProductId(item.product_id)) {
                level.quantity_on_hand -= item.quantity;
            }
        }

        state.recorded.push(request.clone());
        let sale_id = state.recorded.len() as i64;
        debug!(sale_id, "In-memory sale recorded");

        Ok(SaleReceipt {
            sale_id,
            invoice_number: format!("INV-{:06}", sale_id),
            total_amount,
        })
    }
}

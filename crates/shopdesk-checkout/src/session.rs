//! # POS Session
//!
//! One cashier's checkout: the cart, its pricing, payment previews and the
//! final hand-off to the Sales API.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Lifecycle                                    │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│  Sale    │       │
//! │  │  Cart    │     │          │     │ Preview  │     │ Recorded │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └────┬─────┘       │
//! │       ▲                │                │                │              │
//! │       │           add_product      preview_payment       │              │
//! │       │           update_quantity  quick_amounts         │              │
//! │       │           remove_item                            │              │
//! │       │                                                  │              │
//! │       └──────────── cart cleared only after success ◄────┘              │
//! │                                                                         │
//! │  Any failure in finalize (short cash, stale stock, API error) leaves   │
//! │  the cart exactly as it was.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods that call the APIs take `&mut self`, so a session never has two
//! mutations in flight.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shopdesk_core::payment::{self, compute_change, suggest_quick_amounts};
use shopdesk_core::stock::find_shortfalls;
use shopdesk_core::validation::{validate_customer_phone, validate_notes, validate_payment_reference};
use shopdesk_core::{
    CartState, CartStore, CoreError, LineItem, Money, PaymentMethod, PaymentResult,
    PricingSummary, Product, ProductId, QuantityChange, QuickAmount, ShopId, StockShortfall,
    StockSnapshot, TaxRate,
};

use crate::api::{CreateSaleRequest, InventoryApi, SaleItemRequest, SaleReceipt, SalesApi, SalesApiError};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Views
// =============================================================================

/// Cart contents plus freshly computed totals, as the cart panel renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub state: CartState,
    pub items: Vec<LineItem>,
    pub summary: PricingSummary,
}

/// What the cashier confirms in the payment modal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub method: PaymentMethod,
    /// Raw text from the amount field; ignored for non-cash methods.
    #[serde(default)]
    pub amount_received: String,
    /// Card / UPI transaction id. Generated when absent for non-cash sales.
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A sale the Sales API accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSale {
    pub receipt: SaleReceipt,
    pub items: Vec<LineItem>,
    pub summary: PricingSummary,
    pub payment: PaymentResult,
    pub payment_reference: Option<String>,
    pub completed_at: DateTime<Utc>,
}

// =============================================================================
// Session
// =============================================================================

/// A checkout session for one cashier at one shop.
pub struct PosSession {
    id: Uuid,
    shop_id: ShopId,
    tax_rate: TaxRate,
    verify_stock_before_submit: bool,
    started_at: DateTime<Utc>,
    cart: CartStore,
    inventory: Arc<dyn InventoryApi>,
    sales: Arc<dyn SalesApi>,
}

impl PosSession {
    pub fn new(
        config: &CheckoutConfig,
        inventory: Arc<dyn InventoryApi>,
        sales: Arc<dyn SalesApi>,
    ) -> Self {
        let session = PosSession {
            id: Uuid::new_v4(),
            shop_id: config.shop_id(),
            tax_rate: config.tax_rate(),
            verify_stock_before_submit: config.checkout.verify_stock_before_submit,
            started_at: Utc::now(),
            cart: CartStore::with_max_items(config.checkout.max_cart_items),
            inventory,
            sales,
        };
        info!(session = %session.id, shop_id = %session.shop_id, "POS session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn shop_id(&self) -> ShopId {
        self.shop_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Totals recomputed from the current cart.
    pub fn summary(&self) -> PricingSummary {
        self.cart.summary(self.tax_rate)
    }

    pub fn view(&self) -> CartView {
        CartView {
            state: self.cart.state(),
            items: self.cart.items().to_vec(),
            summary: self.summary(),
        }
    }

    // =========================================================================
    // Cart commands
    // =========================================================================

    /// Adds one unit of `product`, using a fresh stock snapshot.
    ///
    /// ## User Workflow
    /// ```text
    /// Cashier taps product tile
    ///      │
    ///      ▼
    /// Inventory API: stock for this product
    ///      │
    ///      ├── not listed / all reserved ─► OutOfStock (toast, cart unchanged)
    ///      │
    ///      └── cart.add_item() ─► qty + 1 or new line
    /// ```
    pub async fn add_product(&mut self, product: &Product) -> CheckoutResult<CartView> {
        debug!(session = %self.id, product_id = %product.id, sku = %product.sku, "add_product");

        let snapshot = self.fetch_snapshot(product.id).await?;

        match self.cart.add_item(product, &snapshot) {
            Ok(quantity) => {
                debug!(session = %self.id, product_id = %product.id, quantity, "Item added");
                Ok(self.view())
            }
            Err(err) => {
                if matches!(err, CoreError::OutOfStock { .. }) {
                    warn!(session = %self.id, "{}", err);
                }
                Err(err.into())
            }
        }
    }

    /// Sets a line's quantity; clamps to the stock ceiling, 0 removes.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> CheckoutResult<(QuantityChange, CartView)> {
        debug!(session = %self.id, %product_id, quantity, "update_quantity");

        let change = self.cart.update_quantity(product_id, quantity)?;
        if let QuantityChange::Updated {
            requested,
            applied,
            clamped: true,
        } = change
        {
            debug!(session = %self.id, %product_id, requested, applied, "Quantity clamped to stock");
        }
        Ok((change, self.view()))
    }

    pub fn remove_item(&mut self, product_id: ProductId) -> CartView {
        debug!(session = %self.id, %product_id, "remove_item");
        self.cart.remove_item(product_id);
        self.view()
    }

    /// Discards the cart (cashier pressed "New sale").
    pub fn clear(&mut self) -> CartView {
        debug!(session = %self.id, lines = self.cart.len(), "clear_cart");
        self.cart.clear();
        self.view()
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Live change / shortfall for the payment modal. Never fails on a
    /// short payment.
    pub fn preview_payment(
        &self,
        method: PaymentMethod,
        amount_received: &str,
    ) -> CheckoutResult<PaymentResult> {
        Ok(compute_change(self.summary().total, method, amount_received)?)
    }

    /// Preview for a quick-amount button.
    pub fn preview_quick_amount(&self, amount: Money) -> CheckoutResult<PaymentResult> {
        Ok(payment::compute_change_amount(
            self.summary().total,
            PaymentMethod::Cash,
            amount,
        )?)
    }

    pub fn quick_amounts(&self) -> Vec<QuickAmount> {
        suggest_quick_amounts(self.summary().total)
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Compares every cart line against the Inventory API right now.
    pub async fn check_stock(&self) -> CheckoutResult<Vec<StockShortfall>> {
        let product_ids: Vec<ProductId> = self.cart.items().iter().map(|l| l.product_id).collect();
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let snapshots = self.inventory.fetch_stock(self.shop_id, &product_ids).await?;
        Ok(find_shortfalls(self.cart.items(), &snapshots))
    }

    async fn fetch_snapshot(&self, product_id: ProductId) -> CheckoutResult<StockSnapshot> {
        let snapshots = self.inventory.fetch_stock(self.shop_id, &[product_id]).await?;
        // Unlisted for this shop means nothing to sell.
        Ok(snapshots
            .into_iter()
            .find(|s| s.product_id == product_id)
            .unwrap_or_else(|| StockSnapshot::new(product_id, 0, 0)))
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    /// Submits the cart as a sale.
    ///
    /// ## Steps
    /// 1. Cart must not be empty
    /// 2. Payment must cover the total (`InsufficientPayment`)
    /// 3. Optional fields validated (reference, phone, notes)
    /// 4. Stock re-checked when configured (`StaleStock`, nothing submitted)
    /// 5. Sales API call; a stock conflict there is also `StaleStock`
    /// 6. On success only: cart cleared
    pub async fn finalize(&mut self, request: FinalizeRequest) -> CheckoutResult<CompletedSale> {
        debug!(session = %self.id, method = %request.method, "finalize");

        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let summary = self.summary();
        let payment = compute_change(summary.total, request.method, &request.amount_received)?
            .finalize()
            .map_err(|err| {
                warn!(session = %self.id, "{}", err);
                err
            })?;

        let payment_reference = non_blank(request.payment_reference)
            .or_else(|| (!request.method.is_cash()).then(generate_payment_reference));
        let customer_name = non_blank(request.customer_name);
        let customer_phone = non_blank(request.customer_phone);
        let notes = non_blank(request.notes);

        if let Some(reference) = &payment_reference {
            validate_payment_reference(reference).map_err(CoreError::from)?;
        }
        if let Some(phone) = &customer_phone {
            validate_customer_phone(phone).map_err(CoreError::from)?;
        }
        if let Some(notes) = &notes {
            validate_notes(notes).map_err(CoreError::from)?;
        }

        if self.verify_stock_before_submit {
            let shortfalls = self.check_stock().await?;
            if !shortfalls.is_empty() {
                let err = CoreError::StaleStock { shortfalls };
                warn!(session = %self.id, "{}", err);
                return Err(err.into());
            }
        }

        let sale_request = CreateSaleRequest {
            shop_id: self.shop_id.0,
            items: self
                .cart
                .items()
                .iter()
                .map(|line| SaleItemRequest {
                    product_id: line.product_id.0,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount: Money::zero(),
                })
                .collect(),
            payment_method: request.method,
            payment_reference: payment_reference.clone(),
            customer_name,
            customer_phone,
            notes,
        };

        let receipt = match self.sales.create_sale(&sale_request).await {
            Ok(receipt) => receipt,
            Err(SalesApiError::InsufficientStock {
                product_id,
                available,
            }) => {
                let err = CoreError::StaleStock {
                    shortfalls: vec![self.shortfall_for(product_id, available)],
                };
                warn!(session = %self.id, "Sales API rejected sale: {}", err);
                return Err(err.into());
            }
            Err(other) => return Err(CheckoutError::Sales(other)),
        };

        let completed = CompletedSale {
            receipt,
            items: self.cart.items().to_vec(),
            summary,
            payment,
            payment_reference,
            completed_at: Utc::now(),
        };
        self.cart.clear();

        info!(
            session = %self.id,
            invoice = %completed.receipt.invoice_number,
            total = %completed.summary.total,
            items = completed.items.len(),
            method = %completed.payment.method,
            "Sale completed"
        );

        Ok(completed)
    }

    fn shortfall_for(&self, product_id: ProductId, available: i64) -> StockShortfall {
        let line = self.cart.get(product_id);
        StockShortfall {
            product_id,
            sku: line.map(|l| l.sku.clone()).unwrap_or_default(),
            in_cart: line.map(|l| l.quantity).unwrap_or(0),
            available,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `REF-<unix millis>`, the reference non-cash sales carry when the
/// cashier did not type one.
fn generate_payment_reference() -> String {
    format!("REF-{}", Utc::now().timestamp_millis())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, ErrorReport};
    use crate::memory::{InMemoryInventory, InMemorySales};

    struct Fixture {
        session: PosSession,
        inventory: InMemoryInventory,
        sales: InMemorySales,
    }

    fn product(id: i64, price_major: i64) -> Product {
        Product {
            id: ProductId(id),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            brand: None,
            price: Money::from_major(price_major),
            discount_price: None,
        }
    }

    async fn fixture_with(config: CheckoutConfig, stock: &[(i64, i64, i64)]) -> Fixture {
        let inventory = InMemoryInventory::new(config.shop_id());
        for (id, on_hand, reserved) in stock {
            inventory.set_stock(ProductId(*id), *on_hand, *reserved).await;
        }
        let sales = InMemorySales::new(inventory.clone(), config.tax_rate());
        let session = PosSession::new(
            &config,
            Arc::new(inventory.clone()),
            Arc::new(sales.clone()),
        );
        Fixture {
            session,
            inventory,
            sales,
        }
    }

    async fn fixture(stock: &[(i64, i64, i64)]) -> Fixture {
        fixture_with(CheckoutConfig::default(), stock).await
    }

    fn cash(amount: &str) -> FinalizeRequest {
        FinalizeRequest {
            method: PaymentMethod::Cash,
            amount_received: amount.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_product_uses_live_stock() {
        let mut f = fixture(&[(1, 3, 1)]).await;
        let p = product(1, 100);

        f.session.add_product(&p).await.unwrap();
        let view = f.session.add_product(&p).await.unwrap();
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[0].stock_ceiling, 2);

        let err = f.session.add_product(&p).await.unwrap_err();
        assert_eq!(ErrorReport::from(&err).code, ErrorCode::OutOfStock);
        assert_eq!(f.session.cart().total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_unlisted_product_is_out_of_stock() {
        let mut f = fixture(&[]).await;
        let err = f.session.add_product(&product(5, 10)).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::OutOfStock { available: 0, .. })
        ));
        assert_eq!(f.session.view().state, CartState::Empty);
    }

    #[tokio::test]
    async fn test_negative_catalog_price_is_rejected() {
        let mut f = fixture(&[(1, 5, 0)]).await;
        let catalog = crate::api::parse_products(
            r#"[{"id": 1, "name": "Misc", "sku": "MISC", "price": "-100"}]"#,
        )
        .unwrap();

        let err = f.session.add_product(&catalog[0]).await.unwrap_err();
        assert_eq!(ErrorReport::from(&err).code, ErrorCode::ValidationError);
        assert_eq!(f.session.view().state, CartState::Empty);
        assert!(f.session.summary().total.is_zero());

        let err = f.session.finalize(cash("0")).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(f.sales.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_clamps_and_reprices() {
        let mut f = fixture(&[(1, 2, 0)]).await;
        let p = product(1, 1000);
        f.session.add_product(&p).await.unwrap();
        f.session.add_product(&p).await.unwrap();

        let (change, view) = f.session.update_quantity(ProductId(1), 5).unwrap();
        assert!(matches!(change, QuantityChange::Updated { applied: 2, clamped: true, .. }));
        assert_eq!(view.summary.subtotal, Money::from_major(2000));
        assert_eq!(view.summary.total, Money::from_major(2360));

        let (change, view) = f.session.update_quantity(ProductId(1), 0).unwrap();
        assert_eq!(change, QuantityChange::Removed);
        assert_eq!(view.state, CartState::Empty);
    }

    #[tokio::test]
    async fn test_cash_sale_completes_and_clears_cart() {
        let mut f = fixture(&[(1, 10, 0), (2, 4, 0)]).await;
        f.session.add_product(&product(1, 1000)).await.unwrap();
        f.session.add_product(&product(2, 250)).await.unwrap();
        f.session.add_product(&product(2, 250)).await.unwrap();

        // 1000 + 500 = 1500, +18% = 1770
        let preview = f.session.preview_payment(PaymentMethod::Cash, "2000").unwrap();
        assert_eq!(preview.change, Money::from_major(230));

        let sale = f.session.finalize(cash("2000")).await.unwrap();

        assert_eq!(sale.summary.total, Money::from_major(1770));
        assert_eq!(sale.receipt.total_amount, Money::from_major(1770));
        assert_eq!(sale.payment.change, Money::from_major(230));
        assert_eq!(sale.payment_reference, None);
        assert!(f.session.cart().is_empty());

        assert_eq!(f.inventory.snapshot(ProductId(2)).await.unwrap().quantity_on_hand, 2);
        let recorded = f.sales.recorded().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].items[1].quantity, 2);
        assert_eq!(recorded[0].items[1].discount, Money::zero());
    }

    #[tokio::test]
    async fn test_non_cash_sale_gets_generated_reference() {
        let mut f = fixture(&[(1, 10, 0)]).await;
        f.session.add_product(&product(1, 100)).await.unwrap();

        let sale = f
            .session
            .finalize(FinalizeRequest {
                method: PaymentMethod::Upi,
                amount_received: "garbage".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(sale.payment.amount_tendered, sale.summary.total);
        assert_eq!(sale.payment.change, Money::zero());
        let reference = sale.payment_reference.unwrap();
        assert!(reference.starts_with("REF-"));
        assert_eq!(f.sales.recorded().await[0].payment_reference, Some(reference));
    }

    #[tokio::test]
    async fn test_typed_reference_is_kept() {
        let mut f = fixture(&[(1, 10, 0)]).await;
        f.session.add_product(&product(1, 100)).await.unwrap();

        let sale = f
            .session
            .finalize(FinalizeRequest {
                method: PaymentMethod::Card,
                payment_reference: Some("  TXN-4471 ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sale.payment_reference.as_deref(), Some("TXN-4471"));
    }

    #[tokio::test]
    async fn test_insufficient_cash_blocks_finalize() {
        let mut f = fixture(&[(1, 10, 0)]).await;
        f.session.add_product(&product(1, 100)).await.unwrap();
        let before = f.session.view();

        let err = f.session.finalize(cash("117.99")).await.unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::InsufficientPayment { .. })
        ));
        assert_eq!(f.session.view(), before);
        assert!(f.sales.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_stock_detected_before_submit() {
        let mut f = fixture(&[(1, 5, 0)]).await;
        let p = product(1, 100);
        for _ in 0..3 {
            f.session.add_product(&p).await.unwrap();
        }

        // Another terminal sold most of the shelf meanwhile.
        f.inventory.set_stock(ProductId(1), 1, 0).await;
        let before = f.session.view();

        let err = f.session.finalize(cash("1000")).await.unwrap_err();

        match err {
            CheckoutError::Core(CoreError::StaleStock { shortfalls }) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].in_cart, 3);
                assert_eq!(shortfalls[0].available, 1);
            }
            other => panic!("expected StaleStock, got {:?}", other),
        }
        assert_eq!(f.session.view(), before);
        assert!(f.sales.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_sales_api_stock_conflict_is_stale_stock() {
        let mut config = CheckoutConfig::default();
        config.checkout.verify_stock_before_submit = false;
        let mut f = fixture_with(config, &[(1, 5, 0)]).await;
        let p = product(1, 100);
        f.session.add_product(&p).await.unwrap();
        f.session.add_product(&p).await.unwrap();

        f.inventory.set_stock(ProductId(1), 1, 0).await;

        let err = f.session.finalize(cash("1000")).await.unwrap_err();
        let report = ErrorReport::from(&err);
        assert_eq!(report.code, ErrorCode::StaleStock);
        assert_eq!(report.shortfalls[0].sku, "SKU-1");
        assert_eq!(report.shortfalls[0].in_cart, 2);
        assert_eq!(f.session.cart().total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_sales_api_failure_keeps_cart() {
        let mut f = fixture(&[(1, 5, 0)]).await;
        f.session.add_product(&product(1, 100)).await.unwrap();
        f.sales
            .fail_next(SalesApiError::Transport("connection reset".to_string()))
            .await;

        let err = f.session.finalize(cash("500")).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Sales(_)));
        assert_eq!(f.session.cart().len(), 1);
        assert_eq!(f.inventory.snapshot(ProductId(1)).await.unwrap().quantity_on_hand, 5);

        // Retry succeeds with the same cart.
        assert!(f.session.finalize(cash("500")).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_cart_and_bad_phone() {
        let mut f = fixture(&[(1, 5, 0)]).await;
        assert!(matches!(
            f.session.finalize(cash("10")).await,
            Err(CheckoutError::EmptyCart)
        ));

        f.session.add_product(&product(1, 100)).await.unwrap();
        let err = f
            .session
            .finalize(FinalizeRequest {
                customer_phone: Some("12ab".to_string()),
                ..cash("500")
            })
            .await
            .unwrap_err();
        assert_eq!(ErrorReport::from(&err).code, ErrorCode::ValidationError);
        assert_eq!(f.session.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_quick_amounts_follow_total() {
        let mut f = fixture(&[(1, 5, 0)]).await;
        f.session.add_product(&product(1, 1000)).await.unwrap();

        // total 1180
        let amounts: Vec<Money> = f.session.quick_amounts().iter().map(|q| q.amount).collect();
        assert_eq!(
            amounts,
            vec![
                Money::from_major(1180),
                Money::from_major(1200),
                Money::from_major(1500),
                Money::from_major(2000),
            ]
        );

        let preview = f.session.preview_quick_amount(Money::from_major(1500)).unwrap();
        assert_eq!(preview.change, Money::from_major(320));
    }
}

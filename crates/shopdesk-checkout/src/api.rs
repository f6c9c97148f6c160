//! # External API Boundary
//!
//! Wire shapes for the Inventory and Sales REST APIs, and the async traits
//! a session calls them through.
//!
//! ## Normalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Inbound (REST → core)                               │
//! │                                                                         │
//! │  { "discountPrice": "799.00" }  ─┐                                     │
//! │  { "discount_price": 799 }      ─┴─► ProductDto ──► Product            │
//! │                                                                         │
//! │  { "reservedQuantity": 2 }      ─┐                                     │
//! │  { "reserved_quantity": 2 }     ─┴─► StockDto ────► StockSnapshot      │
//! │                                                                         │
//! │  { "totalAmount": 2360.5 }      ─┐                                     │
//! │  { "total_amount": "2360.50" }  ─┴─► SaleResponseDto ─► SaleReceipt    │
//! │                                                                         │
//! │                     Outbound (core → REST)                              │
//! │                                                                         │
//! │  CreateSaleRequest ──► snake_case JSON, amounts as numbers             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts arrive as JSON numbers or decimal strings and are rounded to
//! paise exactly once, here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopdesk_core::{Money, PaymentMethod, Product, ProductId, ShopId, StockSnapshot};

// =============================================================================
// Money on the wire
// =============================================================================

/// `serde(with = "wire_money")`: reads a number or a decimal string,
/// writes a JSON number.
pub mod wire_money {
    use serde::{Deserialize, Deserializer, Serializer};
    use shopdesk_core::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireAmount {
        Number(f64),
        Text(String),
    }

    fn to_money<E: serde::de::Error>(amount: WireAmount) -> Result<Money, E> {
        match amount {
            WireAmount::Number(n) => Money::from_f64_rounded(n).map_err(E::custom),
            WireAmount::Text(s) => s.parse::<Money>().map_err(E::custom),
        }
    }

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.to_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        to_money(WireAmount::deserialize(deserializer)?)
    }

    /// The same for optional amounts; `null` and absent both mean `None`.
    pub mod option {
        use super::{to_money, WireAmount};
        use serde::{Deserialize, Deserializer, Serializer};
        use shopdesk_core::Money;

        pub fn serialize<S: Serializer>(
            money: &Option<Money>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match money {
                Some(m) => serializer.serialize_some(&m.to_f64()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Money>, D::Error> {
            Option::<WireAmount>::deserialize(deserializer)?
                .map(to_money)
                .transpose()
        }
    }
}

// =============================================================================
// Inbound DTOs
// =============================================================================

/// Catalog product as returned by `GET /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(with = "wire_money")]
    pub price: Money,
    #[serde(default, alias = "discountPrice", with = "wire_money::option")]
    pub discount_price: Option<Money>,
}

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        Product {
            id: ProductId(dto.id),
            name: dto.name,
            sku: dto.sku,
            brand: dto.brand.filter(|b| !b.trim().is_empty()),
            price: dto.price,
            discount_price: dto.discount_price,
        }
    }
}

/// One row of `GET /inventory?shop_id=…`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDto {
    #[serde(alias = "productId")]
    pub product_id: i64,
    #[serde(alias = "quantityOnHand", alias = "quantity_on_hand")]
    pub quantity: i64,
    #[serde(default, alias = "reservedQuantity")]
    pub reserved_quantity: i64,
}

impl From<StockDto> for StockSnapshot {
    fn from(dto: StockDto) -> Self {
        StockSnapshot::new(ProductId(dto.product_id), dto.quantity, dto.reserved_quantity)
    }
}

/// Sales API answer to `POST /sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleResponseDto {
    pub id: i64,
    #[serde(alias = "invoiceNumber")]
    pub invoice_number: String,
    #[serde(default, with = "wire_money::option")]
    pub subtotal: Option<Money>,
    #[serde(default, alias = "taxAmount", with = "wire_money::option")]
    pub tax_amount: Option<Money>,
    #[serde(alias = "totalAmount", with = "wire_money")]
    pub total_amount: Money,
}

/// A recorded sale, as the session reports it back to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale_id: i64,
    pub invoice_number: String,
    pub total_amount: Money,
}

impl From<SaleResponseDto> for SaleReceipt {
    fn from(dto: SaleResponseDto) -> Self {
        SaleReceipt {
            sale_id: dto.id,
            invoice_number: dto.invoice_number,
            total_amount: dto.total_amount,
        }
    }
}

/// Decodes a product list regardless of which naming the backend used.
pub fn parse_products(json: &str) -> Result<Vec<Product>, serde_json::Error> {
    let dtos: Vec<ProductDto> = serde_json::from_str(json)?;
    Ok(dtos.into_iter().map(Product::from).collect())
}

// =============================================================================
// Outbound DTOs
// =============================================================================

/// One line of `POST /sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItemRequest {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(with = "wire_money")]
    pub unit_price: Money,
    /// Always zero from the POS: `unit_price` is already the discounted price.
    #[serde(with = "wire_money")]
    pub discount: Money,
}

/// Body of `POST /sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSaleRequest {
    pub shop_id: i64,
    pub items: Vec<SaleItemRequest>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// API errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryApiError {
    #[error("request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SalesApiError {
    /// The backend found less stock than the sale needs (HTTP 400 with an
    /// insufficient-stock detail).
    #[error("insufficient stock for product {product_id}: {available} available")]
    InsufficientStock { product_id: ProductId, available: i64 },

    #[error("request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

// =============================================================================
// API traits
// =============================================================================

/// Read side of the Inventory API.
///
/// Products the API does not list for the shop are simply absent from the
/// result.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn fetch_stock(
        &self,
        shop_id: ShopId,
        product_ids: &[ProductId],
    ) -> Result<Vec<StockSnapshot>, InventoryApiError>;
}

/// Sales API. Creating a sale decrements inventory on the backend.
#[async_trait]
pub trait SalesApi: Send + Sync {
    async fn create_sale(&self, request: &CreateSaleRequest) -> Result<SaleReceipt, SalesApiError>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accepts_both_namings() {
        let snake: ProductDto = serde_json::from_str(
            r#"{"id": 1, "name": "Tea", "sku": "TEA-250", "price": 120, "discount_price": "99.999"}"#,
        )
        .unwrap();
        let camel: ProductDto = serde_json::from_str(
            r#"{"id": 1, "name": "Tea", "sku": "TEA-250", "price": "120.00", "discountPrice": 100.0}"#,
        )
        .unwrap();

        assert_eq!(snake, camel);
        assert_eq!(snake.discount_price, Some(Money::from_major(100)));

        let product = Product::from(snake);
        assert_eq!(product.selling_price(), Money::from_major(100));
    }

    #[test]
    fn test_product_without_discount() {
        let dto: ProductDto = serde_json::from_str(
            r#"{"id": 2, "name": "Soap", "sku": "SOAP-1", "brand": "", "price": 45.5, "discountPrice": null}"#,
        )
        .unwrap();
        let product = Product::from(dto);
        assert_eq!(product.discount_price, None);
        assert_eq!(product.brand, None);
        assert_eq!(product.price, Money::from_minor(4550));
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let result: Result<ProductDto, _> = serde_json::from_str(
            r#"{"id": 3, "name": "X", "sku": "X", "price": "twelve"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_amount_is_rejected() {
        let result = parse_products(
            r#"[{"id": 1, "name": "A", "sku": "A-1", "price": "50000000000000000"}]"#,
        );
        assert!(result.is_err());

        let result = parse_products(
            r#"[{"id": 1, "name": "A", "sku": "A-1", "price": 10, "discount_price": 5e16}]"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_stock_dto_namings() {
        let a: StockDto =
            serde_json::from_str(r#"{"product_id": 5, "quantity": 10, "reserved_quantity": 3}"#)
                .unwrap();
        let b: StockDto =
            serde_json::from_str(r#"{"productId": 5, "quantity": 10, "reservedQuantity": 3}"#)
                .unwrap();
        assert_eq!(a, b);

        let snapshot = StockSnapshot::from(a);
        assert_eq!(snapshot.quantity_reserved, 3);

        let no_reserved: StockDto =
            serde_json::from_str(r#"{"productId": 5, "quantity": 10}"#).unwrap();
        assert_eq!(no_reserved.reserved_quantity, 0);
    }

    #[test]
    fn test_sale_response_namings() {
        let dto: SaleResponseDto = serde_json::from_str(
            r#"{"id": 77, "invoiceNumber": "INV-000077", "totalAmount": "2360.50"}"#,
        )
        .unwrap();
        let receipt = SaleReceipt::from(dto);
        assert_eq!(receipt.invoice_number, "INV-000077");
        assert_eq!(receipt.total_amount, Money::from_minor(236_050));
    }

    #[test]
    fn test_create_sale_request_is_snake_case_with_numbers() {
        let request = CreateSaleRequest {
            shop_id: 1,
            items: vec![SaleItemRequest {
                product_id: 9,
                quantity: 2,
                unit_price: Money::from_minor(99_950),
                discount: Money::zero(),
            }],
            payment_method: PaymentMethod::Upi,
            payment_reference: Some("REF-1".to_string()),
            customer_name: None,
            customer_phone: None,
            notes: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["payment_method"], "upi");
        assert_eq!(json["items"][0]["unit_price"], 999.5);
        assert_eq!(json["items"][0]["discount"], 0.0);
        assert!(json.get("customer_name").is_none());
    }

    #[test]
    fn test_parse_products() {
        let products = parse_products(
            r#"[{"id": 1, "name": "A", "sku": "A-1", "price": 10},
                {"id": 2, "name": "B", "sku": "B-1", "price": "20.00", "discountPrice": 15}]"#,
        )
        .unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].selling_price(), Money::from_major(15));

        assert!(parse_products("not json").is_err());
    }
}

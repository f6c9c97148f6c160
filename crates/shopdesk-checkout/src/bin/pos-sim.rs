//! # POS Simulator
//!
//! Runs a scripted checkout against in-memory Inventory / Sales APIs and
//! prints the receipt.
//!
//! ## Usage
//! ```bash
//! cargo run -p shopdesk-checkout --bin pos-sim
//!
//! # Custom config file
//! cargo run -p shopdesk-checkout --bin pos-sim -- --config ./checkout.toml
//!
//! # Pay by UPI instead of cash
//! cargo run -p shopdesk-checkout --bin pos-sim -- --method upi
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use shopdesk_checkout::api::{parse_products, StockDto};
use shopdesk_checkout::logging::{init_tracing, DEFAULT_FILTER};
use shopdesk_checkout::memory::{InMemoryInventory, InMemorySales};
use shopdesk_checkout::{CheckoutConfig, CurrencyFormatter, ErrorReport, FinalizeRequest, PosSession};
use shopdesk_core::{PaymentMethod, StockSnapshot};

/// Catalog as the backend serves it (both namings appear in the wild).
const CATALOG_JSON: &str = r#"[
    {"id": 101, "name": "Basmati Rice 5kg", "sku": "RICE-5KG", "brand": "India Gate", "price": 899, "discount_price": 799},
    {"id": 102, "name": "Toor Dal 1kg", "sku": "DAL-1KG", "price": "165.50"},
    {"id": 103, "name": "Masala Chai 250g", "sku": "TEA-250", "brand": "Wagh Bakri", "price": 140.0, "discountPrice": "129.99"},
    {"id": 104, "name": "Ghee 1L", "sku": "GHEE-1L", "price": 675}
]"#;

const INVENTORY_JSON: &str = r#"[
    {"product_id": 101, "quantity": 12, "reserved_quantity": 2},
    {"productId": 102, "quantity": 3, "reservedQuantity": 1},
    {"productId": 103, "quantity": 40},
    {"product_id": 104, "quantity": 1, "reserved_quantity": 1}
]"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = init_tracing(DEFAULT_FILTER) {
        eprintln!("Logging disabled: {}", e);
    }

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut method = PaymentMethod::Cash;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--method" | "-m" => {
                if i + 1 < args.len() {
                    method = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: pos-sim [--config <path>] [--method cash|card|upi|online]");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = CheckoutConfig::load_or_default(config_path);
    let fmt = CurrencyFormatter::from_settings(&config.currency);
    info!(shop = %config.shop.name, tax_bps = config.pricing.tax_rate_bps, "Simulator starting");

    // Seed the in-memory backend
    let inventory = InMemoryInventory::new(config.shop_id());
    let stock: Vec<StockDto> = serde_json::from_str(INVENTORY_JSON)?;
    for row in stock {
        let snapshot = StockSnapshot::from(row);
        inventory
            .set_stock(
                snapshot.product_id,
                snapshot.quantity_on_hand,
                snapshot.quantity_reserved,
            )
            .await;
    }
    let sales = InMemorySales::new(inventory.clone(), config.tax_rate());
    let catalog = parse_products(CATALOG_JSON)?;

    let mut session = PosSession::new(&config, Arc::new(inventory.clone()), Arc::new(sales));

    // Scripted cashier actions
    let rice = &catalog[0];
    let dal = &catalog[1];
    let chai = &catalog[2];
    let ghee = &catalog[3];

    session.add_product(rice).await?;
    session.add_product(rice).await?;
    session.add_product(dal).await?;
    session.add_product(chai).await?;

    // Ghee is fully reserved: the tile shows a warning and nothing changes.
    if let Err(err) = session.add_product(ghee).await {
        println!("! {}", ErrorReport::from(&err).message);
    }

    // Typing 5 for dal clamps to the 2 available.
    let (change, _) = session.update_quantity(dal.id, 5)?;
    println!("~ Dal quantity: {:?}", change);

    let summary = session.summary();
    let quick: Vec<String> = session
        .quick_amounts()
        .iter()
        .map(|q| {
            if q.is_exact {
                format!("{} (exact)", fmt.format(q.amount))
            } else {
                fmt.format(q.amount)
            }
        })
        .collect();
    println!("~ Quick amounts: {}", quick.join(" | "));

    let tendered = session
        .quick_amounts()
        .last()
        .map(|q| q.amount)
        .unwrap_or(summary.total);

    let sale = match session
        .finalize(FinalizeRequest {
            method,
            amount_received: tendered.to_string(),
            customer_name: Some("Walk-in".to_string()),
            ..Default::default()
        })
        .await
    {
        Ok(sale) => sale,
        Err(err) => {
            let report = ErrorReport::from(&err);
            println!("! {}", serde_json::to_string_pretty(&report)?);
            return Err(report.into());
        }
    };

    // Receipt
    println!();
    println!("{:^44}", config.shop.name);
    println!("{:^44}", sale.receipt.invoice_number);
    println!("{}", "-".repeat(44));
    for line in &sale.items {
        println!(
            "{:<24}{:>4} {:>15}",
            line.name,
            format!("x{}", line.quantity),
            fmt.format(line.line_total())
        );
    }
    println!("{}", "-".repeat(44));
    println!("{:<28}{:>16}", "Subtotal", fmt.format(sale.summary.subtotal));
    println!(
        "{:<28}{:>16}",
        format!("GST ({}%)", sale.summary.tax_rate.percentage()),
        fmt.format(sale.summary.tax_amount)
    );
    println!("{:<28}{:>16}", "TOTAL", fmt.format(sale.summary.total));
    println!(
        "{:<28}{:>16}",
        format!("Paid ({})", sale.payment.method),
        fmt.format(sale.payment.amount_tendered)
    );
    println!("{:<28}{:>16}", "Change", fmt.format(sale.payment.change));
    if let Some(reference) = &sale.payment_reference {
        println!("Ref: {}", reference);
    }

    if let Some(level) = inventory.snapshot(rice.id).await {
        info!(sku = %rice.sku, on_hand = level.quantity_on_hand, "Stock after sale");
    }

    Ok(())
}

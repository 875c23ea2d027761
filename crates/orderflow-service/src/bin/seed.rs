//! # Seed Data Generator
//!
//! Populates the database with a demo catalog and one demo order.
//!
//! ## Usage
//! ```bash
//! # Demo catalog only
//! cargo run -p orderflow-service --bin seed
//!
//! # Demo catalog plus 500 generated products
//! cargo run -p orderflow-service --bin seed -- --count 500
//!
//! # Specify database path (overrides DATABASE_PATH)
//! cargo run -p orderflow-service --bin seed -- --db ./data/orderflow.db
//! ```

use std::env;

use orderflow_core::{NewProduct, OrderItemRequest, Principal};
use orderflow_db::Database;
use orderflow_service::{telemetry, AppConfig, OrderLifecycle, ProductCatalog};
use tracing::{info, warn};
use uuid::Uuid;

/// Fixed demo catalog: (name, price in cents, stock)
const DEMO_PRODUCTS: &[(&str, i64, i64)] = &[
    ("Laptop", 99999, 10),
    ("Wireless Mouse", 2999, 150),
    ("Mechanical Keyboard", 8999, 40),
    ("USB-C Cable", 1299, 500),
    ("27\" Monitor", 24999, 15),
];

/// Name stems for generated products
const STEMS: &[&str] = &["Widget", "Gadget", "Adapter", "Sleeve", "Stand", "Hub"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = AppConfig::load()?;

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut count: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("orderflow seed data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Extra generated products (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: DATABASE_PATH)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    telemetry::init(&config)?;

    info!(
        database = %config.database_path.display(),
        generated = count,
        "Seeding database"
    );

    let db = Database::new(config.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    let catalog = ProductCatalog::new(db.clone());
    let mut demo = Vec::with_capacity(DEMO_PRODUCTS.len());

    for (name, price, stock) in DEMO_PRODUCTS {
        let product = catalog
            .create_product(&NewProduct {
                name: name.to_string(),
                price: *price,
                stock: *stock,
            })
            .await?;
        demo.push(product);
    }

    for n in 0..count {
        catalog.create_product(&generated_product(n)).await?;
    }

    let products = db.products().count().await?;
    info!(products, "Catalog seeded");

    // One order through the engine, so the order tables aren't empty
    let engine = OrderLifecycle::new(db.clone());
    let customer = Principal::customer(Uuid::new_v4().to_string());
    let items: Vec<OrderItemRequest> = demo
        .iter()
        .take(2)
        .map(|p| OrderItemRequest::new(p.id.clone(), 1))
        .collect();

    let order = engine.create_order(&customer, &items).await?;
    info!(order_id = %order.id, total = %order.total(), "Demo order placed");

    db.close().await;
    Ok(())
}

/// Deterministic product data for index `n`.
fn generated_product(n: usize) -> NewProduct {
    let stem = STEMS[n % STEMS.len()];

    NewProduct {
        name: format!("{} #{:04}", stem, n),
        // 4.99 - 49.99
        price: 499 + ((n * 37) % 4500) as i64,
        stock: (n % 101) as i64,
    }
}

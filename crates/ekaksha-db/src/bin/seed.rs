//! # Seed Data Generator
//!
//! Populates a development database with a small outfit catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p ekaksha-db --bin seed
//!
//! # Specify database path
//! cargo run -p ekaksha-db --bin seed -- --db ./data/ekaksha.db
//! ```
//!
//! ## Generated Data
//! - Categories: Men, Women, Kids
//! - A handful of offer bundles per category, newest last
//! - Coupons: one open-ended, one expiring in a month, one already expired
//! - Sample orders across every status
//! - One admin: `admin@ekaksha.in` / `admin123`

use chrono::{Duration, Utc};
use ekaksha_core::{Money, OrderStatus, Size, StockStatus};
use ekaksha_db::{Database, DbConfig, NewCoupon, NewOrder, NewProduct};
use std::env;

const DEFAULT_DB_PATH: &str = "./ekaksha_dev.db";
const ADMIN_EMAIL: &str = "admin@ekaksha.in";
const ADMIN_PASSWORD: &str = "admin123";

const CATEGORIES: &[(&str, &str)] = &[
    ("Men", "Shirts, kurtas and trousers"),
    ("Women", "Sarees, kurtis and dresses"),
    ("Kids", "Everyday wear for little ones"),
];

/// (category, name, offer quantity, offer price in rupees, sizes)
const PRODUCTS: &[(&str, &str, u32, i64, &[Size])] = &[
    ("Men", "Cotton Kurta", 2, 999, &[Size::M, Size::L, Size::XL]),
    ("Men", "Linen Shirt", 3, 1499, &[Size::S, Size::M, Size::L]),
    ("Men", "Chino Trousers", 2, 1299, &[Size::M, Size::L, Size::XL, Size::XXL]),
    ("Women", "Printed Kurti", 3, 1199, &[Size::S, Size::M, Size::L]),
    ("Women", "Silk Saree", 1, 2499, &[Size::M]),
    ("Women", "Rayon Dress", 2, 1599, &[Size::S, Size::M]),
    ("Kids", "Cotton T-Shirt", 4, 799, &[Size::S, Size::M]),
    ("Kids", "Denim Shorts", 2, 649, &[Size::S, Size::M, Size::L]),
];

const ORDERS: &[(&str, u32, i64, OrderStatus)] = &[
    ("Asha Verma", 2, 999, OrderStatus::Delivered),
    ("Ravi Kumar", 6, 2998, OrderStatus::Shipped),
    ("Meera Iyer", 1, 2499, OrderStatus::Paid),
    ("Imran Shaikh", 4, 799, OrderStatus::Pending),
    ("Neha Gupta", 3, 1199, OrderStatus::Cancelled),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from(DEFAULT_DB_PATH);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Ekaksha Outfits Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {})", DEFAULT_DB_PATH);
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    println!("🌱 Ekaksha Outfits Seed Data Generator");
    println!("======================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (name, description) in CATEGORIES {
        db.categories().insert(name, Some(*description)).await?;
    }
    println!("✓ {} categories", CATEGORIES.len());

    let now = Utc::now();
    let oldest = now - Duration::hours(PRODUCTS.len() as i64);
    for (idx, (category, name, offer_quantity, rupees, sizes)) in PRODUCTS.iter().enumerate() {
        let product = NewProduct {
            name: name.to_string(),
            offer_quantity: *offer_quantity,
            offer_price: Money::from_rupees(*rupees),
            sizes: sizes.to_vec(),
            category: category.to_string(),
            description: Some(format!("{} for ₹{}", offer_label(*offer_quantity), rupees)),
            stock_status: if idx % 5 == 4 {
                StockStatus::OutOfStock
            } else {
                StockStatus::InStock
            },
        };
        let created_at = oldest + Duration::hours(idx as i64);
        if let Err(e) = db.products().insert_at(&product, None, created_at).await {
            eprintln!("Failed to insert {}: {}", name, e);
        }
    }
    println!("✓ {} products", db.products().count().await?);

    let today = now.date_naive();
    let coupons = [
        NewCoupon {
            code: "WELCOME10".to_string(),
            discount_percent: 10,
            expiry_date: None,
            description: Some("10% off your first order".to_string()),
        },
        NewCoupon {
            code: "FESTIVE25".to_string(),
            discount_percent: 25,
            expiry_date: Some(today + Duration::days(30)),
            description: Some("Festive season sale".to_string()),
        },
        NewCoupon {
            code: "SUMMER50".to_string(),
            discount_percent: 50,
            expiry_date: Some(today - Duration::days(1)),
            description: Some("Expired summer clearance".to_string()),
        },
    ];
    for coupon in &coupons {
        db.coupons().insert(coupon).await?;
    }
    println!("✓ {} coupons ({} active)", coupons.len(), db.coupons().list_active(today).await?.len());

    for (idx, (customer, items, rupees, status)) in ORDERS.iter().enumerate() {
        let order = NewOrder {
            customer_name: customer.to_string(),
            total_items: *items,
            total_amount: Money::from_rupees(*rupees),
            status: *status,
        };
        db.orders()
            .insert_at(&order, now - Duration::days(idx as i64))
            .await?;
    }
    println!("✓ {} orders, revenue {}", ORDERS.len(), db.orders().revenue().await?);

    db.admins().insert(ADMIN_EMAIL, ADMIN_PASSWORD, "admin").await?;
    println!("✓ Admin {} / {}", ADMIN_EMAIL, ADMIN_PASSWORD);

    println!();
    println!("✓ Seed complete!");
    db.close().await;

    Ok(())
}

fn offer_label(quantity: u32) -> String {
    if quantity == 1 {
        "1 piece".to_string()
    } else {
        format!("{} pieces", quantity)
    }
}

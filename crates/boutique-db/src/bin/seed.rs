//! # Seed Data Generator
//!
//! Populates a development database with a small boutique catalog, a few
//! loyalty members and a handful of bills rung up through the real
//! checkout.
//!
//! ## Usage
//! ```bash
//! # Seed ./boutique.db (or BOUTIQUE_DB_PATH)
//! cargo run -p boutique-db --bin seed
//!
//! # Specify database path
//! cargo run -p boutique-db --bin seed -- --db ./data/boutique.db
//!
//! # Skip the sample bills
//! cargo run -p boutique-db --bin seed -- --no-bills
//! ```

use std::env;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use boutique_core::report::SalesSummary;
use boutique_core::validation::{validate_new_customer, validate_new_product};
use boutique_core::{
    pricing::Quote, Customer, LineItem, Money, NewCustomer, NewProduct, PaymentMode, Product,
    TaxRate, DEFAULT_LOW_STOCK_THRESHOLD, WALK_IN_CUSTOMER,
};
use boutique_db::{BillFilter, Database, StoreConfig};

/// (sku, name, category, size, color, stock, selling ₹, cost ₹, gst bps)
const CATALOG: &[(&str, &str, &str, &str, &str, i64, i64, i64, u32)] = &[
    ("SAR-SILK-001", "Banarasi Silk Saree", "Sarees", "Free", "Maroon", 12, 8500, 5200, 500),
    ("SAR-COTN-002", "Handloom Cotton Saree", "Sarees", "Free", "Indigo", 25, 2200, 1300, 500),
    ("SAR-CHIF-003", "Chiffon Party Saree", "Sarees", "Free", "Peach", 6, 4800, 2900, 500),
    ("KUR-ANAR-001", "Anarkali Kurta", "Kurtas", "M", "Emerald", 18, 1850, 1000, 500),
    ("KUR-ANAR-002", "Anarkali Kurta", "Kurtas", "L", "Emerald", 4, 1850, 1000, 500),
    ("KUR-STRT-003", "Straight Cotton Kurta", "Kurtas", "S", "White", 30, 950, 520, 500),
    ("LEH-BRDL-001", "Bridal Lehenga", "Lehengas", "M", "Red", 3, 32000, 21000, 1200),
    ("DUP-PHUL-001", "Phulkari Dupatta", "Dupattas", "Free", "Mustard", 40, 1200, 650, 500),
    ("JWL-JHMK-001", "Oxidised Jhumkas", "Accessories", "Free", "Silver", 50, 450, 180, 300),
    ("BAG-POTL-001", "Embroidered Potli Bag", "Accessories", "Free", "Gold", 8, 750, 380, 1200),
];

/// (name, phone, email)
const CUSTOMERS: &[(&str, &str, Option<&str>)] = &[
    ("Meera Iyer", "9876543210", Some("meera@example.com")),
    ("Ananya Rao", "9812345678", None),
    ("Farah Khan", "9900112233", Some("farah.k@example.com")),
];

/// Sample bills: (customer index, [(catalog index, qty)], discount ₹, points, payment)
type SampleBill = (Option<usize>, &'static [(usize, i64)], i64, i64, PaymentMode);

const SAMPLE_BILLS: &[SampleBill] = &[
    (None, &[(5, 2), (8, 1)], 0, 0, PaymentMode::Cash),
    (Some(0), &[(0, 1), (7, 1)], 500, 0, PaymentMode::Card),
    (Some(0), &[(3, 1)], 0, 50, PaymentMode::Upi),
    (Some(1), &[(1, 2), (8, 2)], 0, 0, PaymentMode::Upi),
    (None, &[(9, 1)], 0, 0, PaymentMode::Cash),
    (Some(2), &[(6, 1), (7, 2)], 2000, 0, PaymentMode::Card),
];

/// Staff id recorded on seeded bills.
const SEED_STAFF_ID: i64 = 1;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = StoreConfig::from_env()?;
    let mut ring_bills = true;

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--no-bills" => ring_bills = false,
            "--help" | "-h" => {
                println!("Boutique POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./boutique.db)");
                println!("      --no-bills     Seed catalog and customers only");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("Boutique POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::open(&config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    println!();
    println!("Adding catalog...");
    let mut products = Vec::with_capacity(CATALOG.len());
    for &(sku, name, category, size, color, stock, price, cost, gst_bps) in CATALOG {
        let new_product = NewProduct {
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            category: category.to_string(),
            size: Some(size.to_string()),
            color: Some(color.to_string()),
            stock,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            cost_price: Money::from_rupees(cost),
            selling_price: Money::from_rupees(price),
            gst_rate_bps: gst_bps,
        };
        validate_new_product(&new_product)?;
        products.push(db.products().insert(&new_product).await?);
    }
    println!("✓ Added {} products", products.len());

    // Customers
    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for &(name, phone, email) in CUSTOMERS {
        let new_customer = NewCustomer {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.map(str::to_string),
            address: None,
        };
        validate_new_customer(&new_customer)?;
        customers.push(db.customers().insert(&new_customer).await?);
    }
    println!("✓ Enrolled {} customers", customers.len());

    if !ring_bills {
        println!();
        println!("✓ Seed complete!");
        return Ok(());
    }

    // Bills, through the same transaction the till uses
    println!();
    println!("Ringing up sample bills...");
    let checkout = db.checkout_with(&config);
    for (customer_idx, lines, discount, points, payment_mode) in SAMPLE_BILLS {
        // Re-read so the quote sees the balance left by earlier bills
        let customer: Option<Customer> = match customer_idx {
            Some(idx) => db.customers().get_by_id(customers[*idx].id).await?,
            None => None,
        };
        let balance = customer.as_ref().map_or(0, |c| c.loyalty_points);

        let items = lines
            .iter()
            .map(|&(idx, qty)| LineItem::from_product(&products[idx], qty))
            .collect();

        let cart = Quote::build(
            items,
            TaxRate::from_bps(500),
            Money::from_rupees(*discount),
            *points,
            balance,
        )
        .into_cart_request(customer.as_ref(), WALK_IN_CUSTOMER, *payment_mode);

        match checkout.process(cart, SEED_STAFF_ID).await {
            Ok(bill) => println!(
                "  {}  {:<22} {:>12}  {}",
                bill.invoice_number,
                bill.customer_name,
                bill.total_amount.to_string(),
                bill.payment_mode
            ),
            Err(e) => warn!(error = %e, "Sample bill rejected"),
        }
    }

    // Summary
    let bills = db.bills().list(&BillFilter::default()).await?;
    let summary = SalesSummary::from_bills(&bills);
    println!();
    println!("Sales summary");
    println!("  Bills:        {}", summary.total_bills);
    println!("  Sales:        {}", summary.total_sales);
    println!("  Average bill: {}", summary.average_bill());
    println!("  GST:          {}", summary.total_gst);
    println!("  Discounts:    {}", summary.total_discount);
    for mode in &summary.payment_modes {
        println!("  {:<13} {} ({} bills)", format!("{}:", mode.payment_mode), mode.amount, mode.bills);
    }

    let low_stock: Vec<Product> = db.products().list_low_stock().await?;
    if !low_stock.is_empty() {
        println!();
        println!("Low stock");
        for product in &low_stock {
            println!("  {:<14} {:<24} {}", product.sku, product.name, product.stock);
        }
    }

    info!(bills = summary.total_bills, "Seed complete");
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - Default: INFO for most, DEBUG for boutique crates
/// - Override with `RUST_LOG` environment variable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,boutique=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

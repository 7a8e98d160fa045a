//! Fixtures shared by the unit tests in this crate.

use std::path::Path;

use boutique_core::types::TaxRate;
use boutique_core::{
    CartRequest, LineItem, Money, NewCustomer, NewProduct, PaymentMode, DEFAULT_LOW_STOCK_THRESHOLD,
    WALK_IN_CUSTOMER,
};

/// A ₹500 saree with 5% GST.
pub fn saree(sku: &str, stock: i64) -> NewProduct {
    NewProduct {
        sku: sku.to_string(),
        name: format!("Silk Saree {sku}"),
        description: None,
        category: "Sarees".to_string(),
        size: None,
        color: Some("Maroon".to_string()),
        stock,
        low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        cost_price: Money::from_rupees(300),
        selling_price: Money::from_rupees(500),
        gst_rate_bps: 500,
    }
}

pub fn meera() -> NewCustomer {
    NewCustomer {
        name: "Meera Iyer".to_string(),
        phone: "9876543210".to_string(),
        email: Some("meera@example.com".to_string()),
        address: None,
    }
}

/// A one-line cash cart whose figures add up (5% GST, no discount).
pub fn walk_in_cart(product_id: i64, quantity: i64, unit_rupees: i64) -> CartRequest {
    let unit_price = Money::from_rupees(unit_rupees);
    let line_total = unit_price.multiply_quantity(quantity);
    let gst_amount = line_total.calculate_tax(TaxRate::from_bps(500));

    CartRequest {
        customer_id: None,
        customer_name: WALK_IN_CUSTOMER.to_string(),
        customer_phone: None,
        items: vec![LineItem {
            product_id,
            product_name: format!("Product {product_id}"),
            quantity,
            unit_price,
            line_total,
        }],
        subtotal: line_total,
        discount: Money::zero(),
        gst_amount,
        total_amount: line_total + gst_amount,
        payment_mode: PaymentMode::Cash,
        loyalty_points_redeemed: 0,
        loyalty_points_earned: 0,
    }
}

/// Deletes a scratch database and its WAL side files.
pub fn remove_database(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

//! # Domain Types
//!
//! Core domain types used throughout Boutique POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  sku            │   │  phone (unique) │   │  invoice_number │       │
//! │  │  stock          │   │  loyalty_points │   │  items (JSON)   │       │
//! │  │  selling_price  │   └─────────────────┘   │  totals         │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  PaymentMode    │   │  CartRequest    │       │
//! │  │  bps (u32)      │   │  Cash / Card    │   │  what the till  │       │
//! │  │  500 = 5% GST   │   │  Upi / Other    │   │  submits        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A bill copies product names, unit prices and the customer's name/phone at
//! the moment of sale. Later catalog edits never change a printed invoice.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 500 bps = 5% and 1200 bps = 12%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable unit in the boutique catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Display name shown on the billing screen and invoice.
    pub name: String,

    pub description: Option<String>,

    pub category: String,

    pub size: Option<String>,

    pub color: Option<String>,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Stock at or below this level shows up in the low-stock report.
    pub low_stock_threshold: i64,

    pub cost_price: Money,

    pub selling_price: Money,

    /// GST rate in basis points (500 = 5%).
    pub gst_rate_bps: u32,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks if stock has fallen to the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// Fields needed to add a product to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub stock: i64,
    pub low_stock_threshold: i64,
    pub cost_price: Money,
    pub selling_price: Money,
    pub gst_rate_bps: u32,
}

// =============================================================================
// Customer
// =============================================================================

/// A known buyer enrolled in the loyalty program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Natural dedup key; two customers never share a phone number.
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Points balance. Never negative.
    pub loyalty_points: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields needed to enroll a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Payment Mode
// =============================================================================

/// How the customer paid for a bill.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMode {
    Cash,
    Card,
    Upi,
    Other,
}

impl PaymentMode {
    /// All modes, in display order.
    pub const ALL: [PaymentMode; 4] = [
        PaymentMode::Cash,
        PaymentMode::Card,
        PaymentMode::Upi,
        PaymentMode::Other,
    ];

    /// Wire/storage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Card => "card",
            PaymentMode::Upi => "upi",
            PaymentMode::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    /// Parses a query-string value such as `?paymentMode=upi`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PaymentMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentMode".to_string(),
                allowed: PaymentMode::ALL.iter().map(|m| m.to_string()).collect(),
            })
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of a bill. Not persisted on its own; stored inside the bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// `quantity × unit_price`, as submitted by the till.
    pub line_total: Money,
}

impl LineItem {
    /// Builds a line from a product snapshot, computing the line total.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price: product.selling_price,
            line_total: product.selling_price.multiply_quantity(quantity),
        }
    }

    /// What `line_total` should be for this quantity and unit price.
    #[inline]
    pub fn expected_line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart Request
// =============================================================================

/// A proposed sale submitted by the billing screen.
///
/// Financial figures are computed by the caller. The checkout stores them
/// as-is unless the store turns on total verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartRequest {
    #[serde(default)]
    pub customer_id: Option<i64>,

    /// Required, even for walk-ins.
    #[serde(default)]
    pub customer_name: String,

    #[serde(default)]
    pub customer_phone: Option<String>,

    #[serde(default)]
    pub items: Vec<LineItem>,

    pub subtotal: Money,

    #[serde(default)]
    pub discount: Money,

    pub gst_amount: Money,

    pub total_amount: Money,

    pub payment_mode: PaymentMode,

    #[serde(default)]
    pub loyalty_points_redeemed: i64,

    #[serde(default)]
    pub loyalty_points_earned: i64,
}

impl CartRequest {
    /// Decodes a cart from the JSON body the dashboard posts.
    ///
    /// Missing required fields (`subtotal`, `gstAmount`, `totalAmount`,
    /// `paymentMode`) and wrongly typed values become
    /// [`ValidationError::Malformed`]; a missing name or item list is
    /// reported later by validation with the field name.
    pub fn from_json(body: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(body).map_err(|e| ValidationError::Malformed {
            reason: e.to_string(),
        })
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A bill ready to be written: everything except the storage id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    pub invoice_number: String,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub gst_amount: Money,
    pub loyalty_points_redeemed: i64,
    pub loyalty_points_earned: i64,
    pub total_amount: Money,
    pub payment_mode: PaymentMode,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl NewBill {
    /// Assembles a bill from a validated cart.
    ///
    /// Names and prices are copied from the request, which is the
    /// snapshot the customer saw at the till.
    pub fn from_cart(
        cart: CartRequest,
        invoice_number: String,
        created_by: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        NewBill {
            invoice_number,
            customer_id: cart.customer_id,
            customer_name: cart.customer_name.trim().to_string(),
            customer_phone: cart
                .customer_phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            items: cart.items,
            subtotal: cart.subtotal,
            discount: cart.discount,
            gst_amount: cart.gst_amount,
            loyalty_points_redeemed: cart.loyalty_points_redeemed,
            loyalty_points_earned: cart.loyalty_points_earned,
            total_amount: cart.total_amount,
            payment_mode: cart.payment_mode,
            created_by,
            created_at,
        }
    }
}

/// An immutable record of one completed sale (a.k.a. invoice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bill {
    pub id: i64,
    /// Unique, sequential, e.g. `DB2025-004`.
    pub invoice_number: String,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub gst_amount: Money,
    pub loyalty_points_redeemed: i64,
    pub loyalty_points_earned: i64,
    pub total_amount: Money,
    pub payment_mode: PaymentMode,
    /// Staff member who rang up the sale.
    pub created_by: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Attaches the storage id to a freshly inserted bill.
    pub fn from_new(id: i64, bill: NewBill) -> Self {
        Bill {
            id,
            invoice_number: bill.invoice_number,
            customer_id: bill.customer_id,
            customer_name: bill.customer_name,
            customer_phone: bill.customer_phone,
            items: bill.items,
            subtotal: bill.subtotal,
            discount: bill.discount,
            gst_amount: bill.gst_amount,
            loyalty_points_redeemed: bill.loyalty_points_redeemed,
            loyalty_points_earned: bill.loyalty_points_earned,
            total_amount: bill.total_amount,
            payment_mode: bill.payment_mode,
            created_by: bill.created_by,
            created_at: bill.created_at,
        }
    }

    /// Total units sold on this bill.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(12.0);
        assert_eq!(rate.bps(), 1200);
        assert!((rate.percentage() - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_payment_mode_parse() {
        assert_eq!("upi".parse::<PaymentMode>().unwrap(), PaymentMode::Upi);
        assert_eq!(" Cash ".parse::<PaymentMode>().unwrap(), PaymentMode::Cash);
        assert!(matches!(
            "cheque".parse::<PaymentMode>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_payment_mode_wire_name() {
        let json = serde_json::to_string(&PaymentMode::Upi).unwrap();
        assert_eq!(json, "\"upi\"");
    }

    #[test]
    fn test_cart_request_from_dashboard_json() {
        let body = r#"{
            "customerName": "Walk-in Customer",
            "items": [{"productId": 1, "productName": "Silk Saree", "quantity": 2,
                       "unitPrice": 50000, "lineTotal": 100000}],
            "subtotal": 100000,
            "gstAmount": 5000,
            "totalAmount": 105000,
            "paymentMode": "cash"
        }"#;

        let cart = CartRequest::from_json(body).unwrap();
        assert_eq!(cart.customer_id, None);
        assert_eq!(cart.discount, Money::zero());
        assert_eq!(cart.loyalty_points_redeemed, 0);
        assert_eq!(cart.items[0].line_total, Money::from_rupees(1000));
        assert_eq!(cart.unit_count(), 2);
    }

    #[test]
    fn test_cart_request_missing_total_is_malformed() {
        let body = r#"{"customerName": "A", "items": [], "subtotal": 1, "gstAmount": 0,
                       "paymentMode": "cash"}"#;
        let err = CartRequest::from_json(body).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
        assert!(err.to_string().contains("totalAmount"));
    }

    #[test]
    fn test_new_bill_trims_snapshot_fields() {
        let cart = CartRequest {
            customer_id: Some(7),
            customer_name: "  Meera Iyer ".to_string(),
            customer_phone: Some("   ".to_string()),
            items: vec![],
            subtotal: Money::zero(),
            discount: Money::zero(),
            gst_amount: Money::zero(),
            total_amount: Money::zero(),
            payment_mode: PaymentMode::Card,
            loyalty_points_redeemed: 0,
            loyalty_points_earned: 0,
        };

        let bill = NewBill::from_cart(cart, "DB2025-001".to_string(), 1, Utc::now());
        assert_eq!(bill.customer_name, "Meera Iyer");
        assert_eq!(bill.customer_phone, None);
        assert_eq!(bill.customer_id, Some(7));
    }
}

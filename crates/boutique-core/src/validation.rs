//! # Validation Module
//!
//! Input validation for carts, customers and catalog entries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Billing screen (TypeScript)                                  │
//! │  ├── Caps quantity at stock, caps redemption at 20% of subtotal        │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Checkout (Rust)                                              │
//! │  ├── Deserialization (CartRequest::from_json)                          │
//! │  └── THIS MODULE: shape and range rules, before any storage access     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (loyalty_points >= 0)                   │
//! │  └── UNIQUE invoice_number, sku, phone                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CartRequest, NewCustomer, NewProduct};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use boutique_core::validation::validate_sku;
///
/// assert!(validate_sku("KUR-RED-M").is_ok());
/// assert!(validate_sku("").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required display name (product or customer).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a field that only has to be present.
fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Digits, spaces, hyphens and one leading `+` only
/// - Between 7 and 15 digits (E.164 upper bound)
///
/// ## Example
/// ```rust
/// use boutique_core::validation::validate_phone;
///
/// assert!(validate_phone("+91 98765 43210").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, hyphens and a leading +".to_string(),
        });
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 7 and 15 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// Must be positive; stock decides how many can actually be sold.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates that an amount is zero or more.
///
/// ## Example
/// ```rust
/// use boutique_core::money::Money;
/// use boutique_core::validation::validate_amount;
///
/// assert!(validate_amount("discount", Money::zero()).is_ok());
/// assert!(validate_amount("discount", Money::from_paise(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a loyalty point count (redeemed or earned).
pub fn validate_points(field: &str, points: i64) -> ValidationResult<()> {
    if points < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a GST rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "gstRate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates a cart before checkout touches storage.
///
/// ## What Is Checked
/// ```text
/// items ──────────► at least one line, each qty > 0, prices ≥ 0
/// customerName ───► non-blank
/// money fields ───► subtotal, discount, gstAmount, totalAmount ≥ 0
/// points ─────────► redeemed, earned ≥ 0
/// ```
///
/// `customerPhone` is a snapshot of whatever the customer record holds and
/// is stored as given. Totals are NOT cross-checked here; see
/// `pricing::verify_totals`.
pub fn validate_cart_request(cart: &CartRequest) -> ValidationResult<()> {
    if cart.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for item in &cart.items {
        validate_quantity(item.quantity)?;
        validate_amount("unitPrice", item.unit_price)?;
        validate_amount("lineTotal", item.line_total)?;
    }

    validate_required("customerName", &cart.customer_name)?;

    validate_amount("subtotal", cart.subtotal)?;
    validate_amount("discount", cart.discount)?;
    validate_amount("gstAmount", cart.gst_amount)?;
    validate_amount("totalAmount", cart.total_amount)?;

    validate_points("loyaltyPointsRedeemed", cart.loyalty_points_redeemed)?;
    validate_points("loyaltyPointsEarned", cart.loyalty_points_earned)?;

    Ok(())
}

/// Validates a customer enrollment.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_name("name", &customer.name)?;
    validate_phone(&customer.phone)?;
    Ok(())
}

/// Validates a catalog entry.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_sku(&product.sku)?;
    validate_name("name", &product.name)?;
    validate_name("category", &product.category)?;

    if product.stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    validate_amount("costPrice", product.cost_price)?;
    validate_amount("sellingPrice", product.selling_price)?;
    validate_tax_rate_bps(product.gst_rate_bps)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

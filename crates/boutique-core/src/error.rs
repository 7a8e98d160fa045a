//! # Error Types
//!
//! Domain-specific error types for boutique-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  boutique-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule rejections at checkout           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  boutique-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CheckoutError    - Rejected(CoreError) | Persistence(DbError)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, balances)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while checking out a cart.
///
/// Every variant is a client-side problem (HTTP 400 class): the request
/// can be corrected and resubmitted. Nothing has been written when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line item references a product that does not exist.
    #[error("Product not found: {name} (id {product_id})")]
    ProductNotFound { product_id: i64, name: String },

    /// Not enough units on hand for a line item.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: Silk Saree × 2
    ///      │
    ///      ▼
    /// Check stock: available = 1
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Silk Saree", available: 1, requested: 2 }
    ///      │
    ///      ▼
    /// Billing screen: "Insufficient stock for Silk Saree"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Customer tried to redeem more points than they hold.
    #[error("Insufficient loyalty points: available {available}, requested {requested}")]
    InsufficientPoints {
        customer_id: i64,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage access, so they never leave partial effects.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., phone number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The request body could not be decoded at all.
    #[error("Malformed request: {reason}")]
    Malformed { reason: String },

    /// A caller-computed figure does not match the line items.
    #[error("{field} does not add up: expected {expected}, got {actual}")]
    TotalsMismatch {
        field: String,
        expected: Money,
        actual: Money,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 1,
            name: "Silk Saree".to_string(),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Silk Saree: available 1, requested 2"
        );

        let err = CoreError::InsufficientPoints {
            customer_id: 7,
            available: 50,
            requested: 80,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient loyalty points: available 50, requested 80"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customerName".to_string(),
        };
        assert_eq!(err.to_string(), "customerName is required");

        let err = ValidationError::TotalsMismatch {
            field: "subtotal".to_string(),
            expected: Money::from_rupees(1000),
            actual: Money::from_rupees(900),
        };
        assert_eq!(
            err.to_string(),
            "subtotal does not add up: expected ₹1000.00, got ₹900.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

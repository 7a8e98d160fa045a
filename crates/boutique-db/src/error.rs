//! # Database Error Types
//!
//! Error types for database operations and for the checkout as a whole.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (boutique-core)          │
//! │       │                                   │                             │
//! │       ▼                                   │                             │
//! │  DbError ← Adds context and categorization│                             │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  CheckoutError::Persistence     CheckoutError::Rejected                 │
//! │       │          (500)                    │    (400)                    │
//! │       └──────────────┬────────────────────┘                             │
//! │                      ▼                                                  │
//! │  ApiError { code, message } ← Serialized by the HTTP layer             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use boutique_core::{CoreError, ValidationError};

// =============================================================================
// Database Error
// =============================================================================

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate SKU
    /// - Enrolling a second customer with the same phone
    /// - Duplicate invoice number
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// Foreign keys are switched on for every connection; no table in
    /// the current schema declares one.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A write would take stock below zero
    /// - A write would take a loyalty balance below zero
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored row could not be decoded (bad JSON items, missing counter).
    #[error("Corrupt {entity}: {reason}")]
    Corrupt { entity: String, reason: String },

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a Corrupt error.
    pub fn corrupt(entity: impl Into<String>, reason: impl ToString) -> Self {
        DbError::Corrupt {
            entity: entity.into(),
            reason: reason.to_string(),
        }
    }

    /// Wraps a failed BEGIN/COMMIT.
    pub(crate) fn transaction(err: sqlx::Error) -> Self {
        DbError::TransactionFailed(err.to_string())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Checkout Error
// =============================================================================

/// Why a checkout did not produce a bill.
///
/// Either way, nothing was written: the transaction was rolled back.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart broke a business rule; the caller can fix and resubmit.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Storage failed; the caller may retry the same cart.
    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Rejected(CoreError::Validation(err))
    }
}

impl CheckoutError {
    /// Machine-readable category for the HTTP layer.
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::Rejected(CoreError::Validation(_)) => ErrorCode::ValidationError,
            CheckoutError::Rejected(CoreError::ProductNotFound { .. }) => ErrorCode::NotFound,
            CheckoutError::Rejected(CoreError::InsufficientStock { .. }) => {
                ErrorCode::InsufficientStock
            }
            CheckoutError::Rejected(CoreError::InsufficientPoints { .. }) => {
                ErrorCode::InsufficientPoints
            }
            CheckoutError::Persistence(_) => ErrorCode::DatabaseError,
        }
    }

    /// HTTP status the dashboard expects: every rejection is a 400,
    /// storage trouble is a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Rejected(_) => 400,
            CheckoutError::Persistence(_) => 500,
        }
    }

    /// True when the failure was caused by the request, not the store.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CheckoutError::Rejected(_))
    }
}

// =============================================================================
// API Error
// =============================================================================

/// Error body returned to the billing dashboard.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Silk Saree: available 1, requested 2"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced product does not exist (400)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Not enough stock for a line (400)
    InsufficientStock,

    /// Not enough loyalty points (400)
    InsufficientPoints,

    /// Database operation failed (500)
    DatabaseError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

/// Rejections carry their own message; storage details are logged, not
/// shown.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let code = err.code();
        match err {
            CheckoutError::Rejected(core) => ApiError::new(code, core.to_string()),
            CheckoutError::Persistence(db) => {
                error!(error = %db, "Checkout failed in storage");
                ApiError::new(code, "Could not save the bill, please try again")
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_map_to_400() {
        let err = CheckoutError::from(CoreError::InsufficientStock {
            product_id: 1,
            name: "Silk Saree".to_string(),
            available: 1,
            requested: 2,
        });
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), ErrorCode::InsufficientStock);
        assert!(err.is_rejection());

        let err = CheckoutError::from(ValidationError::Required {
            field: "items".to_string(),
        });
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn test_persistence_maps_to_500() {
        let err = CheckoutError::from(DbError::PoolExhausted);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_api_error_body() {
        let api: ApiError = CheckoutError::from(CoreError::InsufficientPoints {
            customer_id: 7,
            available: 50,
            requested: 80,
        })
        .into();

        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "INSUFFICIENT_POINTS");
        assert_eq!(
            json["message"],
            "Insufficient loyalty points: available 50, requested 80"
        );
    }

    #[test]
    fn test_api_error_hides_storage_detail() {
        let api: ApiError =
            CheckoutError::from(DbError::QueryFailed("disk I/O error".to_string())).into();
        assert_eq!(api.code, ErrorCode::DatabaseError);
        assert!(!api.message.contains("disk"));
    }
}

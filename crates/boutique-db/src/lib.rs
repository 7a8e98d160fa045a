//! # boutique-db: Database Layer for Boutique POS
//!
//! SQLite storage for the catalog, customers and bills, and the checkout
//! transaction that ties them together.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Boutique POS Data Flow                           │
//! │                                                                         │
//! │  HTTP handler (POST /bills, external)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   boutique-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Checkout    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (checkout.rs) │───►│ ProductRepo   │    │  (embedded)  │  │   │
//! │  │   │ one tx per    │    │ CustomerRepo  │    │ 001_init.sql │  │   │
//! │  │   │ bill          │    │ BillRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                    │                               │   │
//! │  │           └──────► Database (pool.rs, SqlitePool) ◄────────────┤   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (BOUTIQUE_DB_PATH, WAL mode)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Store settings from the environment
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database, checkout and API error types
//! - [`repository`] - Product, customer and bill repositories
//! - [`checkout`] - The checkout transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use boutique_db::{Database, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let db = Database::open(&config).await?;
//!
//! let cart = CartRequest::from_json(&body)?;
//! let bill = db.checkout_with(&config).process(cart, staff_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{Checkout, CheckoutOptions};
pub use config::{ConfigError, StoreConfig};
pub use error::{ApiError, CheckoutError, DbError, DbResult, ErrorCode};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::bill::{BillFilter, BillRepository};
pub use repository::customer::{CustomerRepository, PurchaseSummary};
pub use repository::product::ProductRepository;

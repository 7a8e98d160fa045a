//! # boutique-core: Pure Business Logic for Boutique POS
//!
//! Everything the till needs to know about a sale that does not touch
//! storage: money, domain types, validation, invoice numbers, the loyalty
//! program, bill arithmetic and sales summaries.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Boutique POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Billing dashboard + HTTP layer (external)          │   │
//! │  │    Product search ──► Cart ──► Quote ──► POST bill ──► Invoice  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartRequest (JSON)                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ boutique-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  loyalty  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  earn /   │  │   rules   │  │   │
//! │  │   │   Bill    │  │  TaxRate  │  │  redeem   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │  pricing  │  │  invoice  │  │  report   │                  │   │
//! │  │   │   Quote   │  │ DB2025-004│  │  summary  │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 boutique-db (Database Layer)                    │   │
//! │  │        SQLite ledgers, migrations, the checkout transaction     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Bill, CartRequest)
//! - [`money`] - Money type with integer arithmetic in paise
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`invoice`] - Invoice number formatting
//! - [`loyalty`] - Points program rules
//! - [`pricing`] - Bill arithmetic and total verification
//! - [`report`] - Sales summaries
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use boutique_core::money::Money;
//! use boutique_core::pricing::Quote;
//! use boutique_core::types::{LineItem, TaxRate};
//!
//! let saree = LineItem {
//!     product_id: 1,
//!     product_name: "Silk Saree".to_string(),
//!     quantity: 2,
//!     unit_price: Money::from_rupees(500),
//!     line_total: Money::zero(),
//! };
//!
//! let quote = Quote::build(vec![saree], TaxRate::from_bps(500), Money::zero(), 0, 0);
//!
//! assert_eq!(quote.subtotal, Money::from_rupees(1000));
//! assert_eq!(quote.gst_amount, Money::from_rupees(50));
//! assert_eq!(quote.total_amount, Money::from_rupees(1050));
//! assert_eq!(quote.points_earned, 10);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod loyalty;
pub mod money;
pub mod pricing;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use boutique_core::Money` instead of
// `use boutique_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Low-stock level given to new products unless the catalog says otherwise.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Name the billing screen records when no customer is attached.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

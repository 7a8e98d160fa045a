//! # Repository Module
//!
//! Database repository implementations for Boutique POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.products().get_by_id(1)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository / CustomerRepository / BillRepository               │
//! │  ├── &self methods        run on the pool (one statement each)         │
//! │  └── *_in(conn, ...)      run on a caller's connection, so the         │
//! │                           checkout can compose them in one transaction │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog and stock
//! - [`CustomerRepository`](customer::CustomerRepository) - Loyalty members
//! - [`BillRepository`](bill::BillRepository) - Bill ledger and invoice counter

pub mod bill;
pub mod customer;
pub mod product;

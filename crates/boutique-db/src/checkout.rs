//! # Checkout
//!
//! Turns a [`CartRequest`] into a persisted [`Bill`]: stock comes off the
//! shelf, loyalty points move, an invoice number is allocated and the bill
//! is written. All of it happens in ONE SQLite transaction.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout::process                                │
//! │                                                                         │
//! │  CartRequest                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate (pure, no storage)  ──✗──► Rejected(Validation)              │
//! │       │                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐  │
//! │  │    ▼                                                              │  │
//! │  │  1. invoice_sequence += 1    ← first statement is a write, so     │  │
//! │  │       │                        this checkout now owns the lock    │  │
//! │  │       ▼                                                           │  │
//! │  │  2. for each line, in order:                                      │  │
//! │  │       UPDATE stock = stock - q WHERE stock >= q                   │  │
//! │  │       ──✗──► ProductNotFound / InsufficientStock                  │  │
//! │  │       │                                                           │  │
//! │  │       ▼                                                           │  │
//! │  │  3. customer attached and known?                                  │  │
//! │  │       redeemed > balance ──✗──► InsufficientPoints                │  │
//! │  │       balance += earned - redeemed                                │  │
//! │  │       │                                                           │  │
//! │  │       ▼                                                           │  │
//! │  │  4. INSERT bill                                                   │  │
//! │  │                                                                   │  │
//! │  COMMIT  (any ✗ above → ROLLBACK: no stock, points, counter or bill) │  │
//! │  ────────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Two tills checking out at once each hold a pooled connection. SQLite
//! admits one writer; the second waits on `busy_timeout` until the first
//! commits or rolls back. Invoice numbers are therefore gapless and never
//! repeat, and stock can't be oversold.
//!
//! ## What Is NOT Checked
//! Loyalty earn rate and redemption cap are the billing screen's job
//! (see `boutique_core::pricing`). Checkout only stops a balance going
//! negative. Totals are trusted unless [`CheckoutOptions::verify_totals`]
//! is on.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use boutique_core::invoice;
use boutique_core::loyalty::LoyaltyAdjustment;
use boutique_core::pricing;
use boutique_core::validation;
use boutique_core::{Bill, CartRequest, CoreError, LineItem, NewBill};

use crate::config::StoreConfig;
use crate::error::{CheckoutError, DbError};
use crate::repository::bill::BillRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;

/// Store-specific checkout behaviour.
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    /// Invoice tag; `None` means `DB{year}` at the time of sale.
    pub invoice_prefix: Option<String>,

    /// Reject carts whose line totals, subtotal or total don't add up.
    pub verify_totals: bool,
}

impl CheckoutOptions {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        CheckoutOptions {
            invoice_prefix: Some(prefix.into()),
            ..Default::default()
        }
    }

    pub fn verify_totals(mut self, verify: bool) -> Self {
        self.verify_totals = verify;
        self
    }

    fn prefix_at(&self, now: DateTime<Utc>) -> String {
        match &self.invoice_prefix {
            Some(prefix) => prefix.clone(),
            None => invoice::default_prefix(now),
        }
    }
}

impl From<&StoreConfig> for CheckoutOptions {
    fn from(config: &StoreConfig) -> Self {
        CheckoutOptions {
            invoice_prefix: config.invoice_prefix.clone(),
            verify_totals: config.verify_totals,
        }
    }
}

/// The checkout transactor.
///
/// ## Usage
/// ```rust,ignore
/// let cart = CartRequest::from_json(&body)?;
/// match db.checkout().process(cart, staff_id).await {
///     Ok(bill) => respond(201, &bill),
///     Err(err) => respond(err.status_code(), &ApiError::from(err)),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Checkout {
    pool: SqlitePool,
    options: CheckoutOptions,
}

impl Checkout {
    pub fn new(pool: SqlitePool, options: CheckoutOptions) -> Self {
        Checkout { pool, options }
    }

    /// Checks out a cart on behalf of staff member `created_by`.
    ///
    /// ## Returns
    /// * `Ok(Bill)` - committed bill with its id and invoice number
    /// * `Err(CheckoutError::Rejected)` - validation or business rule; nothing written
    /// * `Err(CheckoutError::Persistence)` - storage failure; nothing written
    ///
    /// Not idempotent: submitting the same cart twice sells it twice.
    pub async fn process(&self, cart: CartRequest, created_by: i64) -> Result<Bill, CheckoutError> {
        validation::validate_cart_request(&cart)?;
        if self.options.verify_totals {
            pricing::verify_totals(&cart)?;
        }

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        match self.apply(&mut tx, cart, created_by).await {
            Ok(bill) => {
                tx.commit().await.map_err(DbError::transaction)?;
                info!(
                    invoice_number = %bill.invoice_number,
                    bill_id = bill.id,
                    lines = bill.items.len(),
                    total = %bill.total_amount,
                    payment_mode = %bill.payment_mode,
                    "Checkout complete"
                );
                Ok(bill)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                if err.is_rejection() {
                    info!(error = %err, "Checkout rejected");
                } else {
                    warn!(error = %err, "Checkout failed");
                }
                Err(err)
            }
        }
    }

    /// The transactional part. Every statement runs on `conn`.
    async fn apply(
        &self,
        conn: &mut SqliteConnection,
        cart: CartRequest,
        created_by: i64,
    ) -> Result<Bill, CheckoutError> {
        let now = Utc::now();

        let sequence = BillRepository::next_sequence_in(conn).await?;
        let invoice_number = invoice::format_invoice_number(&self.options.prefix_at(now), sequence);
        debug!(invoice_number = %invoice_number, "Allocated invoice number");

        for item in &cart.items {
            reserve_stock(conn, item).await?;
        }

        if let Some(customer_id) = cart.customer_id {
            let adjustment =
                LoyaltyAdjustment::new(cart.loyalty_points_redeemed, cart.loyalty_points_earned);
            reconcile_loyalty(conn, customer_id, adjustment).await?;
        }

        let bill = NewBill::from_cart(cart, invoice_number, created_by, now);
        Ok(BillRepository::insert_in(conn, bill).await?)
    }
}

/// Takes one line's units off the shelf, or says why it can't.
async fn reserve_stock(conn: &mut SqliteConnection, item: &LineItem) -> Result<(), CheckoutError> {
    if let Some(product) = ProductRepository::decrement_in(conn, item.product_id, item.quantity).await? {
        debug!(
            product_id = product.id,
            remaining = product.stock,
            "Stock reserved"
        );
        return Ok(());
    }

    let err = match ProductRepository::get_in(conn, item.product_id).await? {
        None => CoreError::ProductNotFound {
            product_id: item.product_id,
            name: item.product_name.clone(),
        },
        Some(product) => CoreError::InsufficientStock {
            product_id: product.id,
            name: product.name,
            available: product.stock,
            requested: item.quantity,
        },
    };
    Err(err.into())
}

/// Applies redeemed and earned points to a known customer.
///
/// An id that doesn't resolve is skipped: the sale goes through and no
/// points move.
async fn reconcile_loyalty(
    conn: &mut SqliteConnection,
    customer_id: i64,
    adjustment: LoyaltyAdjustment,
) -> Result<(), CheckoutError> {
    if adjustment.is_noop() {
        return Ok(());
    }

    let Some(customer) = CustomerRepository::get_in(conn, customer_id).await? else {
        debug!(customer_id, "Unknown customer, loyalty skipped");
        return Ok(());
    };

    // The write lock is already held, so the balance can't change under us
    let expected = adjustment.apply(customer.id, customer.loyalty_points)?;
    let updated = CustomerRepository::adjust_loyalty_in(conn, customer.id, adjustment.delta()).await?;
    debug_assert_eq!(updated.loyalty_points, expected);

    debug!(
        customer_id,
        redeemed = adjustment.redeemed,
        earned = adjustment.earned,
        balance = updated.loyalty_points,
        "Loyalty points reconciled"
    );
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

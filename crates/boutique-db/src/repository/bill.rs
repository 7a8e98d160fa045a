//! # Bill Repository
//!
//! The bill ledger: append-only storage for completed sales, plus the
//! invoice sequence counter.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bills                                                                  │
//! │  ───────────────────────────────────────────────────────────────────   │
//! │  invoice_number  UNIQUE      DB2025-004                                 │
//! │  items           TEXT        [{"productId":1,"productName":"Silk ...}] │
//! │  money columns   INTEGER     paise                                      │
//! │  UPDATE / DELETE             rejected by triggers                       │
//! │                                                                         │
//! │  invoice_sequence (single row, id = 1)                                  │
//! │  ───────────────────────────────────────────────────────────────────   │
//! │  last_value      INTEGER     bumped first thing in every checkout       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is deliberately no update or delete method here.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use boutique_core::invoice;
use boutique_core::{Bill, LineItem, Money, NewBill, PaymentMode};

const BILL_COLUMNS: &str = "id, invoice_number, customer_id, customer_name, customer_phone, \
     items, subtotal, discount, gst_amount, loyalty_points_redeemed, loyalty_points_earned, \
     total_amount, payment_mode, created_by, created_at";

// =============================================================================
// Row Mapping
// =============================================================================

/// A `bills` row before the JSON items column is decoded.
#[derive(Debug, FromRow)]
struct BillRow {
    id: i64,
    invoice_number: String,
    customer_id: Option<i64>,
    customer_name: String,
    customer_phone: Option<String>,
    items: String,
    subtotal: Money,
    discount: Money,
    gst_amount: Money,
    loyalty_points_redeemed: i64,
    loyalty_points_earned: i64,
    total_amount: Money,
    payment_mode: PaymentMode,
    created_by: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<BillRow> for Bill {
    type Error = DbError;

    fn try_from(row: BillRow) -> DbResult<Self> {
        let items: Vec<LineItem> = serde_json::from_str(&row.items)
            .map_err(|e| DbError::corrupt(format!("bill {}", row.invoice_number), e))?;

        Ok(Bill {
            id: row.id,
            invoice_number: row.invoice_number,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            items,
            subtotal: row.subtotal,
            discount: row.discount,
            gst_amount: row.gst_amount,
            loyalty_points_redeemed: row.loyalty_points_redeemed,
            loyalty_points_earned: row.loyalty_points_earned,
            total_amount: row.total_amount,
            payment_mode: row.payment_mode,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Criteria for [`BillRepository::list`]. Empty filter = every bill.
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    /// Inclusive lower bound on `created_at`.
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub end: Option<DateTime<Utc>>,
    pub payment_mode: Option<PaymentMode>,
    pub customer_id: Option<i64>,
    pub limit: Option<u32>,
}

impl BillFilter {
    /// Bills created at or after `start`.
    pub fn since(start: DateTime<Utc>) -> Self {
        BillFilter {
            start: Some(start),
            ..Default::default()
        }
    }

    pub fn payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = Some(mode);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Invoice number of the most recently inserted bill.
    pub async fn last_invoice_number(&self) -> DbResult<Option<String>> {
        let number: Option<String> =
            sqlx::query_scalar("SELECT invoice_number FROM bills ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(number)
    }

    /// Writes a bill outside of a checkout (imports, fixtures).
    ///
    /// Does not touch stock, points or the invoice counter.
    pub async fn insert(&self, bill: NewBill) -> DbResult<Bill> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_in(&mut conn, bill).await
    }

    /// Gets a bill by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1");
        sqlx::query_as::<_, BillRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Bill::try_from)
            .transpose()
    }

    /// Gets a bill by invoice number.
    pub async fn get_by_invoice_number(&self, invoice_number: &str) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE invoice_number = ?1");
        sqlx::query_as::<_, BillRow>(&sql)
            .bind(invoice_number.trim())
            .fetch_optional(&self.pool)
            .await?
            .map(Bill::try_from)
            .transpose()
    }

    /// Lists bills matching `filter`, newest first.
    pub async fn list(&self, filter: &BillFilter) -> DbResult<Vec<Bill>> {
        // NULL parameters switch their condition off
        let sql = format!(
            r#"
            SELECT {BILL_COLUMNS} FROM bills
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at < ?2)
              AND (?3 IS NULL OR payment_mode = ?3)
              AND (?4 IS NULL OR customer_id = ?4)
            ORDER BY id DESC
            LIMIT ?5
            "#
        );

        let rows = sqlx::query_as::<_, BillRow>(&sql)
            .bind(filter.start)
            .bind(filter.end)
            .bind(filter.payment_mode)
            .bind(filter.customer_id)
            .bind(filter.limit.map(i64::from).unwrap_or(-1))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed bills");
        rows.into_iter().map(Bill::try_from).collect()
    }

    /// Current value of the invoice counter.
    pub async fn current_sequence(&self) -> DbResult<i64> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT last_value FROM invoice_sequence WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        value.ok_or_else(|| DbError::corrupt("invoice_sequence", "counter row missing"))
    }

    /// Moves the counter up to the highest sequence already on a bill.
    ///
    /// Run at startup so a ledger whose bills were written some other way
    /// (an import, a restored backup) keeps numbering after its last
    /// invoice. Never moves the counter down. Returns the counter value.
    pub async fn reconcile_invoice_sequence(&self) -> DbResult<i64> {
        let numbers: Vec<String> = sqlx::query_scalar("SELECT invoice_number FROM bills")
            .fetch_all(&self.pool)
            .await?;

        let highest = numbers
            .iter()
            .filter_map(|n| invoice::parse_sequence(n))
            .max()
            .unwrap_or(0);

        sqlx::query(
            "INSERT INTO invoice_sequence (id, last_value) VALUES (1, ?1) \
             ON CONFLICT (id) DO UPDATE SET last_value = MAX(last_value, excluded.last_value)",
        )
        .bind(highest)
        .execute(&self.pool)
        .await?;

        let value = self.current_sequence().await?;
        info!(bills = numbers.len(), sequence = value, "Invoice sequence reconciled");
        Ok(value)
    }

    // =========================================================================
    // Connection-level operations (usable inside a transaction)
    // =========================================================================

    /// Bumps the invoice counter and returns the new value.
    ///
    /// Inside a transaction this is the statement that takes SQLite's write
    /// lock; if the transaction rolls back, so does the bump.
    pub async fn next_sequence_in(conn: &mut SqliteConnection) -> DbResult<i64> {
        let value: Option<i64> = sqlx::query_scalar(
            "UPDATE invoice_sequence SET last_value = last_value + 1 WHERE id = 1 \
             RETURNING last_value",
        )
        .fetch_optional(conn)
        .await?;

        value.ok_or_else(|| DbError::corrupt("invoice_sequence", "counter row missing"))
    }

    /// Inserts a bill on the given connection.
    pub async fn insert_in(conn: &mut SqliteConnection, bill: NewBill) -> DbResult<Bill> {
        debug!(invoice_number = %bill.invoice_number, "Inserting bill");

        let items = serde_json::to_string(&bill.items)
            .map_err(|e| DbError::Internal(format!("encoding bill items: {e}")))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bills (
                invoice_number, customer_id, customer_name, customer_phone, items,
                subtotal, discount, gst_amount,
                loyalty_points_redeemed, loyalty_points_earned,
                total_amount, payment_mode, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            RETURNING id
            "#,
        )
        .bind(&bill.invoice_number)
        .bind(bill.customer_id)
        .bind(&bill.customer_name)
        .bind(&bill.customer_phone)
        .bind(items)
        .bind(bill.subtotal)
        .bind(bill.discount)
        .bind(bill.gst_amount)
        .bind(bill.loyalty_points_redeemed)
        .bind(bill.loyalty_points_earned)
        .bind(bill.total_amount)
        .bind(bill.payment_mode)
        .bind(bill.created_by)
        .bind(bill.created_at)
        .fetch_one(conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, bill.invoice_number.clone())
            }
            other => other,
        })?;

        Ok(Bill::from_new(id, bill))
    }
}

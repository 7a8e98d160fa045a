//! # Customer Repository
//!
//! Loyalty members. The phone number is the natural key: the billing
//! screen looks customers up by phone, and enrolling the same number twice
//! fails with [`DbError::UniqueViolation`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use boutique_core::{Customer, Money, NewCustomer};

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, loyalty_points, created_at";

/// What a customer has bought so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    pub customer_id: i64,
    pub bills: i64,
    pub total_spent: Money,
    pub last_purchase: Option<DateTime<Utc>>,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Enrolls a customer with a zero points balance.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - phone already enrolled
    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<Customer> {
        debug!(phone = %customer.phone, "Inserting customer");

        let sql = format!(
            "INSERT INTO customers (name, phone, email, address, loyalty_points, created_at) \
             VALUES (?1, ?2, ?3, ?4, 0, ?5) RETURNING {CUSTOMER_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Customer>(&sql)
            .bind(customer.name.trim())
            .bind(customer.phone.trim())
            .bind(&customer.email)
            .bind(&customer.address)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => {
                    DbError::duplicate(field, customer.phone.trim())
                }
                other => other,
            })?;

        Ok(inserted)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    /// Gets a customer by phone number.
    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(phone.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Adds `delta` points to the balance (negative to deduct).
    ///
    /// ## Returns
    /// * `Ok(Customer)` - Customer with the new balance
    /// * `Err(DbError::NotFound)` - No such customer
    /// * `Err(DbError::CheckViolation)` - Balance would go below zero or
    ///   past `i64::MAX`
    pub async fn adjust_loyalty(&self, id: i64, delta: i64) -> DbResult<Customer> {
        let mut conn = self.pool.acquire().await?;
        Self::adjust_loyalty_in(&mut conn, id, delta).await
    }

    /// Number of bills, total spent and last purchase time.
    pub async fn purchase_summary(&self, id: i64) -> DbResult<PurchaseSummary> {
        let (bills, total, last): (i64, i64, Option<String>) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_amount), 0), MAX(created_at) \
             FROM bills WHERE customer_id = ?1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let last_purchase = last
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| DbError::corrupt("bill timestamp", e))
            })
            .transpose()?;

        Ok(PurchaseSummary {
            customer_id: id,
            bills,
            total_spent: Money::from_paise(total),
            last_purchase,
        })
    }

    // =========================================================================
    // Connection-level operations (usable inside a transaction)
    // =========================================================================

    /// Reads a customer on the given connection.
    pub async fn get_in(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(customer)
    }

    /// Applies a balance delta on the given connection.
    ///
    /// SQLite turns an overflowing integer sum into a REAL, so a credit
    /// that would pass `i64::MAX` is refused before the write.
    pub async fn adjust_loyalty_in(
        conn: &mut SqliteConnection,
        id: i64,
        delta: i64,
    ) -> DbResult<Customer> {
        debug!(customer_id = id, delta, "Adjusting loyalty points");

        let ceiling = if delta > 0 { i64::MAX - delta } else { i64::MAX };
        let sql = format!(
            "UPDATE customers SET loyalty_points = loyalty_points + ?2 \
             WHERE id = ?1 AND loyalty_points <= ?3 RETURNING {CUSTOMER_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(delta)
            .bind(ceiling)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(customer) = updated {
            return Ok(customer);
        }

        match Self::get_in(conn, id).await? {
            None => Err(DbError::not_found("Customer", id)),
            Some(customer) => Err(DbError::CheckViolation {
                message: format!(
                    "loyalty balance {} cannot take {} more points",
                    customer.loyalty_points, delta
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support::{meera, walk_in_cart};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = setup().await;
        let repo = db.customers();

        let customer = repo.insert(&meera()).await.unwrap();
        assert_eq!(customer.loyalty_points, 0);

        let by_phone = repo.get_by_phone("9876543210").await.unwrap().unwrap();
        assert_eq!(by_phone.id, customer.id);
        assert_eq!(
            repo.get_by_id(customer.id).await.unwrap().map(|c| c.name),
            Some("Meera Iyer".to_string())
        );
        assert!(repo.get_by_phone("0000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let db = setup().await;
        let repo = db.customers();

        repo.insert(&meera()).await.unwrap();
        let err = repo.insert(&meera()).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "customers.phone");
                assert_eq!(value, "9876543210");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_adjust_loyalty() {
        let db = setup().await;
        let repo = db.customers();
        let customer = repo.insert(&meera()).await.unwrap();

        let after = repo.adjust_loyalty(customer.id, 50).await.unwrap();
        assert_eq!(after.loyalty_points, 50);

        let after = repo.adjust_loyalty(customer.id, -20).await.unwrap();
        assert_eq!(after.loyalty_points, 30);
    }

    #[tokio::test]
    async fn test_adjust_loyalty_floor_and_missing() {
        let db = setup().await;
        let repo = db.customers();
        let customer = repo.insert(&meera()).await.unwrap();

        let err = repo.adjust_loyalty(customer.id, -1).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
        assert_eq!(
            repo.get_by_id(customer.id).await.unwrap().unwrap().loyalty_points,
            0
        );

        let err = repo.adjust_loyalty(404, 10).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_loyalty_refuses_overflowing_credit() {
        let db = setup().await;
        let repo = db.customers();
        let customer = repo.insert(&meera()).await.unwrap();
        repo.adjust_loyalty(customer.id, 50).await.unwrap();

        let err = repo.adjust_loyalty(customer.id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
        assert_eq!(
            repo.get_by_id(customer.id).await.unwrap().unwrap().loyalty_points,
            50
        );

        // Exactly reaching the top is still allowed
        let topped = repo.adjust_loyalty(customer.id, i64::MAX - 50).await.unwrap();
        assert_eq!(topped.loyalty_points, i64::MAX);
    }

    #[tokio::test]
    async fn test_purchase_summary() {
        let db = setup().await;
        let customer = db.customers().insert(&meera()).await.unwrap();

        let empty = db.customers().purchase_summary(customer.id).await.unwrap();
        assert_eq!(empty.bills, 0);
        assert_eq!(empty.total_spent, Money::zero());
        assert_eq!(empty.last_purchase, None);

        let product = db
            .products()
            .insert(&crate::test_support::saree("SAR-001", 5))
            .await
            .unwrap();
        let mut cart = walk_in_cart(product.id, 1, 500);
        cart.customer_id = Some(customer.id);
        cart.customer_name = customer.name.clone();
        let bill = db.checkout().process(cart, 1).await.unwrap();

        let summary = db.customers().purchase_summary(customer.id).await.unwrap();
        assert_eq!(summary.bills, 1);
        assert_eq!(summary.total_spent, bill.total_amount);
        assert!(summary.last_purchase.is_some());
    }
}

//! # Product Repository
//!
//! Database operations for the catalog and stock on hand.
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, compare in Rust, write back                           │
//! │     SELECT stock ... ; if stock >= q { UPDATE ... SET stock = 3 }      │
//! │     (two tills can both read 5 and both sell the last units)           │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional statement                                 │
//! │     UPDATE products SET stock = stock - q                              │
//! │     WHERE id = ? AND stock >= q                                        │
//! │     RETURNING ...                                                      │
//! │                                                                         │
//! │  No row back → product missing OR short; look it up to tell which.     │
//! │  CHECK (stock >= 0) in the schema backs this up.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `*_in` functions take a bare connection so the checkout can run them
//! inside its transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use boutique_core::{NewProduct, Product};

/// Column list matching [`Product`]'s `FromRow` layout.
const PRODUCT_COLUMNS: &str = "id, sku, name, description, category, size, color, stock, \
     low_stock_threshold, cost_price, selling_price, gst_rate_bps, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let saree = repo.get_by_id(1).await?;
/// let low = repo.list_low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Adds a product to the catalog.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its id and timestamps
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO products (
                sku, name, description, category, size, color,
                stock, low_stock_threshold, cost_price, selling_price, gst_rate_bps,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let inserted = sqlx::query_as::<_, Product>(&sql)
            .bind(product.sku.trim())
            .bind(product.name.trim())
            .bind(&product.description)
            .bind(product.category.trim())
            .bind(&product.size)
            .bind(&product.color)
            .bind(product.stock)
            .bind(product.low_stock_threshold)
            .bind(product.cost_price)
            .bind(product.selling_price)
            .bind(product.gst_rate_bps)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(inserted)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_in(&mut conn, id).await
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Removes `amount` units from stock.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product with its new stock level
    /// * `Err(DbError::NotFound)` - No such product
    /// * `Err(DbError::CheckViolation)` - `amount` is not positive, or fewer
    ///   than `amount` units on hand; stock is unchanged
    pub async fn decrement_stock(&self, id: i64, amount: i64) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;

        if let Some(product) = Self::decrement_in(&mut conn, id, amount).await? {
            return Ok(product);
        }

        match Self::get_in(&mut conn, id).await? {
            None => Err(DbError::not_found("Product", id)),
            Some(product) => Err(DbError::CheckViolation {
                message: format!(
                    "stock for {} is {}, cannot remove {}",
                    product.name, product.stock, amount
                ),
            }),
        }
    }

    /// Products at or below their low-stock threshold, emptiest first.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE stock <= low_stock_threshold ORDER BY stock ASC, name ASC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Low stock products");
        Ok(products)
    }

    /// Counts catalog entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Connection-level operations (usable inside a transaction)
    // =========================================================================

    /// Reads a product on the given connection.
    pub async fn get_in(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }

    /// Conditional decrement on the given connection.
    ///
    /// Returns `None` when the product is missing or has fewer than `amount`
    /// units; nothing is written in that case. A non-positive `amount` is a
    /// `CheckViolation`: it would put stock back rather than take it off.
    pub async fn decrement_in(
        conn: &mut SqliteConnection,
        id: i64,
        amount: i64,
    ) -> DbResult<Option<Product>> {
        if amount <= 0 {
            return Err(DbError::CheckViolation {
                message: format!("stock decrement must be positive, got {amount}"),
            });
        }

        debug!(product_id = id, amount, "Decrementing stock");

        let sql = format!(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(amount)
            .bind(Utc::now())
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support::saree;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup().await;
        let repo = db.products();

        let inserted = repo.insert(&saree("SAR-001", 5)).await.unwrap();
        assert!(inserted.id > 0);

        let fetched = repo.get_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(
            repo.get_by_sku("SAR-001").await.unwrap().map(|p| p.id),
            Some(inserted.id)
        );
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = setup().await;
        let repo = db.products();

        repo.insert(&saree("SAR-001", 5)).await.unwrap();
        let err = repo.insert(&saree("SAR-001", 3)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_decrement_stock() {
        let db = setup().await;
        let repo = db.products();
        let product = repo.insert(&saree("SAR-001", 5)).await.unwrap();

        let after = repo.decrement_stock(product.id, 2).await.unwrap();
        assert_eq!(after.stock, 3);

        // Whole remaining stock can go
        let after = repo.decrement_stock(product.id, 3).await.unwrap();
        assert_eq!(after.stock, 0);
    }

    #[tokio::test]
    async fn test_decrement_never_goes_negative() {
        let db = setup().await;
        let repo = db.products();
        let product = repo.insert(&saree("SAR-001", 1)).await.unwrap();

        let err = repo.decrement_stock(product.id, 2).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
        assert_eq!(repo.get_by_id(product.id).await.unwrap().unwrap().stock, 1);

        let err = repo.decrement_stock(404, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_decrement_rejects_non_positive_amount() {
        let db = setup().await;
        let repo = db.products();
        let product = repo.insert(&saree("SAR-001", 5)).await.unwrap();

        for amount in [0, -3] {
            let err = repo.decrement_stock(product.id, amount).await.unwrap_err();
            assert!(matches!(err, DbError::CheckViolation { .. }));
        }
        assert_eq!(repo.get_by_id(product.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_list_low_stock() {
        let db = setup().await;
        let repo = db.products();
        repo.insert(&saree("SAR-001", 50)).await.unwrap();
        repo.insert(&saree("SAR-002", 10)).await.unwrap();
        repo.insert(&saree("SAR-003", 2)).await.unwrap();

        let low = repo.list_low_stock().await.unwrap();
        let skus: Vec<&str> = low.iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, vec!["SAR-003", "SAR-002"]);
        assert!(low.iter().all(|p| p.is_low_stock()));
        assert_eq!(repo.count().await.unwrap(), 3);
    }
}

//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (loses concurrent changes)                  │
//! │     UPDATE products SET stock = 7 WHERE id = ?                         │
//! │                                                                         │
//! │  ✅ CORRECT: Guarded delta update                                      │
//! │     UPDATE products SET stock = stock + ?delta                         │
//! │     WHERE id = ? AND stock + ?delta >= 0                               │
//! │                                                                         │
//! │  No row updated → product missing (NotFound) or the shelf no longer    │
//! │  covers the delta (Conflict). Inside a unit of work this is the        │
//! │  re-validation of stock right before it is taken.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::Product;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let results = repo.search("kopi", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
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

    /// Searches products by name (case-insensitive substring).
    ///
    /// An empty query lists the catalog by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list(limit).await;
        }

        let pattern = format!("%{}%", query);

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, barcode, unit_price, package_price, package_qty,
                purchase_price, stock, created_at, updated_at
            FROM products
            WHERE name LIKE ?1 OR barcode = ?2
            ORDER BY name COLLATE NOCASE
            LIMIT ?3
            "#,
        )
        .bind(pattern)
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, barcode, unit_price, package_price, package_qty,
                purchase_price, stock, created_at, updated_at
            FROM products
            ORDER BY name COLLATE NOCASE
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        select_by_id(&self.pool, id).await
    }

    /// Gets a product by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, barcode, unit_price, package_price, package_qty,
                purchase_price, stock, created_at, updated_at
            FROM products
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - barcode already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, unit_price, package_price, package_qty,
                purchase_price, stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.unit_price)
        .bind(product.package_price)
        .bind(product.package_qty)
        .bind(product.purchase_price)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates catalog fields of a product.
    ///
    /// Stock is NOT written here; it only moves through
    /// [`adjust_stock`](Self::adjust_stock) and committed sales.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                barcode = ?3,
                unit_price = ?4,
                package_price = ?5,
                package_qty = ?6,
                purchase_price = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.unit_price)
        .bind(product.package_price)
        .bind(product.package_qty)
        .bind(product.purchase_price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Manually adjusts stock (restock, shrinkage) and returns the new level.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        apply_stock_delta(&mut conn, id, delta).await
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Executor-generic statements (shared with UnitOfWork)
// =============================================================================

pub(crate) async fn select_by_id<'e, E>(exec: E, id: &str) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT
            id, name, barcode, unit_price, package_price, package_qty,
            purchase_price, stock, created_at, updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(exec)
    .await?;

    Ok(product)
}

/// Guarded stock delta. Returns the new stock level.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    id: &str,
    delta: i64,
) -> DbResult<i64> {
    let stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1 AND stock + ?2 >= 0
        RETURNING stock
        "#,
    )
    .bind(id)
    .bind(delta)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(stock) = stock {
        debug!(product_id = %id, delta, stock, "Stock updated");
        return Ok(stock);
    }

    let current: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match current {
        None => Err(DbError::not_found("Product", id)),
        Some(current) => Err(DbError::conflict(
            "Product",
            id,
            format!("stock {} cannot absorb delta {}", current, delta),
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

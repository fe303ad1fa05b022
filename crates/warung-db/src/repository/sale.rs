//! # Sale Repository
//!
//! Database operations for sale headers and line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (inside a UnitOfWork)                                       │
//! │     └── next_receipt_number() → "20240115-0003"                        │
//! │     └── insert_sale() + insert_item() × n                              │
//! │                                                                         │
//! │  2. EDIT (inside a UnitOfWork)                                         │
//! │     └── update_sale()   ← id, receipt number, created_at preserved     │
//! │     └── delete_items() + insert_item() × n   ← full replace            │
//! │                                                                         │
//! │  3. CANCEL (inside a UnitOfWork)                                       │
//! │     └── delete_sale()   ← items and receivable cascade                 │
//! │                                                                         │
//! │  Reads (this repository): get_by_id, get_items, list_*                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::{Sale, SaleLineItem};

/// Repository for sale reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        select_by_id(&self.pool, id).await
    }

    /// Gets all line items of a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        select_items(&self.pool, sale_id).await
    }

    /// Lists the most recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, receipt_number, customer_id, payment_method_id, transaction_date,
                subtotal, total, paid, change_amount AS "change",
                points_earned, points_redeemed, created_at, updated_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists the sales of one day in receipt order.
    pub async fn list_by_date(&self, date: NaiveDate) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, receipt_number, customer_id, payment_method_id, transaction_date,
                subtotal, total, paid, change_amount AS "change",
                points_earned, points_redeemed, created_at, updated_at
            FROM sales
            WHERE transaction_date = ?1
            ORDER BY receipt_number
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Executor-generic statements (shared with UnitOfWork)
// =============================================================================

pub(crate) async fn select_by_id<'e, E>(exec: E, id: &str) -> DbResult<Option<Sale>>
where
    E: SqliteExecutor<'e>,
{
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT
            id, receipt_number, customer_id, payment_method_id, transaction_date,
            subtotal, total, paid, change_amount AS "change",
            points_earned, points_redeemed, created_at, updated_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(exec)
    .await?;

    Ok(sale)
}

pub(crate) async fn select_items<'e, E>(exec: E, sale_id: &str) -> DbResult<Vec<SaleLineItem>>
where
    E: SqliteExecutor<'e>,
{
    let items = sqlx::query_as::<_, SaleLineItem>(
        r#"
        SELECT id, sale_id, product_id, name_snapshot, quantity, unit_price, subtotal, created_at
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(sale_id)
    .fetch_all(exec)
    .await?;

    Ok(items)
}

/// Next receipt number for a day: `YYYYMMDD-NNNN`.
pub(crate) async fn next_receipt_number<'e, E>(exec: E, date: NaiveDate) -> DbResult<String>
where
    E: SqliteExecutor<'e>,
{
    let prefix = date.format("%Y%m%d").to_string();

    let last: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT MAX(CAST(substr(receipt_number, 10) AS INTEGER))
        FROM sales
        WHERE receipt_number LIKE ?1 || '-%'
        "#,
    )
    .bind(&prefix)
    .fetch_one(exec)
    .await?;

    Ok(format_receipt_number(&prefix, last.unwrap_or(0) + 1))
}

fn format_receipt_number(prefix: &str, seq: i64) -> String {
    format!("{}-{:04}", prefix, seq)
}

pub(crate) async fn insert_sale<'e, E>(exec: E, sale: &Sale) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(sale_id = %sale.id, receipt_number = %sale.receipt_number, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, receipt_number, customer_id, payment_method_id, transaction_date,
            subtotal, total, paid, change_amount,
            points_earned, points_redeemed, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.receipt_number)
    .bind(&sale.customer_id)
    .bind(&sale.payment_method_id)
    .bind(sale.transaction_date)
    .bind(sale.subtotal)
    .bind(sale.total)
    .bind(sale.paid)
    .bind(sale.change)
    .bind(sale.points_earned)
    .bind(sale.points_redeemed)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(exec)
    .await?;

    Ok(())
}

/// Rewrites every mutable header field. Id, receipt number and
/// `created_at` stay as they are.
pub(crate) async fn update_sale<'e, E>(exec: E, sale: &Sale) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(sale_id = %sale.id, "Updating sale header");

    let result = sqlx::query(
        r#"
        UPDATE sales SET
            customer_id = ?2,
            payment_method_id = ?3,
            transaction_date = ?4,
            subtotal = ?5,
            total = ?6,
            paid = ?7,
            change_amount = ?8,
            points_earned = ?9,
            points_redeemed = ?10,
            updated_at = ?11
        WHERE id = ?1
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.customer_id)
    .bind(&sale.payment_method_id)
    .bind(sale.transaction_date)
    .bind(sale.subtotal)
    .bind(sale.total)
    .bind(sale.paid)
    .bind(sale.change)
    .bind(sale.points_earned)
    .bind(sale.points_redeemed)
    .bind(sale.updated_at)
    .execute(exec)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", &sale.id));
    }

    Ok(())
}

pub(crate) async fn delete_sale<'e, E>(exec: E, sale_id: &str) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(sale_id = %sale_id, "Deleting sale");

    let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
        .bind(sale_id)
        .execute(exec)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", sale_id));
    }

    Ok(())
}

pub(crate) async fn delete_items<'e, E>(exec: E, sale_id: &str) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
        .bind(sale_id)
        .execute(exec)
        .await?;

    debug!(sale_id = %sale_id, removed = result.rows_affected(), "Sale items cleared");
    Ok(result.rows_affected())
}

/// Inserts one line item (snapshot pattern: name frozen at time of sale).
pub(crate) async fn insert_item<'e, E>(exec: E, item: &SaleLineItem) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(
        sale_id = %item.sale_id,
        product_id = %item.product_id,
        quantity = item.quantity,
        "Inserting sale item"
    );

    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, name_snapshot, quantity, unit_price, subtotal, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.name_snapshot)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.subtotal)
    .bind(item.created_at)
    .execute(exec)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

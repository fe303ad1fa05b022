//! # Receivable Repository
//!
//! Customer debt, at most one row per sale.
//!
//! ```text
//!   pending ──settle()──► paid (paid_at stamped)
//!      ▲
//!      └── replaced wholesale whenever its sale is edited
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use warung_core::{Money, Receivable, ReceivableStatus};

/// Repository for receivables.
#[derive(Debug, Clone)]
pub struct ReceivableRepository {
    pool: SqlitePool,
}

impl ReceivableRepository {
    /// Creates a new ReceivableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceivableRepository { pool }
    }

    /// Gets the receivable of a sale, if any.
    pub async fn get_by_sale(&self, sale_id: &str) -> DbResult<Option<Receivable>> {
        select_by_sale(&self.pool, sale_id).await
    }

    /// Lists pending receivables, earliest due first.
    pub async fn list_pending(&self) -> DbResult<Vec<Receivable>> {
        let rows = sqlx::query_as::<_, Receivable>(
            r#"
            SELECT id, sale_id, customer_id, amount, due_date, status, created_at, paid_at
            FROM receivables
            WHERE status = ?1
            ORDER BY due_date, created_at
            "#,
        )
        .bind(ReceivableStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Lists every receivable of a customer, newest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Receivable>> {
        let rows = sqlx::query_as::<_, Receivable>(
            r#"
            SELECT id, sale_id, customer_id, amount, due_date, status, created_at, paid_at
            FROM receivables
            WHERE customer_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Total pending debt of a customer.
    pub async fn outstanding_for(&self, customer_id: &str) -> DbResult<Money> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(amount) FROM receivables WHERE customer_id = ?1 AND status = ?2",
        )
        .bind(customer_id)
        .bind(ReceivableStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_units(total.unwrap_or(0)))
    }

    /// Marks the receivable of a sale as paid.
    ///
    /// Settling an already-paid receivable returns it unchanged.
    pub async fn settle(&self, sale_id: &str) -> DbResult<Receivable> {
        let mut conn = self.pool.acquire().await?;
        mark_paid(&mut conn, sale_id).await
    }
}

// =============================================================================
// Executor-generic statements (shared with UnitOfWork)
// =============================================================================

pub(crate) async fn select_by_sale<'e, E>(exec: E, sale_id: &str) -> DbResult<Option<Receivable>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Receivable>(
        r#"
        SELECT id, sale_id, customer_id, amount, due_date, status, created_at, paid_at
        FROM receivables
        WHERE sale_id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(exec)
    .await?;

    Ok(row)
}

pub(crate) async fn insert<'e, E>(exec: E, receivable: &Receivable) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(
        sale_id = %receivable.sale_id,
        customer_id = %receivable.customer_id,
        amount = receivable.amount.units(),
        "Inserting receivable"
    );

    sqlx::query(
        r#"
        INSERT INTO receivables (
            id, sale_id, customer_id, amount, due_date, status, created_at, paid_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&receivable.id)
    .bind(&receivable.sale_id)
    .bind(&receivable.customer_id)
    .bind(receivable.amount)
    .bind(receivable.due_date)
    .bind(receivable.status)
    .bind(receivable.created_at)
    .bind(receivable.paid_at)
    .execute(exec)
    .await?;

    Ok(())
}

pub(crate) async fn delete_by_sale<'e, E>(exec: E, sale_id: &str) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM receivables WHERE sale_id = ?1")
        .bind(sale_id)
        .execute(exec)
        .await?;

    debug!(sale_id = %sale_id, removed = result.rows_affected(), "Receivable cleared");
    Ok(result.rows_affected())
}

pub(crate) async fn mark_paid(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Receivable> {
    let current = select_by_sale(&mut *conn, sale_id)
        .await?
        .ok_or_else(|| DbError::not_found("Receivable", sale_id))?;

    if current.status == ReceivableStatus::Paid {
        debug!(sale_id = %sale_id, "Receivable already settled");
        return Ok(current);
    }

    let paid_at = Utc::now();
    sqlx::query("UPDATE receivables SET status = ?2, paid_at = ?3 WHERE sale_id = ?1")
        .bind(sale_id)
        .bind(ReceivableStatus::Paid)
        .bind(paid_at)
        .execute(&mut *conn)
        .await?;

    info!(sale_id = %sale_id, amount = current.amount.units(), "Receivable settled");

    Ok(Receivable {
        status: ReceivableStatus::Paid,
        paid_at: Some(paid_at),
        ..current
    })
}

//! # Customer Repository
//!
//! Customer book and loyalty point balances.
//!
//! Points only move through [`apply_points_delta`], which refuses to take a
//! balance below zero.

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::{new_id, Customer, NewCustomer};

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

    /// Creates a customer with a zero point balance.
    pub async fn insert(&self, details: &NewCustomer) -> DbResult<Customer> {
        insert(&self.pool, details).await
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        select_by_id(&self.pool, id).await
    }

    /// Finds a customer by exact name, ignoring case and surrounding blanks.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Customer>> {
        select_by_name(&self.pool, name).await
    }

    /// Lists customers sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, address, points, created_at
            FROM customers
            ORDER BY name COLLATE NOCASE
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Adjusts a point balance outside a sale and returns the new balance.
    pub async fn adjust_points(&self, id: &str, delta: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        apply_points_delta(&mut conn, id, delta).await
    }
}

// =============================================================================
// Executor-generic statements (shared with UnitOfWork)
// =============================================================================

pub(crate) async fn insert<'e, E>(exec: E, details: &NewCustomer) -> DbResult<Customer>
where
    E: SqliteExecutor<'e>,
{
    let customer = Customer {
        id: new_id(),
        name: details.name.trim().to_string(),
        phone: details.phone.trim().to_string(),
        address: details.address.trim().to_string(),
        points: 0,
        created_at: Utc::now(),
    };

    debug!(customer_id = %customer.id, name = %customer.name, "Inserting customer");

    sqlx::query(
        r#"
        INSERT INTO customers (id, name, phone, address, points, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(&customer.address)
    .bind(customer.points)
    .bind(customer.created_at)
    .execute(exec)
    .await?;

    Ok(customer)
}

pub(crate) async fn select_by_id<'e, E>(exec: E, id: &str) -> DbResult<Option<Customer>>
where
    E: SqliteExecutor<'e>,
{
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, phone, address, points, created_at
        FROM customers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(exec)
    .await?;

    Ok(customer)
}

pub(crate) async fn select_by_name<'e, E>(exec: E, name: &str) -> DbResult<Option<Customer>>
where
    E: SqliteExecutor<'e>,
{
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, phone, address, points, created_at
        FROM customers
        WHERE name = ?1 COLLATE NOCASE
        ORDER BY created_at
        LIMIT 1
        "#,
    )
    .bind(name.trim())
    .fetch_optional(exec)
    .await?;

    Ok(customer)
}

/// Guarded points delta. Returns the new balance.
pub(crate) async fn apply_points_delta(
    conn: &mut SqliteConnection,
    id: &str,
    delta: i64,
) -> DbResult<i64> {
    let points: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE customers
        SET points = points + ?2
        WHERE id = ?1 AND points + ?2 >= 0
        RETURNING points
        "#,
    )
    .bind(id)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(points) = points {
        debug!(customer_id = %id, delta, points, "Points updated");
        return Ok(points);
    }

    let current: Option<i64> = sqlx::query_scalar("SELECT points FROM customers WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match current {
        None => Err(DbError::not_found("Customer", id)),
        Some(current) => Err(DbError::conflict(
            "Customer",
            id,
            format!("points {} cannot absorb delta {}", current, delta),
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

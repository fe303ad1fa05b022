//! # Payment Method Repository
//!
//! The store's configured payment methods. Debt-like methods are recognised
//! by name (see [`PaymentMethod::is_debt`]), so nothing here stores a flag.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use warung_core::{new_id, PaymentMethod};

/// Repository for payment methods.
#[derive(Debug, Clone)]
pub struct PaymentMethodRepository {
    pool: SqlitePool,
}

impl PaymentMethodRepository {
    /// Creates a new PaymentMethodRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentMethodRepository { pool }
    }

    /// Lists all payment methods sorted by name.
    pub async fn list(&self) -> DbResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, name FROM payment_methods ORDER BY name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    /// Gets a payment method by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PaymentMethod>> {
        let method =
            sqlx::query_as::<_, PaymentMethod>("SELECT id, name FROM payment_methods WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(method)
    }

    /// Finds a payment method by name, ignoring case.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<PaymentMethod>> {
        let method = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, name FROM payment_methods WHERE name = ?1 COLLATE NOCASE",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }

    /// Adds a payment method.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already exists (any case)
    pub async fn insert(&self, name: &str) -> DbResult<PaymentMethod> {
        insert(&self.pool, name).await
    }
}

pub(crate) async fn insert<'e, E>(exec: E, name: &str) -> DbResult<PaymentMethod>
where
    E: SqliteExecutor<'e>,
{
    let method = PaymentMethod {
        id: new_id(),
        name: name.trim().to_string(),
    };

    debug!(id = %method.id, name = %method.name, "Inserting payment method");

    sqlx::query("INSERT INTO payment_methods (id, name) VALUES (?1, ?2)")
        .bind(&method.id)
        .bind(&method.name)
        .execute(exec)
        .await?;

    Ok(method)
}

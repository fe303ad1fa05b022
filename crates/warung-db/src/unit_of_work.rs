//! # Unit of Work
//!
//! The atomic primitive every ledger mutation of a sale runs inside.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let mut uow = db.begin().await?;                                       │
//! │                                                                         │
//! │  uow.insert_sale(..)          ┐                                         │
//! │  uow.replace_items(..)        │  one SQLite transaction                 │
//! │  uow.replace_receivable(..)   │  nothing is visible to other            │
//! │  uow.apply_stock_plan(..)     │  connections until commit               │
//! │  uow.apply_points_delta(..)   ┘                                         │
//! │                                                                         │
//! │  uow.commit().await?   ──► all of it, at once                           │
//! │  drop(uow) / error     ──► none of it                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{customer, payment_method, product, receivable, sale};
use warung_core::stock::{StockDeltas, StockPlan};
use warung_core::{Customer, NewCustomer, PaymentMethod, Receivable, Sale, SaleLineItem};

/// An open database transaction with typed ledger operations.
///
/// Dropping it without [`commit`](Self::commit) rolls everything back.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        UnitOfWork { tx }
    }

    /// Makes every write of this unit of work durable and visible.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Discards every write of this unit of work.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Unit of work rolled back");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn find_customer_by_name(&mut self, name: &str) -> DbResult<Option<Customer>> {
        customer::select_by_name(&mut *self.tx, name).await
    }

    pub async fn sale(&mut self, id: &str) -> DbResult<Option<Sale>> {
        sale::select_by_id(&mut *self.tx, id).await
    }

    pub async fn sale_items(&mut self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        sale::select_items(&mut *self.tx, sale_id).await
    }

    /// Next free receipt number for a day (`YYYYMMDD-NNNN`).
    pub async fn next_receipt_number(&mut self, date: NaiveDate) -> DbResult<String> {
        sale::next_receipt_number(&mut *self.tx, date).await
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub async fn insert_customer(&mut self, details: &NewCustomer) -> DbResult<Customer> {
        customer::insert(&mut *self.tx, details).await
    }

    pub async fn insert_payment_method(&mut self, name: &str) -> DbResult<PaymentMethod> {
        payment_method::insert(&mut *self.tx, name).await
    }

    pub async fn insert_sale(&mut self, sale: &Sale) -> DbResult<()> {
        sale::insert_sale(&mut *self.tx, sale).await
    }

    pub async fn update_sale(&mut self, sale: &Sale) -> DbResult<()> {
        sale::update_sale(&mut *self.tx, sale).await
    }

    /// Deletes a sale together with its items and receivable.
    pub async fn delete_sale(&mut self, sale_id: &str) -> DbResult<()> {
        receivable::delete_by_sale(&mut *self.tx, sale_id).await?;
        sale::delete_items(&mut *self.tx, sale_id).await?;
        sale::delete_sale(&mut *self.tx, sale_id).await
    }

    /// Replaces every line item of a sale. Never patches in place.
    pub async fn replace_items(&mut self, sale_id: &str, items: &[SaleLineItem]) -> DbResult<()> {
        sale::delete_items(&mut *self.tx, sale_id).await?;
        for item in items {
            sale::insert_item(&mut *self.tx, item).await?;
        }
        Ok(())
    }

    /// Replaces the receivable of a sale: the old one (if any) is deleted and
    /// the new one (if any) inserted.
    pub async fn replace_receivable(
        &mut self,
        sale_id: &str,
        new: Option<&Receivable>,
    ) -> DbResult<()> {
        receivable::delete_by_sale(&mut *self.tx, sale_id).await?;
        if let Some(r) = new {
            receivable::insert(&mut *self.tx, r).await?;
        }
        Ok(())
    }

    /// Applies guarded stock deltas.
    pub async fn apply_stock(&mut self, deltas: &StockDeltas) -> DbResult<()> {
        for (product_id, delta) in deltas.iter() {
            product::apply_stock_delta(&mut self.tx, product_id, delta).await?;
        }
        Ok(())
    }

    /// Applies a stock plan: the full reversal first, then consumption.
    ///
    /// Consumption is guarded, so a shelf that no longer covers the sale
    /// fails here with `DbError::Conflict`.
    pub async fn apply_stock_plan(&mut self, plan: &StockPlan) -> DbResult<()> {
        self.apply_stock(&plan.reversal).await?;
        self.apply_stock(&plan.consumption).await
    }

    /// Applies a guarded points delta and returns the new balance.
    pub async fn apply_points_delta(&mut self, customer_id: &str, delta: i64) -> DbResult<i64> {
        customer::apply_points_delta(&mut self.tx, customer_id, delta).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

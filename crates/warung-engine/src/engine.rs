//! # Sale Engine
//!
//! Turns a draft sale into one atomic set of ledger mutations.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Draft ──validate()──► Validating ──ok──► Committing ──► Committed    │
//! │     ▲                       │                  │                        │
//! │     └──── ValidationError ──┘                  │                        │
//! │     ▲                                          │                        │
//! │     └──── ConsistencyError (rolled back) ──────┘                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commit Order (one unit of work)
//! 1. Create the free-text customer of a debt sale, unless one by that name exists
//! 2. Insert or update the sale header (edits keep id and receipt number)
//! 3. Replace every line item
//! 4. Replace the receivable
//! 5. Stock: full reversal of the previous version, then guarded consumption
//! 6. Points: one guarded net delta per customer
//!
//! Any failure in 1-6 drops the unit of work; nothing becomes visible.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use warung_core::loyalty::{balance_after_reversal, PointsChange, PointsPlan, Redemption};
use warung_core::pricing::{self, BillableItem};
use warung_core::receivable::{self, Settlement};
use warung_core::stock::StockPlan;
use warung_core::validation::{validate_draft, DraftCheck, LineCheck};
use warung_core::{
    new_id, Customer, Money, NewCustomer, PaymentMethod, Receivable, ReceivableStatus, Sale,
    SaleInput, SaleLineItem, ValidationError,
};
use warung_db::{Database, DbError, UnitOfWork};

use crate::config::EngineConfig;
use crate::error::{SaleError, SaleResult};

// =============================================================================
// State
// =============================================================================

/// Where a sale operation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleState {
    Draft,
    Validating,
    Committing,
    Committed,
}

impl fmt::Display for SaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaleState::Draft => "draft",
            SaleState::Validating => "validating",
            SaleState::Committing => "committing",
            SaleState::Committed => "committed",
        };
        f.write_str(name)
    }
}

fn transition(sale: &str, from: SaleState, to: SaleState) {
    debug!(sale = %sale, %from, %to, "Sale state changed");
}

/// Whether a draft creates a new sale or replaces a committed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleMode {
    Create,
    Edit { sale_id: String },
}

impl SaleMode {
    pub fn edit(sale_id: impl Into<String>) -> Self {
        SaleMode::Edit {
            sale_id: sale_id.into(),
        }
    }

    fn label(&self) -> &str {
        match self {
            SaleMode::Create => "new",
            SaleMode::Edit { sale_id } => sale_id,
        }
    }
}

#[derive(Debug, Clone)]
enum CustomerChoice {
    WalkIn,
    Existing(Customer),
    /// Typed at the register for a debt sale; created during commit.
    New(NewCustomer),
}

// =============================================================================
// Validated Sale
// =============================================================================

/// A draft that passed validation, priced against the catalog as it was
/// when validated.
///
/// Committing re-checks stock and points inside the unit of work, so a
/// `ValidatedSale` can go stale without corrupting anything.
#[derive(Debug, Clone)]
pub struct ValidatedSale {
    mode: SaleMode,
    transaction_date: NaiveDate,
    due_date: Option<NaiveDate>,
    payment_method: PaymentMethod,
    customer: CustomerChoice,
    items: Vec<BillableItem>,
    subtotal: Money,
    redemption: Redemption,
    settlement: Settlement,
}

impl ValidatedSale {
    pub fn mode(&self) -> &SaleMode {
        &self.mode
    }

    pub fn items(&self) -> &[BillableItem] {
        &self.items
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }

    /// Cart total before redemption.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Amount due after redemption.
    pub fn total(&self) -> Money {
        self.redemption.final_total
    }

    pub fn points_redeemed(&self) -> i64 {
        self.redemption.points_redeemed
    }

    pub fn points_earned(&self) -> i64 {
        self.redemption.points_earned
    }

    pub fn paid(&self) -> Money {
        self.settlement.paid
    }

    pub fn change(&self) -> Money {
        self.settlement.change
    }

    /// Debt that will be recorded as a receivable.
    pub fn outstanding(&self) -> Option<Money> {
        self.settlement.outstanding
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// A committed sale as printed on a receipt.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub store_name: String,
    pub sale: Sale,
    pub items: Vec<SaleLineItem>,
    pub payment_method: String,
    pub customer_name: Option<String>,
    pub receivable: Option<Receivable>,
}

// =============================================================================
// Engine
// =============================================================================

/// The sale transaction orchestrator.
///
/// ## Usage
/// ```rust,ignore
/// let engine = SaleEngine::new(db, &config);
///
/// let sale_id = engine.create_sale(&input).await?;
/// engine.update_sale(&sale_id, &edited).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleEngine {
    db: Database,
    receivable_term_days: u32,
    store_name: String,
}

impl SaleEngine {
    pub fn new(db: Database, config: &EngineConfig) -> Self {
        SaleEngine {
            db,
            receivable_term_days: config.receivable_term_days(),
            store_name: config.store.name.clone(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Validates and commits a new sale. Returns the committed sale id.
    pub async fn create_sale(&self, input: &SaleInput) -> SaleResult<String> {
        let validated = self.validate(input, SaleMode::Create).await?;
        self.commit(validated).await
    }

    /// Validates and commits a new version of an existing sale.
    pub async fn update_sale(&self, sale_id: &str, input: &SaleInput) -> SaleResult<()> {
        let validated = self.validate(input, SaleMode::edit(sale_id)).await?;
        self.commit(validated).await?;
        Ok(())
    }

    // =========================================================================
    // Validating
    // =========================================================================

    /// Checks a draft against the current catalog and customer book.
    ///
    /// Writes nothing. On failure the caller stays in draft.
    pub async fn validate(&self, input: &SaleInput, mode: SaleMode) -> SaleResult<ValidatedSale> {
        let label = mode.label().to_string();
        transition(&label, SaleState::Draft, SaleState::Validating);

        match self.check(input, mode).await {
            Ok(validated) => {
                debug!(
                    sale = %label,
                    total = validated.total().units(),
                    lines = validated.items.len(),
                    "Draft validated"
                );
                Ok(validated)
            }
            Err(e) => {
                warn!(sale = %label, error = %e, "Draft rejected");
                transition(&label, SaleState::Validating, SaleState::Draft);
                Err(e)
            }
        }
    }

    async fn check(&self, input: &SaleInput, mode: SaleMode) -> SaleResult<ValidatedSale> {
        let previous = match &mode {
            SaleMode::Create => None,
            SaleMode::Edit { sale_id } => {
                let sale = self
                    .db
                    .sales()
                    .get_by_id(sale_id)
                    .await?
                    .ok_or_else(|| SaleError::not_found("Sale", sale_id))?;
                let items = self.db.sales().get_items(sale_id).await?;
                Some((sale, items))
            }
        };

        // Units the edited sale already holds count as available.
        let mut held: BTreeMap<&str, i64> = BTreeMap::new();
        if let Some((_, old_items)) = &previous {
            for item in old_items {
                *held.entry(item.product_id.as_str()).or_insert(0) += item.quantity;
            }
        }

        let mut lines = Vec::new();
        let mut items = Vec::new();
        for (product_id, quantity) in input.cart.quantities() {
            let product = self
                .db
                .products()
                .get_by_id(&product_id)
                .await?
                .ok_or_else(|| SaleError::not_found("Product", &product_id))?;

            let available = product.stock + held.get(product_id.as_str()).copied().unwrap_or(0);
            lines.push(LineCheck {
                product_name: product.name.clone(),
                requested: quantity,
                available,
            });
            items.extend(pricing::resolve(&product, quantity));
        }
        let subtotal = pricing::total_of(&items);

        let payment_method = match &input.payment_method_id {
            Some(id) => Some(
                self.db
                    .payment_methods()
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| SaleError::not_found("Payment method", id))?,
            ),
            None => None,
        };
        let is_debt = payment_method.as_ref().is_some_and(PaymentMethod::is_debt);

        let customer = match (&input.customer_id, &input.new_customer) {
            (Some(id), _) => CustomerChoice::Existing(
                self.db
                    .customers()
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| SaleError::not_found("Customer", id))?,
            ),
            (None, Some(details)) if is_debt && !details.name.trim().is_empty() => {
                match self.db.customers().find_by_name(&details.name).await? {
                    Some(existing) => CustomerChoice::Existing(existing),
                    None => CustomerChoice::New(details.clone()),
                }
            }
            _ => CustomerChoice::WalkIn,
        };

        let old_points = previous.as_ref().and_then(|(sale, _)| committed_points(sale));
        let balance = match &customer {
            CustomerChoice::Existing(c) => Some(balance_after_reversal(c.points, old_points.as_ref(), &c.id)),
            CustomerChoice::New(_) => Some(0),
            CustomerChoice::WalkIn => None,
        };
        let redemption = Redemption::compute(balance, subtotal, input.redeem_points);

        validate_draft(&DraftCheck {
            lines,
            transaction_date: input.transaction_date,
            payment_method: payment_method.as_ref(),
            has_customer: matches!(customer, CustomerChoice::Existing(_)),
            new_customer: input.new_customer.as_ref(),
            paid: input.paid,
            final_total: redemption.final_total,
        })?;

        let points = PointsPlan {
            reversal: old_points,
            application: match &customer {
                CustomerChoice::Existing(c) => Some(PointsChange {
                    customer_id: c.id.clone(),
                    earned: redemption.points_earned,
                    redeemed: redemption.points_redeemed,
                }),
                _ => None,
            },
        };
        self.ensure_points_cover(&points).await?;

        let transaction_date = input
            .transaction_date
            .ok_or_else(|| ValidationError::required("transaction date"))?;
        let payment_method =
            payment_method.ok_or_else(|| ValidationError::required("payment method"))?;

        let settlement = receivable::settle(
            redemption.final_total,
            input.paid,
            payment_method.is_debt(),
            !matches!(customer, CustomerChoice::WalkIn),
        );

        Ok(ValidatedSale {
            mode,
            transaction_date,
            due_date: input.due_date,
            payment_method,
            customer,
            items,
            subtotal,
            redemption,
            settlement,
        })
    }

    // =========================================================================
    // Committing
    // =========================================================================

    /// Applies a validated sale in one unit of work. Returns the sale id.
    ///
    /// ## Errors
    /// - `NotFound` when the edited sale was deleted after validation
    /// - `Consistency` for anything else; no ledger was touched
    pub async fn commit(&self, validated: ValidatedSale) -> SaleResult<String> {
        let label = validated.mode.label().to_string();
        transition(&label, SaleState::Validating, SaleState::Committing);

        let mut uow = self.db.begin().await.map_err(|e| abort(&label, e))?;

        match self.apply(&mut uow, &validated).await {
            Ok(sale) => {
                uow.commit().await.map_err(|e| abort(&label, e))?;
                transition(&label, SaleState::Committing, SaleState::Committed);
                info!(
                    sale_id = %sale.id,
                    receipt = %sale.receipt_number,
                    total = sale.total.units(),
                    points_earned = sale.points_earned,
                    points_redeemed = sale.points_redeemed,
                    edit = matches!(validated.mode, SaleMode::Edit { .. }),
                    "Sale committed"
                );
                Ok(sale.id)
            }
            Err(e) => {
                if let Err(rb) = uow.rollback().await {
                    warn!(sale = %label, error = %rb, "Rollback failed, transaction dropped");
                }
                transition(&label, SaleState::Committing, SaleState::Draft);
                Err(e)
            }
        }
    }

    async fn apply(&self, uow: &mut UnitOfWork, v: &ValidatedSale) -> SaleResult<Sale> {
        let label = v.mode.label();
        let ledger = |e: DbError| abort(label, e);
        let now = Utc::now();

        let customer_id = match &v.customer {
            CustomerChoice::WalkIn => None,
            CustomerChoice::Existing(c) => Some(c.id.clone()),
            CustomerChoice::New(details) => {
                let customer = match uow.find_customer_by_name(&details.name).await.map_err(ledger)? {
                    Some(existing) => existing,
                    None => {
                        let created = uow.insert_customer(details).await.map_err(ledger)?;
                        info!(customer_id = %created.id, name = %created.name, "Customer created for debt sale");
                        created
                    }
                };
                Some(customer.id)
            }
        };

        let previous = match &v.mode {
            SaleMode::Create => None,
            SaleMode::Edit { sale_id } => {
                let sale = uow
                    .sale(sale_id)
                    .await
                    .map_err(ledger)?
                    .ok_or_else(|| SaleError::not_found("Sale", sale_id))?;
                let items = uow.sale_items(sale_id).await.map_err(ledger)?;
                Some((sale, items))
            }
        };

        let sale = match &previous {
            None => {
                let receipt = uow
                    .next_receipt_number(v.transaction_date)
                    .await
                    .map_err(ledger)?;
                let sale = header(v, new_id(), receipt, customer_id.clone(), now, now);
                uow.insert_sale(&sale).await.map_err(ledger)?;
                sale
            }
            Some((old, _)) => {
                let sale = header(
                    v,
                    old.id.clone(),
                    old.receipt_number.clone(),
                    customer_id.clone(),
                    old.created_at,
                    now,
                );
                uow.update_sale(&sale).await.map_err(ledger)?;
                sale
            }
        };

        let lines: Vec<SaleLineItem> = v
            .items
            .iter()
            .map(|item| SaleLineItem {
                id: new_id(),
                sale_id: sale.id.clone(),
                product_id: item.product_id.clone(),
                name_snapshot: item.product_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
                created_at: now,
            })
            .collect();
        uow.replace_items(&sale.id, &lines).await.map_err(ledger)?;

        let debt = match (&customer_id, v.settlement.outstanding) {
            (Some(customer_id), Some(amount)) => Some(Receivable {
                id: new_id(),
                sale_id: sale.id.clone(),
                customer_id: customer_id.clone(),
                amount,
                due_date: receivable::due_date(
                    v.transaction_date,
                    v.due_date,
                    self.receivable_term_days,
                ),
                status: ReceivableStatus::Pending,
                created_at: now,
                paid_at: None,
            }),
            _ => None,
        };
        uow.replace_receivable(&sale.id, debt.as_ref())
            .await
            .map_err(ledger)?;

        let stock = match &previous {
            None => StockPlan::for_create(&v.items),
            Some((_, old_items)) => StockPlan::for_edit(
                old_items.iter().map(|i| (i.product_id.as_str(), i.quantity)),
                &v.items,
            ),
        };
        uow.apply_stock_plan(&stock).await.map_err(ledger)?;

        let points = PointsPlan {
            reversal: previous.as_ref().and_then(|(old, _)| committed_points(old)),
            application: customer_id.map(|customer_id| PointsChange {
                customer_id,
                earned: v.redemption.points_earned,
                redeemed: v.redemption.points_redeemed,
            }),
        };
        for (customer_id, delta) in points.net() {
            let balance = uow
                .apply_points_delta(&customer_id, delta)
                .await
                .map_err(ledger)?;
            debug!(customer_id = %customer_id, delta, balance, "Points applied");
        }

        Ok(sale)
    }

    // =========================================================================
    // Cancel / Settle
    // =========================================================================

    /// Voids a committed sale: stock and points go back, the sale, its items
    /// and its receivable are deleted.
    ///
    /// Rejected with `PointsAlreadySpent` when the customer no longer holds
    /// the points this sale earned.
    pub async fn cancel_sale(&self, sale_id: &str) -> SaleResult<()> {
        let sale = self
            .db
            .sales()
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| SaleError::not_found("Sale", sale_id))?;

        let reversal = PointsPlan {
            reversal: committed_points(&sale),
            application: None,
        };
        if let Err(e) = self.ensure_points_cover(&reversal).await {
            warn!(sale_id = %sale_id, error = %e, "Cancel rejected");
            return Err(e);
        }

        let mut uow = self.db.begin().await.map_err(|e| abort(sale_id, e))?;
        match void(&mut uow, sale_id).await {
            Ok(voided) => {
                uow.commit().await.map_err(|e| abort(sale_id, e))?;
                info!(
                    sale_id = %sale_id,
                    receipt = %voided.receipt_number,
                    total = voided.total.units(),
                    "Sale cancelled"
                );
                Ok(())
            }
            Err(e) => {
                if let Err(rb) = uow.rollback().await {
                    warn!(sale_id = %sale_id, error = %rb, "Rollback failed, transaction dropped");
                }
                Err(e)
            }
        }
    }

    /// Rejects a points plan that would take back more than a customer
    /// still holds, e.g. points earned by the old version and already spent.
    async fn ensure_points_cover(&self, plan: &PointsPlan) -> SaleResult<()> {
        for (customer_id, delta) in plan.net() {
            if delta >= 0 {
                continue;
            }
            let customer = self
                .db
                .customers()
                .get_by_id(&customer_id)
                .await?
                .ok_or_else(|| SaleError::not_found("Customer", &customer_id))?;
            if customer.points + delta < 0 {
                return Err(ValidationError::PointsAlreadySpent {
                    customer: customer.name,
                    balance: customer.points,
                    required: -delta,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Marks the receivable of a sale as paid.
    pub async fn settle_receivable(&self, sale_id: &str) -> SaleResult<Receivable> {
        Ok(self.db.receivables().settle(sale_id).await?)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Loads a committed sale with everything a receipt shows.
    pub async fn receipt(&self, sale_id: &str) -> SaleResult<SaleReceipt> {
        let sale = self
            .db
            .sales()
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| SaleError::not_found("Sale", sale_id))?;
        let items = self.db.sales().get_items(sale_id).await?;

        let payment_method = self
            .db
            .payment_methods()
            .get_by_id(&sale.payment_method_id)
            .await?
            .map(|m| m.name)
            .unwrap_or_default();

        let customer_name = match &sale.customer_id {
            Some(id) => self.db.customers().get_by_id(id).await?.map(|c| c.name),
            None => None,
        };

        let receivable = self.db.receivables().get_by_sale(sale_id).await?;

        Ok(SaleReceipt {
            store_name: self.store_name.clone(),
            sale,
            items,
            payment_method,
            customer_name,
            receivable,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn void(uow: &mut UnitOfWork, sale_id: &str) -> SaleResult<Sale> {
    let ledger = |e: DbError| abort(sale_id, e);

    let sale = uow
        .sale(sale_id)
        .await
        .map_err(ledger)?
        .ok_or_else(|| SaleError::not_found("Sale", sale_id))?;
    let items = uow.sale_items(sale_id).await.map_err(ledger)?;

    let stock = StockPlan::for_cancel(items.iter().map(|i| (i.product_id.as_str(), i.quantity)));
    uow.apply_stock_plan(&stock).await.map_err(ledger)?;

    let points = PointsPlan {
        reversal: committed_points(&sale),
        application: None,
    };
    for (customer_id, delta) in points.net() {
        uow.apply_points_delta(&customer_id, delta)
            .await
            .map_err(ledger)?;
    }

    uow.delete_sale(sale_id).await.map_err(ledger)?;
    Ok(sale)
}

/// Logs the detail of a failed commit and hides it behind `Consistency`.
fn abort(sale: &str, err: DbError) -> SaleError {
    error!(sale = %sale, error = %err, "Commit aborted, unit of work rolled back");
    SaleError::Consistency(err)
}

/// Points a committed sale version moved, if a customer was attached.
fn committed_points(sale: &Sale) -> Option<PointsChange> {
    sale.customer_id.as_ref().map(|customer_id| PointsChange {
        customer_id: customer_id.clone(),
        earned: sale.points_earned,
        redeemed: sale.points_redeemed,
    })
}

fn header(
    v: &ValidatedSale,
    id: String,
    receipt_number: String,
    customer_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Sale {
    Sale {
        id,
        receipt_number,
        customer_id,
        payment_method_id: v.payment_method.id.clone(),
        transaction_date: v.transaction_date,
        subtotal: v.subtotal,
        total: v.redemption.final_total,
        paid: v.settlement.paid,
        change: v.settlement.change,
        points_earned: v.redemption.points_earned,
        points_redeemed: v.redemption.points_redeemed,
        created_at,
        updated_at,
    }
}

//! # Domain Types
//!
//! Core domain types used throughout the sale transaction engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   Receivable    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  unit_price     │   │  total / paid   │   │  sale_id (1:1)  │       │
//! │  │  package_price  │   │  change         │   │  amount         │       │
//! │  │  package_qty    │   │  points_*       │   │  status         │       │
//! │  │  stock          │   │  line items     │   │  due_date       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │ PaymentMethod   │   │   SaleInput     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  points (≥ 0)   │   │  name           │   │  cart           │       │
//! │  │                 │   │  is_debt()      │   │  payment fields │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Products and customers are owned by the catalog and customer book.
//! Cart lines and sale line items only reference them by id, plus a frozen
//! name snapshot on the persisted line item.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::money::Money;
use crate::DEBT_KEYWORD;

/// Generates a new entity id (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// A product in the store catalog.
///
/// ## Package Pricing
/// A package sells `package_qty` units for `package_price`. The package price
/// is NOT derived from `unit_price`; it is usually a bulk discount.
/// `package_qty == 0` or `package_price == None` means no package pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Barcode, if the product carries one.
    pub barcode: Option<String>,

    /// Selling price of one unit.
    pub unit_price: Money,

    /// Selling price of one full package.
    pub package_price: Option<Money>,

    /// Units per package (0 = not sold by package).
    pub package_qty: i64,

    /// Purchase (cost) price of one unit.
    pub purchase_price: Money,

    /// Current stock level. Never committed negative.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with a fresh id, no package pricing and zero stock.
    pub fn new(name: impl Into<String>, unit_price: Money) -> Self {
        let now = Utc::now();
        Product {
            id: new_id(),
            name: name.into(),
            barcode: None,
            unit_price,
            package_price: None,
            package_qty: 0,
            purchase_price: Money::zero(),
            stock: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the package price when package pricing is configured.
    pub fn package_pricing(&self) -> Option<(i64, Money)> {
        match self.package_price {
            Some(price) if self.package_qty > 0 => Some((self.package_qty, price)),
            _ => None,
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer with a loyalty point balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    /// Running loyalty balance. Never negative.
    pub points: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Details for a customer created on the fly at the register.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl NewCustomer {
    /// Creates new-customer details from just a name.
    pub fn named(name: impl Into<String>) -> Self {
        NewCustomer {
            name: name.into(),
            ..NewCustomer::default()
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// A payment method configured for the store.
///
/// ## Debt Convention
/// A method whose name contains "hutang" (any case) is debt-like: it defers
/// payment and leaves a receivable instead of requiring cash now. This is a
/// contract with the stored data, so it stays a name match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
}

impl PaymentMethod {
    /// Returns true when this method defers payment.
    ///
    /// ## Example
    /// ```rust
    /// use warung_core::PaymentMethod;
    ///
    /// let m = PaymentMethod { id: "1".into(), name: "Hutang / Kasbon".into() };
    /// assert!(m.is_debt());
    /// ```
    pub fn is_debt(&self) -> bool {
        is_debt_method_name(&self.name)
    }
}

/// Name-based debt detection, usable without a full `PaymentMethod`.
pub fn is_debt_method_name(name: &str) -> bool {
    name.to_lowercase().contains(DEBT_KEYWORD)
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale header.
///
/// ## Amounts
/// - `subtotal`: cart total before point redemption
/// - `total`: amount due after redemption
/// - `paid`: amount settled; for debt sales this equals `total`
///   (cash now plus the receivable)
/// - `change`: `paid - total` for cash-like methods, 0 for debt sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Human-readable number, `YYYYMMDD-NNNN`. Stable across edits.
    pub receipt_number: String,
    pub customer_id: Option<String>,
    pub payment_method_id: String,
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    pub subtotal: Money,
    pub total: Money,
    pub paid: Money,
    pub change: Money,
    pub points_earned: i64,
    pub points_redeemed: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// A persisted line of a sale.
/// Uses the snapshot pattern to freeze the product name at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Receivable
// =============================================================================

/// Settlement status of a receivable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReceivableStatus {
    /// Customer still owes the amount.
    #[default]
    Pending,
    /// Debt was settled.
    Paid,
}

/// Outstanding debt of a customer for one sale (0 or 1 per sale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Receivable {
    pub id: String,
    pub sale_id: String,
    pub customer_id: String,
    /// Always `sale.total - amount settled at the register`.
    pub amount: Money,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub status: ReceivableStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Sale Input (Draft)
// =============================================================================

/// Everything the register collects before a sale is committed.
///
/// ## Customer Fields
/// - `customer_id`: an existing customer picked from the list
/// - `new_customer`: a free-text name typed for a debt sale when the customer
///   is not in the list yet; only consulted when `customer_id` is `None`
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleInput {
    pub cart: Cart,
    pub customer_id: Option<String>,
    pub new_customer: Option<NewCustomer>,
    pub payment_method_id: Option<String>,
    /// Amount tendered at the register. Ignored for debt-like methods.
    pub paid: Money,
    /// Spend the customer's points against this sale.
    pub redeem_points: bool,
    #[ts(as = "Option<String>")]
    pub transaction_date: Option<NaiveDate>,
    /// Receivable due date; defaults to the configured term.
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debt_detection_is_case_insensitive() {
        assert!(is_debt_method_name("Hutang"));
        assert!(is_debt_method_name("HUTANG TEMPO"));
        assert!(is_debt_method_name("bayar hutang"));
        assert!(!is_debt_method_name("Tunai"));
        assert!(!is_debt_method_name("QRIS"));
    }

    #[test]
    fn test_package_pricing_requires_both_fields() {
        let mut product = Product::new("Indomie", Money::from_units(3_000));
        assert_eq!(product.package_pricing(), None);

        product.package_qty = 40;
        assert_eq!(product.package_pricing(), None);

        product.package_price = Some(Money::from_units(110_000));
        assert_eq!(
            product.package_pricing(),
            Some((40, Money::from_units(110_000)))
        );

        product.package_qty = 0;
        assert_eq!(product.package_pricing(), None);
    }

    #[test]
    fn test_receivable_status_default_and_wire_format() {
        assert_eq!(ReceivableStatus::default(), ReceivableStatus::Pending);
        assert_eq!(
            serde_json::to_string(&ReceivableStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&ReceivableStatus::Paid).unwrap(),
            "\"paid\""
        );
    }

    #[test]
    fn test_new_customer_named() {
        let c = NewCustomer::named("Budi");
        assert_eq!(c.name, "Budi");
        assert!(c.phone.is_empty());
    }
}

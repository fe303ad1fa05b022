//! # Pricing Resolver
//!
//! Decides how many package units and how many single units of a cart line
//! are billed, and at which unit price.
//!
//! ## Package Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product: unit_price = 10, package_qty = 5, package_price = 40          │
//! │  Quantity: 12                                                           │
//! │                                                                         │
//! │  packages  = 12 / 5 = 2   → 10 units @ 8  (40 / 5)  = 80               │
//! │  remainder = 12 % 5 = 2   →  2 units @ 10           = 20               │
//! │                                                     ─────               │
//! │                                                      100                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The package subtotal is `packages × package_price`, so a package price
//! that does not divide evenly never loses a unit of currency.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Product;

/// Which price rule produced a billable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    /// Whole packages at the package price.
    Package,
    /// Loose units at the unit price.
    Unit,
}

/// A priced slice of a cart line.
///
/// Never persisted on its own; it becomes a `SaleLineItem` on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillableItem {
    pub product_id: String,
    pub product_name: String,
    pub kind: PriceKind,
    /// Units covered by this item (packages are expanded to units).
    pub quantity: i64,
    /// Effective price of one unit.
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Resolves a product and quantity into billable items.
///
/// ## Rules
/// - Package pricing configured: one `Package` item for the whole packages
///   (if any) and one `Unit` item for the remainder (if any)
/// - Otherwise: a single `Unit` item
/// - `quantity <= 0`: no items (the cart never lets this through)
///
/// ## Example
/// ```rust
/// use warung_core::money::Money;
/// use warung_core::pricing::{resolve, PriceKind};
/// use warung_core::types::Product;
///
/// let mut p = Product::new("Aqua 600ml", Money::from_units(10));
/// p.package_qty = 5;
/// p.package_price = Some(Money::from_units(40));
///
/// let items = resolve(&p, 10);
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].kind, PriceKind::Package);
/// ```
pub fn resolve(product: &Product, quantity: i64) -> Vec<BillableItem> {
    if quantity <= 0 {
        return Vec::new();
    }

    let Some((package_qty, package_price)) = product.package_pricing() else {
        return vec![unit_item(product, quantity)];
    };

    let packages = quantity / package_qty;
    let remainder = quantity % package_qty;

    let mut items = Vec::with_capacity(2);
    if packages > 0 {
        items.push(BillableItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            kind: PriceKind::Package,
            quantity: packages * package_qty,
            unit_price: package_price.per_unit(package_qty),
            subtotal: package_price.multiply_quantity(packages),
        });
    }
    if remainder > 0 {
        items.push(unit_item(product, remainder));
    }
    items
}

fn unit_item(product: &Product, quantity: i64) -> BillableItem {
    BillableItem {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        kind: PriceKind::Unit,
        quantity,
        unit_price: product.unit_price,
        subtotal: product.unit_price.multiply_quantity(quantity),
    }
}

/// Sums the subtotals of a set of billable items.
pub fn total_of(items: &[BillableItem]) -> Money {
    items.iter().map(|i| i.subtotal).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Cart Model
//!
//! Holds the distinct product lines of the sale being rung up.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Register Action          Cart Method             Effect                │
//! │  ───────────────          ───────────             ──────                │
//! │                                                                         │
//! │  Scan / pick product ────► add() ────────────────► merge or push line  │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ──────► replace, or remove   │
//! │                                                   when n <= 0          │
//! │                                                                         │
//! │  Click remove ───────────► remove() ────────────► drop the line        │
//! │                                                                         │
//! │  Show total ─────────────► total() ─────────────► Pricing Resolver     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product (adding the same product sums quantities)
//! - Every line has quantity > 0

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{self, BillableItem};
use crate::types::Product;
use crate::validation::validate_quantity;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// A product line in the cart.
///
/// The product is a snapshot taken when it was added, so the register keeps
/// showing consistent prices while the sale is rung up. The engine re-reads
/// the catalog before committing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Prices this line through the Pricing Resolver.
    pub fn billable_items(&self) -> Vec<BillableItem> {
        pricing::resolve(&self.product, self.quantity)
    }

    /// Line subtotal after package pricing.
    pub fn subtotal(&self) -> Money {
        pricing::total_of(&self.billable_items())
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart or increases its quantity if present.
    ///
    /// ## Errors
    /// - `quantity <= 0` or above the line maximum
    /// - a new line would exceed the maximum number of lines
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity,
            added_at: Utc::now(),
        });
        Ok(())
    }

    /// Removes the line for a product.
    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);

        if self.lines.len() == before {
            Err(CoreError::NotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Replaces the quantity of a line; `n <= 0` removes it.
    pub fn set_quantity(&mut self, product_id: &str, n: i64) -> CoreResult<()> {
        if n <= 0 {
            return self.remove(product_id);
        }

        if n > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: n,
                max: MAX_LINE_QUANTITY,
            });
        }

        match self.lines.iter_mut().find(|l| l.product.id == product_id) {
            Some(line) => {
                line.quantity = n;
                Ok(())
            }
            None => Err(CoreError::NotInCart(product_id.to_string())),
        }
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of a product in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.product.id == product_id)
            .map(|l| l.quantity)
            .sum()
    }

    /// Consolidated quantities per product id.
    ///
    /// Lines deserialized from the register are not trusted to be unique,
    /// so duplicates are summed here.
    pub fn quantities(&self) -> BTreeMap<String, i64> {
        let mut out = BTreeMap::new();
        for line in &self.lines {
            *out.entry(line.product.id.clone()).or_insert(0) += line.quantity;
        }
        out
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity over all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Expands every line into billable items.
    pub fn billable_items(&self) -> Vec<BillableItem> {
        self.lines.iter().flat_map(CartLine::billable_items).collect()
    }

    /// Cart total after package pricing, before any redemption.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

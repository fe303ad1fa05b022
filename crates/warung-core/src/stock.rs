//! # Stock Reconciler
//!
//! Computes the signed inventory deltas of a sale version.
//!
//! ## Edit = Reverse, Then Reapply
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  committed version:  P × 5   (stock was decremented by 5)               │
//! │  new version:        P × 2                                              │
//! │                                                                         │
//! │  step 1 reversal:    P +5                                               │
//! │  step 2 consumption: P -2                                               │
//! │                      ─────                                              │
//! │  net:                P +3   (3 units back on the shelf)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The plan keeps both steps. The database applies them in order so a
//! reversal can never be skipped by a clever diff.

use std::collections::BTreeMap;

use crate::pricing::BillableItem;

/// Signed quantity per product id. Negative consumes stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockDeltas(BTreeMap<String, i64>);

impl StockDeltas {
    /// Deltas that consume the units of the given billable items.
    pub fn consumption<'a>(items: impl IntoIterator<Item = &'a BillableItem>) -> Self {
        let mut deltas = StockDeltas::default();
        for item in items {
            deltas.add(&item.product_id, -item.quantity);
        }
        deltas
    }

    /// Deltas that return previously committed `(product_id, quantity)` pairs.
    pub fn reversal<'a>(committed: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let mut deltas = StockDeltas::default();
        for (product_id, quantity) in committed {
            deltas.add(product_id, quantity);
        }
        deltas
    }

    /// Accumulates a delta for a product.
    pub fn add(&mut self, product_id: &str, delta: i64) {
        *self.0.entry(product_id.to_string()).or_insert(0) += delta;
    }

    /// Delta for one product (0 if untouched).
    pub fn get(&self, product_id: &str) -> i64 {
        self.0.get(product_id).copied().unwrap_or(0)
    }

    /// Iterates `(product_id, delta)`, skipping zero entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0
            .iter()
            .filter(|(_, d)| **d != 0)
            .map(|(id, d)| (id.as_str(), *d))
    }

    /// True when no product moves.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Ordered stock mutations for one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPlan {
    /// Applied first: returns what the previous version took.
    pub reversal: StockDeltas,
    /// Applied second: takes what the new version sells.
    pub consumption: StockDeltas,
}

impl StockPlan {
    /// Plan for a first-time sale.
    pub fn for_create(items: &[BillableItem]) -> Self {
        StockPlan {
            reversal: StockDeltas::default(),
            consumption: StockDeltas::consumption(items),
        }
    }

    /// Plan for an edit: full reversal of `previous`, then the new items.
    pub fn for_edit<'a>(
        previous: impl IntoIterator<Item = (&'a str, i64)>,
        items: &[BillableItem],
    ) -> Self {
        StockPlan {
            reversal: StockDeltas::reversal(previous),
            consumption: StockDeltas::consumption(items),
        }
    }

    /// Plan that only returns stock (sale cancelled).
    pub fn for_cancel<'a>(previous: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        StockPlan {
            reversal: StockDeltas::reversal(previous),
            consumption: StockDeltas::default(),
        }
    }

    /// Net effect per product once both steps ran.
    pub fn net(&self) -> StockDeltas {
        let mut net = self.reversal.clone();
        for (id, d) in self.consumption.iter() {
            net.add(id, d);
        }
        net
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

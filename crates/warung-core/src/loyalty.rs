//! # Loyalty Ledger
//!
//! Points earned on a completed sale and points spent against it.
//!
//! ## Rates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EARN:   1 point per EARN_RATE (1000) units of the FINAL total          │
//! │  REDEEM: 1 point = 1 currency unit off the cart total                   │
//! │                                                                         │
//! │  cart total 10.000, balance 3.000, redeem requested                     │
//! │    redeemed    = min(3.000, 10.000)  = 3.000 points                     │
//! │    final total = 10.000 - 3.000      = 7.000                            │
//! │    earned      = floor(7.000 / 1000) = 7 points                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two rates are deliberately asymmetric and kept as they are.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Currency units spent per point earned.
pub const EARN_RATE: i64 = 1_000;

/// Points earned for a final (post-redemption) total.
pub fn points_earned(final_total: Money) -> i64 {
    final_total.units().max(0) / EARN_RATE
}

/// Points that can be spent against `cart_total`.
///
/// Zero when redemption is not requested or nobody is attached to the sale.
pub fn redeemable_amount(balance: Option<i64>, cart_total: Money, requested: bool) -> i64 {
    match balance {
        Some(points) if requested => points.max(0).min(cart_total.units().max(0)),
        _ => 0,
    }
}

/// Outcome of applying redemption to a cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Redemption {
    pub points_redeemed: i64,
    pub final_total: Money,
    pub points_earned: i64,
}

impl Redemption {
    /// Applies redemption and computes the points earned on what is left.
    ///
    /// `balance` is `None` when no customer is attached; points are then
    /// neither spent nor earned.
    pub fn compute(balance: Option<i64>, cart_total: Money, requested: bool) -> Self {
        let points_redeemed = redeemable_amount(balance, cart_total, requested);
        let final_total = cart_total - Money::from_units(points_redeemed);
        let points_earned = if balance.is_some() {
            points_earned(final_total)
        } else {
            0
        };

        Redemption {
            points_redeemed,
            final_total,
            points_earned,
        }
    }
}

/// Points one committed sale version moved on one customer's balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsChange {
    pub customer_id: String,
    pub earned: i64,
    pub redeemed: i64,
}

impl PointsChange {
    /// Net change applied to the balance when this version is committed.
    pub fn delta(&self) -> i64 {
        self.earned - self.redeemed
    }

    /// Net change that undoes this version.
    pub fn reversal(&self) -> i64 {
        -self.delta()
    }
}

/// Point movements of one commit: the old version reversed, the new applied.
///
/// Unlike stock, points are settled as one net delta per customer. A
/// customer who already spent points earned by the old version must not
/// fail an edit that earns them right back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsPlan {
    pub reversal: Option<PointsChange>,
    pub application: Option<PointsChange>,
}

impl PointsPlan {
    /// Net balance change per customer id, zero entries dropped.
    pub fn net(&self) -> BTreeMap<String, i64> {
        let mut net = BTreeMap::new();
        if let Some(old) = &self.reversal {
            *net.entry(old.customer_id.clone()).or_insert(0) += old.reversal();
        }
        if let Some(new) = &self.application {
            *net.entry(new.customer_id.clone()).or_insert(0) += new.delta();
        }
        net.retain(|_, d| *d != 0);
        net
    }
}

/// Balance available for redemption while editing a sale.
///
/// The old version of the same sale is reversed first, so its redeemed
/// points come back and its earned points go away.
pub fn balance_after_reversal(balance: i64, old: Option<&PointsChange>, customer_id: &str) -> i64 {
    match old {
        Some(change) if change.customer_id == customer_id => balance + change.reversal(),
        _ => balance,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_earned_floors() {
        assert_eq!(points_earned(Money::from_units(999)), 0);
        assert_eq!(points_earned(Money::from_units(1_000)), 1);
        assert_eq!(points_earned(Money::from_units(50_000)), 50);
        assert_eq!(points_earned(Money::from_units(7_999)), 7);
        assert_eq!(points_earned(Money::from_units(-5_000)), 0);
    }

    #[test]
    fn test_redeem_against_larger_total() {
        let r = Redemption::compute(Some(3_000), Money::from_units(10_000), true);
        assert_eq!(r.points_redeemed, 3_000);
        assert_eq!(r.final_total, Money::from_units(7_000));
        assert_eq!(r.points_earned, 7);
    }

    #[test]
    fn test_redeem_capped_at_cart_total() {
        let r = Redemption::compute(Some(25_000), Money::from_units(10_000), true);
        assert_eq!(r.points_redeemed, 10_000);
        assert_eq!(r.final_total, Money::zero());
        assert_eq!(r.points_earned, 0);
    }

    #[test]
    fn test_not_requested_spends_nothing() {
        let r = Redemption::compute(Some(3_000), Money::from_units(10_000), false);
        assert_eq!(r.points_redeemed, 0);
        assert_eq!(r.final_total, Money::from_units(10_000));
        assert_eq!(r.points_earned, 10);
    }

    #[test]
    fn test_no_customer_is_silent_zero() {
        let r = Redemption::compute(None, Money::from_units(10_000), true);
        assert_eq!(r.points_redeemed, 0);
        assert_eq!(r.final_total, Money::from_units(10_000));
        assert_eq!(r.points_earned, 0);
    }

    #[test]
    fn test_balance_after_reversal_same_customer_only() {
        let old = PointsChange {
            customer_id: "c1".into(),
            earned: 7,
            redeemed: 3_000,
        };
        assert_eq!(old.delta(), -2_993);
        assert_eq!(balance_after_reversal(100, Some(&old), "c1"), 3_093);
        assert_eq!(balance_after_reversal(100, Some(&old), "c2"), 100);
        assert_eq!(balance_after_reversal(100, None, "c1"), 100);
    }

    #[test]
    fn test_plan_nets_same_customer() {
        let plan = PointsPlan {
            reversal: Some(PointsChange {
                customer_id: "c1".into(),
                earned: 7,
                redeemed: 0,
            }),
            application: Some(PointsChange {
                customer_id: "c1".into(),
                earned: 7,
                redeemed: 0,
            }),
        };
        assert!(plan.net().is_empty());
    }

    #[test]
    fn test_plan_moves_between_customers() {
        let plan = PointsPlan {
            reversal: Some(PointsChange {
                customer_id: "old".into(),
                earned: 5,
                redeemed: 0,
            }),
            application: Some(PointsChange {
                customer_id: "new".into(),
                earned: 2,
                redeemed: 100,
            }),
        };
        let net = plan.net();
        assert_eq!(net.get("old"), Some(&-5));
        assert_eq!(net.get("new"), Some(&-98));
    }
}

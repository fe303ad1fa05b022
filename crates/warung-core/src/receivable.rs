//! # Receivable Manager
//!
//! Decides whether a committed sale leaves a debt behind, and how much.
//!
//! ```text
//!   debt-like method + customer ──► Receivable(amount = total, pending)
//!   cash-like, paid < total + customer ──► Receivable(amount = total - paid)
//!   anything else ──► no Receivable
//! ```
//!
//! Validation rejects a cash-like underpayment and a debt sale without a
//! customer, so in practice only the first row produces a receivable.

use chrono::{Duration, NaiveDate};

use crate::money::Money;

/// What the register settled for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Amount recorded as paid on the sale header.
    pub paid: Money,
    /// Change handed back.
    pub change: Money,
    /// Outstanding balance, if a receivable is owed.
    pub outstanding: Option<Money>,
}

/// Settles a sale total against the tendered amount.
///
/// For debt-like methods the tendered amount is ignored: the whole total is
/// owed, `paid` is recorded as the total and no change is given.
pub fn settle(total: Money, tendered: Money, is_debt: bool, has_customer: bool) -> Settlement {
    if is_debt {
        return Settlement {
            paid: total,
            change: Money::zero(),
            outstanding: if has_customer && total.is_positive() {
                Some(total)
            } else {
                None
            },
        };
    }

    let outstanding = total.saturating_sub_zero(tendered);
    Settlement {
        paid: tendered,
        change: tendered.saturating_sub_zero(total),
        outstanding: if has_customer && outstanding.is_positive() {
            Some(outstanding)
        } else {
            None
        },
    }
}

/// Due date of a receivable: explicit date, or transaction date + term.
pub fn due_date(transaction_date: NaiveDate, explicit: Option<NaiveDate>, term_days: u32) -> NaiveDate {
    explicit.unwrap_or_else(|| transaction_date + Duration::days(i64::from(term_days)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debt_sale_owes_full_total() {
        let s = settle(Money::from_units(50_000), Money::from_units(20_000), true, true);
        assert_eq!(s.paid, Money::from_units(50_000));
        assert_eq!(s.change, Money::zero());
        assert_eq!(s.outstanding, Some(Money::from_units(50_000)));
    }

    #[test]
    fn test_fully_paid_has_no_receivable() {
        let s = settle(Money::from_units(12_000), Money::from_units(20_000), false, true);
        assert_eq!(s.paid, Money::from_units(20_000));
        assert_eq!(s.change, Money::from_units(8_000));
        assert_eq!(s.outstanding, None);
    }

    #[test]
    fn test_underpaid_with_customer_owes_difference() {
        let s = settle(Money::from_units(12_000), Money::from_units(10_000), false, true);
        assert_eq!(s.outstanding, Some(Money::from_units(2_000)));
        assert_eq!(s.change, Money::zero());
    }

    #[test]
    fn test_no_customer_no_receivable() {
        let s = settle(Money::from_units(12_000), Money::from_units(10_000), false, false);
        assert_eq!(s.outstanding, None);
    }

    #[test]
    fn test_fully_redeemed_debt_sale_owes_nothing() {
        let s = settle(Money::zero(), Money::zero(), true, true);
        assert_eq!(s.outstanding, None);
    }

    #[test]
    fn test_due_date_defaults_to_term() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(due_date(d, None, 30), NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());

        let explicit = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        assert_eq!(due_date(d, Some(explicit), 30), explicit);
    }
}

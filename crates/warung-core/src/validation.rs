//! # Validation Module
//!
//! Field validators and the draft validation of a sale.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Register UI                                                  │
//! │  └── Immediate feedback (empty fields, obvious typos)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field validators (quantity, names, prices, ids)                   │
//! │  └── validate_draft(): the rules a sale must pass before commit        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (points >= 0)                           │
//! │  ├── guarded UPDATEs inside the unit of work                           │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Draft Rules (checked in this order)
//! 1. Cart is not empty
//! 2. Every line fits in the available stock
//! 3. Transaction date is set
//! 4. A payment method is selected
//! 5. A debt-like method has a customer (picked, or typed as free text)
//! 6. A cash-like method is paid in full
//! 7. A typed free-text customer name is not blank

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewCustomer, PaymentMethod};
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Example
/// ```rust
/// use warung_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Indomie Goreng").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name)
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_name("customer name", name)
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use warung_core::money::Money;
/// use warung_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_units(3_500)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_units(-1)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates package pricing: both set, or neither.
pub fn validate_package(package_price: Option<Money>, package_qty: i64) -> ValidationResult<()> {
    if package_qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "package quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    match package_price {
        Some(price) => {
            validate_price(price)?;
            if package_qty < 2 {
                return Err(ValidationError::InvalidFormat {
                    field: "package quantity".to_string(),
                    reason: "a package holds at least 2 units".to_string(),
                });
            }
            Ok(())
        }
        None => Ok(()),
    }
}

// =============================================================================
// Draft Validation
// =============================================================================

/// Stock check for one consolidated cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCheck {
    pub product_name: String,
    pub requested: i64,
    /// Current stock plus whatever the edited sale already holds.
    pub available: i64,
}

/// Everything draft validation looks at, already resolved by the caller.
#[derive(Debug, Clone)]
pub struct DraftCheck<'a> {
    pub lines: Vec<LineCheck>,
    pub transaction_date: Option<NaiveDate>,
    pub payment_method: Option<&'a PaymentMethod>,
    /// An existing customer is attached.
    pub has_customer: bool,
    /// Free-text customer typed at the register.
    pub new_customer: Option<&'a NewCustomer>,
    pub paid: Money,
    /// Amount due after redemption.
    pub final_total: Money,
}

/// Runs the draft rules in order and returns the first failure.
pub fn validate_draft(draft: &DraftCheck<'_>) -> ValidationResult<()> {
    if draft.lines.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    for line in &draft.lines {
        validate_quantity(line.requested)?;
        if line.requested > line.available {
            return Err(ValidationError::InsufficientStock {
                product: line.product_name.clone(),
                requested: line.requested,
                available: line.available.max(0),
            });
        }
    }

    if draft.transaction_date.is_none() {
        return Err(ValidationError::required("transaction date"));
    }

    let method = draft
        .payment_method
        .ok_or_else(|| ValidationError::required("payment method"))?;

    if method.is_debt() {
        if !draft.has_customer {
            match draft.new_customer {
                None => return Err(ValidationError::CustomerRequiredForDebt),
                Some(c) => validate_customer_name(&c.name)?,
            }
        }
    } else if draft.paid < draft.final_total {
        return Err(ValidationError::InsufficientPayment {
            paid: draft.paid,
            due: draft.final_total,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

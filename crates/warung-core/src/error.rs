//! # Error Types
//!
//! Domain-specific error types for warung-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  warung-core errors (this file)                                        │
//! │  ├── CoreError        - Cart operation failures                        │
//! │  └── ValidationError  - Draft validation failures (user-facing)        │
//! │                                                                         │
//! │  warung-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  warung-engine errors                                                  │
//! │  └── SaleError        - Validation | NotFound | Consistency            │
//! │                                                                         │
//! │  Flow: ValidationError ──► SaleError::Validation ──► Register UI       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, quantities)
//! 3. Messages are shown to the cashier verbatim

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and domain operation errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product is not a line of the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while a sale is being validated; no ledger has been touched yet,
/// so the register simply stays in draft and shows the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A line asks for more than the shelf holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: Beras 5kg × 12
    ///      │
    ///      ▼
    /// Stock check: available = 9
    ///      │
    ///      ▼
    /// "Insufficient stock for Beras 5kg: requested 12, available 9"
    /// ```
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    /// A debt sale needs someone to owe the money.
    #[error("A customer is required for a debt sale")]
    CustomerRequiredForDebt,

    /// Tendered amount does not cover the amount due.
    #[error("Insufficient payment: paid {paid}, due {due}")]
    InsufficientPayment { paid: Money, due: Money },

    /// Cancelling would take back points the customer already spent.
    #[error("Customer {customer} has {balance} points, {required} are needed to reverse this sale")]
    PointsAlreadySpent {
        customer: String,
        balance: i64,
        required: i64,
    },
}

impl ValidationError {
    /// Creates a `Required` error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

//! # warung-core: Pure Business Logic for the Sale Transaction Engine
//!
//! This crate holds every rule the engine applies to a sale, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Warung POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Register UI (out of scope)                       │   │
//! │  │    Catalog ──► Cart ──► Payment ──► Receipt                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SaleInput                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               warung-engine (SaleEngine)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ warung-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   pricing ─► cart ─► loyalty ─► stock ─► receivable             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                warung-db (Database Layer)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, Receivable, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Package vs. unit pricing of a cart line
//! - [`cart`] - Consolidated cart lines and totals
//! - [`loyalty`] - Points earned and redeemed
//! - [`stock`] - Signed inventory deltas for create and edit
//! - [`receivable`] - Whether a sale leaves an outstanding debt
//! - [`validation`] - Field validators and draft validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use warung_core::money::Money;
//! use warung_core::pricing::resolve;
//! use warung_core::types::Product;
//!
//! let mut product = Product::new("Teh Botol", Money::from_units(10));
//! product.package_price = Some(Money::from_units(40));
//! product.package_qty = 5;
//!
//! let items = resolve(&product, 12);
//! assert_eq!(items.len(), 2);
//! assert_eq!(items[0].subtotal, Money::from_units(80));
//! assert_eq!(items[1].subtotal, Money::from_units(20));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod loyalty;
pub mod money;
pub mod pricing;
pub mod receivable;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{BillableItem, PriceKind};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct product lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 200;

/// Maximum quantity of a single product line.
///
/// ## Business Reason
/// Catches typos at the register (10000 instead of 100) before they reach
/// the stock ledger.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Payment methods whose name contains this keyword defer payment and
/// create a receivable. Matched case-insensitively.
pub const DEBT_KEYWORD: &str = "hutang";

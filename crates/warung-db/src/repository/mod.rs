//! # Repository Module
//!
//! Database repository implementations for Warung POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways Into the Same SQL                           │
//! │                                                                         │
//! │  db.sales().get_by_id(id)             uow.sale(id)                     │
//! │        │  (&SqlitePool)                     │  (&mut Transaction)       │
//! │        └──────────────┐   ┌─────────────────┘                          │
//! │                       ▼   ▼                                             │
//! │              sale::select_by_id(exec, id)                              │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │                 SQLite Database                                        │
//! │                                                                         │
//! │  Every statement is written once, generic over the sqlx executor,      │
//! │  so the unit of work never diverges from the pool-based reads.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog, search, restock
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers and points
//! - [`PaymentMethodRepository`](payment_method::PaymentMethodRepository) - Payment methods
//! - [`SaleRepository`](sale::SaleRepository) - Sale headers and line items
//! - [`ReceivableRepository`](receivable::ReceivableRepository) - Customer debt

pub mod customer;
pub mod payment_method;
pub mod product;
pub mod receivable;
pub mod sale;

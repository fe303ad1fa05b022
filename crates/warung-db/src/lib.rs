//! # warung-db: Database Layer for Warung POS
//!
//! SQLite storage for the catalog, customers, sales and receivables, plus
//! the unit of work the sale engine commits through.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Warung POS Data Flow                             │
//! │                                                                         │
//! │  SaleEngine (warung-engine)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     warung-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CustomerRepo  │    │ 001_initial_ │  │   │
//! │  │   │ begin() ──────┼──► │ SaleRepo ...  │    │   schema.sql │  │   │
//! │  │   │  UnitOfWork   │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`unit_of_work`] - Atomic transaction handle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/warung.db")).await?;
//!
//! let products = db.products().search("kopi", 20).await?;
//!
//! let mut uow = db.begin().await?;
//! // ... ledger writes ...
//! uow.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;

pub use repository::customer::CustomerRepository;
pub use repository::payment_method::PaymentMethodRepository;
pub use repository::product::ProductRepository;
pub use repository::receivable::ReceivableRepository;
pub use repository::sale::SaleRepository;

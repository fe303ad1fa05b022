//! # warung-engine: Sale Transaction Orchestrator
//!
//! Validates a draft sale and commits it as one atomic set of ledger
//! mutations: sale rows, stock, receivables and loyalty points.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Register UI ──► SaleEngine (THIS CRATE) ──► warung-db UnitOfWork       │
//! │                     │                              │                    │
//! │                     ▼                              ▼                    │
//! │               warung-core                    SQLite (WAL)               │
//! │   pricing · cart · loyalty · stock · receivable · validation            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - `SaleEngine`: create, edit, cancel, settle
//! - [`catalog`] - Product, customer and payment-method maintenance
//! - [`config`] - `warung.toml` plus environment overrides
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - `SaleError`, `CatalogError`, `ConfigError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_engine::{telemetry, EngineConfig, SaleEngine};
//! use warung_db::Database;
//!
//! let config = EngineConfig::load(None)?;
//! telemetry::init_from_config(&config)?;
//!
//! let db = Database::new(config.db_config()?).await?;
//! let engine = SaleEngine::new(db, &config);
//! let sale_id = engine.create_sale(&input).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;

pub use catalog::Catalog;
pub use config::EngineConfig;
pub use engine::{SaleEngine, SaleMode, SaleReceipt, SaleState, ValidatedSale};
pub use error::{CatalogError, ConfigError, SaleError, SaleResult};

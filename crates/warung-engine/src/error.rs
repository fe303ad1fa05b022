//! # Engine Error Types
//!
//! What the register sees when a sale operation fails.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SaleError                                       │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Validation    │  │    NotFound     │  │     Consistency         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  shown verbatim │  │  edit target or │  │  "transaction failed,   │ │
//! │  │  stay in Draft  │  │  reference gone │  │   try again"            │ │
//! │  │  nothing written│  │  flow aborted   │  │  unit of work rolled    │ │
//! │  │                 │  │                 │  │  back, detail logged    │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use warung_core::ValidationError;
use warung_db::DbError;

/// Result type alias for sale operations.
pub type SaleResult<T> = Result<T, SaleError>;

/// Failure of a sale create, edit, cancel or settlement.
#[derive(Debug, Error)]
pub enum SaleError {
    /// The draft breaks a rule; the message is meant for the cashier.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The sale being edited, or something the draft points at, does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The commit failed after validation passed. Nothing was applied.
    #[error("transaction failed, try again")]
    Consistency(#[source] DbError),
}

impl SaleError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        SaleError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True for failures the cashier can fix by editing the draft.
    pub fn is_validation(&self) -> bool {
        matches!(self, SaleError::Validation(_))
    }
}

/// Reads outside the unit of work keep their own not-found meaning; anything
/// else means the store could not be trusted for this attempt.
impl From<DbError> for SaleError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => SaleError::NotFound { entity, id },
            other => SaleError::Consistency(other),
        }
    }
}

// =============================================================================
// Catalog Errors
// =============================================================================

/// Result type alias for catalog maintenance.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure of a product, customer or payment-method maintenance operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Failed to read or write the config file.
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No platform directory could be determined for a default path.
    #[error("Could not determine the {0} directory")]
    NoProjectDir(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_message_is_generic() {
        let err = SaleError::Consistency(DbError::conflict("Product", "p1", "stock would go negative"));
        assert_eq!(err.to_string(), "transaction failed, try again");

        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Conflict on Product p1: stock would go negative")
        );
    }

    #[test]
    fn test_validation_is_shown_verbatim() {
        let err: SaleError = ValidationError::EmptyCart.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn test_db_not_found_stays_not_found() {
        let err: SaleError = DbError::not_found("Sale", "s1").into();
        assert!(matches!(err, SaleError::NotFound { .. }));
        assert_eq!(err.to_string(), "Sale not found: s1");

        let err: SaleError = DbError::PoolExhausted.into();
        assert!(matches!(err, SaleError::Consistency(_)));
    }
}

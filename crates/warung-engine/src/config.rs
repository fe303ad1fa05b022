//! # Engine Configuration
//!
//! Settings for the register: where the database lives, the store name,
//! the receivable term and the log filter.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WARUNG_DB_PATH=/data/warung.db                                     │
//! │     WARUNG_RECEIVABLE_TERM_DAYS=14                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/warung-pos/warung.toml (Linux)                           │
//! │     ~/Library/Application Support/com.warung.pos/warung.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # warung.toml
//! [database]
//! path = "/var/lib/warung/warung.db"
//! max_connections = 5
//!
//! [store]
//! name = "Warung Bu Sri"
//!
//! [ledger]
//! receivable_term_days = 30
//!
//! [logging]
//! filter = "info,warung=debug,sqlx=warn"
//! ```
//!
//! The debt keyword and the points earn rate are constants of warung-core,
//! not settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use warung_db::DbConfig;

use crate::error::{ConfigError, ConfigResult};

/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "info,warung=debug,sqlx=warn";

const CONFIG_FILE: &str = "warung.toml";
const DB_FILE: &str = "warung.db";

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. `None` means the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// `[store]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Printed at the top of every receipt.
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "Warung".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
        }
    }
}

/// `[ledger]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Days after the transaction date a receivable falls due.
    #[serde(default = "default_term_days")]
    pub receivable_term_days: u32,
}

fn default_term_days() -> u32 {
    30
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            receivable_term_days: default_term_days(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives; `RUST_LOG` still wins at startup.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Engine Config
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (explicit path, else `warung.toml` in the config dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a config file without env overrides or validation.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoProjectDir("config"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }

        if self.ledger.receivable_term_days > 365 {
            return Err(ConfigError::Invalid(format!(
                "ledger.receivable_term_days must be at most 365, got {}",
                self.ledger.receivable_term_days
            )));
        }

        if tracing_subscriber::EnvFilter::try_new(&self.logging.filter).is_err() {
            return Err(ConfigError::Invalid(format!(
                "logging.filter is not a valid filter: {}",
                self.logging.filter
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("WARUNG_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("WARUNG_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(days) = lookup("WARUNG_RECEIVABLE_TERM_DAYS") {
            match days.parse::<u32>() {
                Ok(d) => {
                    debug!(days = d, "Overriding receivable term from environment");
                    self.ledger.receivable_term_days = d;
                }
                Err(_) => warn!(value = %days, "Ignoring invalid WARUNG_RECEIVABLE_TERM_DAYS"),
            }
        }

        if let Some(filter) = lookup("WARUNG_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Returns the default database file path.
    pub fn default_database_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().join(DB_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved database file path.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Self::default_database_path().ok_or(ConfigError::NoProjectDir("data")),
        }
    }

    /// Database settings for [`warung_db::Database::new`].
    ///
    /// Creates the parent directory of the database file if needed.
    pub fn db_config(&self) -> ConfigResult<DbConfig> {
        let path = self.database_path()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(DbConfig::new(path).max_connections(self.database.max_connections))
    }

    pub fn receivable_term_days(&self) -> u32 {
        self.ledger.receivable_term_days
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "warung", "pos")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn scratch_file(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("warung-{}-{}-{}", std::process::id(), nanos, name))
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.store.name, "Warung");
        assert_eq!(config.ledger.receivable_term_days, 30);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [store]
            name = "Warung Bu Sri"

            [ledger]
            receivable_term_days = 14
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Warung Bu Sri");
        assert_eq!(config.ledger.receivable_term_days, 14);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.path, None);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WARUNG_DB_PATH", "/tmp/other.db"),
            ("WARUNG_STORE_NAME", "Toko Makmur"),
            ("WARUNG_RECEIVABLE_TERM_DAYS", "7"),
            ("WARUNG_LOG", "warn"),
        ]
        .into_iter()
        .collect();

        let mut config = EngineConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(config.store.name, "Toko Makmur");
        assert_eq!(config.ledger.receivable_term_days, 7);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_invalid_term_override_is_ignored() {
        let mut config = EngineConfig::default();
        config.apply_overrides(|k| {
            (k == "WARUNG_RECEIVABLE_TERM_DAYS").then(|| "thirty".to_string())
        });
        assert_eq!(config.ledger.receivable_term_days, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.store.name = "  ".into();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.ledger.receivable_term_days = 400;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load_from_file() {
        let path = scratch_file("warung.toml");
        let mut config = EngineConfig::default();
        config.store.name = "Warung Pojok".into();
        config.database.path = Some(PathBuf::from("/tmp/pojok.db"));

        config.save(Some(path.clone())).unwrap();
        let loaded = EngineConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = scratch_file("broken.toml");
        std::fs::write(&path, "[ledger]\nreceivable_term_days = \"soon\"\n").unwrap();
        let err = EngineConfig::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let mut config = EngineConfig::default();
        config.database.path = Some(PathBuf::from("/srv/warung.db"));
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/srv/warung.db")
        );
    }
}

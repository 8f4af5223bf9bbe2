//! # IAM Config - Configuration Management
//!
//! Handles configuration loading from files, environment variables, and defaults.
//!
//! ## Environment Variable Format
//!
//! Environment variables use the `IAM__` prefix with double underscores
//! separating nested keys:
//!
//! ```text
//! IAM__ACCOUNTS__MAX_ACCOUNT_LIMIT=500
//! IAM__ACCOUNTS__INTERNAL_ACCOUNTS=s3-internal,backup
//! IAM__ACCOUNTS__ADMIN_LOGIN_ID=AKIAADMIN
//! ```

#![deny(unsafe_code)]

use std::path::Path;

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

pub mod provider;
pub mod validation;

pub use provider::{AccountLimits, LimitsProvider, ReloadError, SharedConfig};
pub use validation::{ValidationError, ValidationResult, validate};

/// Root configuration of the account service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default tracing filter directive
    #[serde(default = "default_logging")]
    pub logging: String,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub accounts: AccountsConfig,

    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
}

/// Account admission and authorization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Maximum number of live accounts
    #[serde(default = "default_max_account_limit")]
    pub max_account_limit: usize,

    /// Account names exempt from the capacity check
    #[serde(default)]
    pub internal_accounts: Vec<String>,

    /// Access key id of the administrative login allowed to delete any account
    #[serde(default)]
    pub admin_login_id: Option<String>,

    /// Canonical id probes before giving up, collisions and store faults included
    #[serde(default = "default_max_attempts")]
    pub canonical_id_max_attempts: u32,

    /// Probes for a free generated access key id
    #[serde(default = "default_max_attempts")]
    pub access_key_max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

fn default_logging() -> String {
    "info".to_string()
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_max_account_limit() -> usize {
    1000
}

fn default_max_attempts() -> u32 {
    10
}

fn default_notifications_enabled() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: default_backend() }
    }
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            max_account_limit: default_max_account_limit(),
            internal_accounts: Vec::new(),
            admin_login_id: None,
            canonical_id_max_attempts: default_max_attempts(),
            access_key_max_attempts: default_max_attempts(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: default_notifications_enabled() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: default_logging(),
            storage: StorageConfig::default(),
            accounts: AccountsConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

/// Load configuration from file and environment
///
/// Defaults come from the serde annotations, an optional file overrides them,
/// and `IAM__`-prefixed environment variables take precedence over both.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let builder = ConfigBuilder::builder().add_source(File::from(path.as_ref()).required(false));

    let builder = builder.add_source(
        Environment::with_prefix("IAM")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("accounts.internal_accounts")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

/// Load configuration, falling back to defaults when loading fails
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
    match load(path.as_ref()) {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully from {:?}", path.as_ref());
            config
        },
        Err(e) => {
            tracing::warn!("Failed to load config from {:?}: {}. Using defaults.", path.as_ref(), e);
            Config::default()
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging, "info");
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.accounts.max_account_limit, 1000);
        assert!(config.accounts.internal_accounts.is_empty());
        assert_eq!(config.accounts.canonical_id_max_attempts, 10);
        assert_eq!(config.accounts.access_key_max_attempts, 10);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = load("/nonexistent/iam.yaml").unwrap();
        assert_eq!(config.accounts.max_account_limit, 1000);
        assert_eq!(config.storage.backend, "memory");
    }

    #[test]
    fn test_load_from_yaml_file() {
        let file = yaml_file(
            r#"
logging: debug
accounts:
  max_account_limit: 5
  internal_accounts:
    - s3-internal
    - backup
notifications:
  enabled: false
"#,
        );

        let config = load(file.path()).unwrap();
        assert_eq!(config.logging, "debug");
        assert_eq!(config.accounts.max_account_limit, 5);
        assert_eq!(config.accounts.internal_accounts, vec!["s3-internal", "backup"]);
        assert!(!config.notifications.enabled);
        // Unset sections keep their defaults
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.accounts.canonical_id_max_attempts, 10);
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("IAM__ACCOUNTS__ADMIN_LOGIN_ID", "AKIAADMINFROMENV");
        let config = load("/nonexistent/iam.yaml").unwrap();
        std::env::remove_var("IAM__ACCOUNTS__ADMIN_LOGIN_ID");

        assert_eq!(config.accounts.admin_login_id.as_deref(), Some("AKIAADMINFROMENV"));
    }

    #[test]
    fn test_load_or_default_on_malformed_file() {
        let file = yaml_file("accounts: [not, a, map");
        let config = load_or_default(file.path());
        assert_eq!(config.accounts.max_account_limit, 1000);
    }
}

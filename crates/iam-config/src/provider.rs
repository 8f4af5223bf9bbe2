//! Call-time access to account limits
//!
//! The account service reads its limits at the start of every operation, so a
//! configuration swapped in between two calls is seen by the second one.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use config::ConfigError;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{Config, ValidationError, load, validate};

/// Snapshot of the limits that govern account operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLimits {
    pub max_account_limit: usize,
    pub internal_accounts: BTreeSet<String>,
    pub admin_login_id: Option<String>,
    pub canonical_id_max_attempts: u32,
    pub access_key_max_attempts: u32,
}

impl AccountLimits {
    /// Whether the account name bypasses the capacity check
    pub fn is_internal(&self, account_name: &str) -> bool {
        self.internal_accounts.contains(account_name)
    }

    /// Whether the access key id belongs to the administrative login
    pub fn is_admin_login(&self, access_key_id: &str) -> bool {
        self.admin_login_id.as_deref() == Some(access_key_id)
    }
}

impl Default for AccountLimits {
    fn default() -> Self {
        AccountLimits::from(&Config::default())
    }
}

impl From<&Config> for AccountLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_account_limit: config.accounts.max_account_limit,
            internal_accounts: config.accounts.internal_accounts.iter().cloned().collect(),
            admin_login_id: config.accounts.admin_login_id.clone(),
            canonical_id_max_attempts: config.accounts.canonical_id_max_attempts,
            access_key_max_attempts: config.accounts.access_key_max_attempts,
        }
    }
}

/// Source of account limits, consulted once per operation
#[async_trait]
pub trait LimitsProvider: Send + Sync {
    async fn account_limits(&self) -> AccountLimits;
}

#[async_trait]
impl LimitsProvider for AccountLimits {
    async fn account_limits(&self) -> AccountLimits {
        self.clone()
    }
}

/// Why a configuration reload was refused
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("no configuration path to reload from")]
    NoPath,

    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// Shared, replaceable configuration handle
#[derive(Clone)]
pub struct SharedConfig {
    config: Arc<RwLock<Config>>,
    config_path: Option<PathBuf>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self { config: Arc::new(RwLock::new(config)), config_path: None }
    }

    /// Create a handle that can later re-read `config_path`
    pub fn with_path(config_path: impl AsRef<Path>, config: Config) -> Self {
        Self { config: Arc::new(RwLock::new(config)), config_path: Some(config_path.as_ref().to_path_buf()) }
    }

    /// Get the current configuration
    pub async fn get(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Swap in a new configuration, returning the previous one
    pub async fn replace(&self, config: Config) -> Config {
        let mut guard = self.config.write().await;
        std::mem::replace(&mut *guard, config)
    }

    /// Re-read the configuration file.
    ///
    /// The current configuration is kept if the file fails to load or validate.
    pub async fn reload(&self) -> Result<(), ReloadError> {
        let Some(path) = self.config_path.as_ref() else {
            return Err(ReloadError::NoPath);
        };

        let new_config = load(path).inspect_err(|e| warn!(error = %e, "Configuration reload failed"))?;

        validate(&new_config)
            .inspect_err(|e| warn!(error = %e, "Reloaded configuration is invalid, keeping current"))?;

        self.replace(new_config).await;
        info!(path = ?path, "Configuration reloaded");
        Ok(())
    }
}

#[async_trait]
impl LimitsProvider for SharedConfig {
    async fn account_limits(&self) -> AccountLimits {
        AccountLimits::from(&*self.config.read().await)
    }
}

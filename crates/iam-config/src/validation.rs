//! Configuration validation
//!
//! Validates configuration values and ensures consistency

use thiserror::Error;

use crate::{AccountsConfig, Config, StorageConfig};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid log level: {0} (must be one of: trace, debug, info, warn, error)")]
    InvalidLogLevel(String),

    #[error("Invalid backend: {0} (must be: memory)")]
    InvalidBackend(String),

    #[error("Invalid attempt bound for {0}: must be > 0")]
    InvalidAttempts(&'static str),

    #[error("Internal account names must not be empty")]
    EmptyInternalAccount,

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate complete configuration
pub fn validate(config: &Config) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Err(e) = validate_logging(&config.logging) {
        errors.push(e);
    }

    if let Err(e) = validate_storage(&config.storage) {
        errors.push(e);
    }

    if let Err(e) = validate_accounts(&config.accounts) {
        errors.push(e);
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Validate the default log level
pub fn validate_logging(level: &str) -> ValidationResult<()> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::InvalidLogLevel(level.to_string())),
    }
}

pub fn validate_storage(config: &StorageConfig) -> ValidationResult<()> {
    match config.backend.as_str() {
        "memory" => Ok(()),
        _ => Err(ValidationError::InvalidBackend(config.backend.clone())),
    }
}

pub fn validate_accounts(config: &AccountsConfig) -> ValidationResult<()> {
    if config.canonical_id_max_attempts == 0 {
        return Err(ValidationError::InvalidAttempts("canonical_id_max_attempts"));
    }

    if config.access_key_max_attempts == 0 {
        return Err(ValidationError::InvalidAttempts("access_key_max_attempts"));
    }

    if config.internal_accounts.iter().any(|name| name.trim().is_empty()) {
        return Err(ValidationError::EmptyInternalAccount);
    }

    // A zero limit is legal: only internal accounts can then be created
    if config.max_account_limit == 0 {
        tracing::warn!("accounts.max_account_limit is 0; only internal accounts can be created");
    }

    Ok(())
}

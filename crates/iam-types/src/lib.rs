//! # IAM Types
//!
//! Shared type definitions for the IAM account service.
//!
//! This crate holds the directory entities (accounts, users, access keys, roles,
//! groups, policies), the organizational container kinds, the authenticated
//! requestor, and the store-level error type. Every other crate in the workspace
//! depends on it, so it stays free of behavior beyond simple constructors.

#![deny(unsafe_code)]

use thiserror::Error;

pub mod access_key;
pub mod account;
pub mod container;
pub mod directory;
pub mod requestor;
pub mod user;

pub use access_key::{AccessKey, AccessKeyStatus};
pub use account::{Account, AccountId, CanonicalId};
pub use container::ContainerKind;
pub use directory::{Group, Policy, Role};
pub use requestor::Requestor;
pub use user::{ROOT_USER_NAME, ROOT_USER_PATH, User};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by a directory store.
///
/// `DependentsRemain` is the only variant callers are expected to branch on: it is
/// how a container delete reports that subordinate objects still exist.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found")]
    NotFound,

    #[error("Conflict")]
    Conflict,

    #[error("Subordinate objects must be deleted first: {0}")]
    DependentsRemain(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether this error signals that an object still has dependents.
    pub fn is_dependents_remain(&self) -> bool {
        matches!(self, StoreError::DependentsRemain(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::DependentsRemain("ou=users".to_string());
        assert_eq!(err.to_string(), "Subordinate objects must be deleted first: ou=users");

        let err = StoreError::Database("connection reset".to_string());
        assert_eq!(err.to_string(), "Database error: connection reset");
    }

    #[test]
    fn test_dependents_remain_detection() {
        assert!(StoreError::DependentsRemain(String::new()).is_dependents_remain());
        assert!(!StoreError::NotFound.is_dependents_remain());
        assert!(!StoreError::Internal("x".into()).is_dependents_remain());
    }
}

//! Storage factory for creating backend instances
//!
//! Consumers ask for a [`DirectoryStore`] by backend name and never see the
//! concrete type.

use std::str::FromStr;
use std::sync::Arc;

use iam_types::StoreError;

use crate::memory::MemoryBackend;
use crate::{DirectoryStore, Result};

/// Storage backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendType {
    /// In-memory directory (for testing and development)
    #[default]
    Memory,
}

impl FromStr for BackendType {
    type Err = StoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(BackendType::Memory),
            _ => Err(StoreError::Internal(format!("Unknown backend type: {s}"))),
        }
    }
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Memory => "memory",
        }
    }
}

/// Configuration for the storage backend
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub backend: BackendType,
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self { backend: BackendType::Memory }
    }
}

/// Storage factory for creating backend instances
pub struct StorageFactory;

impl StorageFactory {
    /// Create a storage backend from configuration
    pub fn create(config: StorageConfig) -> Arc<dyn DirectoryStore> {
        match config.backend {
            BackendType::Memory => Arc::new(MemoryBackend::new()) as Arc<dyn DirectoryStore>,
        }
    }

    /// Create a storage backend from its configured name
    pub fn from_name(backend: &str) -> Result<Arc<dyn DirectoryStore>> {
        let backend = BackendType::from_str(backend)?;
        tracing::debug!(backend = backend.as_str(), "Creating directory store");
        Ok(Self::create(StorageConfig { backend }))
    }

    /// Create default memory backend
    pub fn memory() -> Arc<dyn DirectoryStore> {
        Self::create(StorageConfig::memory())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::AccountStore;

    #[test]
    fn test_backend_type_from_str() {
        assert_eq!(BackendType::from_str("memory").unwrap(), BackendType::Memory);
        assert_eq!(BackendType::from_str("MEMORY").unwrap(), BackendType::Memory);
        assert!(BackendType::from_str("ldap").is_err());
    }

    #[test]
    fn test_backend_type_as_str() {
        assert_eq!(BackendType::Memory.as_str(), "memory");
    }

    #[tokio::test]
    async fn test_factory_memory() {
        let store = StorageFactory::memory();
        assert!(store.find_all_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_factory_from_name() {
        let store = StorageFactory::from_name("memory").unwrap();
        assert!(store.find_account_by_name("s3test").await.unwrap().is_none());

        assert!(StorageFactory::from_name("invalid").is_err());
    }
}

//! Access Key Provisioner
//!
//! Creates access keys for users, either from generated material or from a
//! caller-supplied id/secret pair. Access key ids are unique across all
//! users; both modes verify that against the store.

use std::sync::Arc;

use iam_store::{AccessKeyStore, DirectoryStore};
use iam_types::{AccessKey, StoreError, User};

use crate::allocator::IdAllocator;
use crate::error::{AccountError, AccountResult, store_fault};

/// How the key for a new or reset root user is obtained
#[derive(Clone, PartialEq, Eq)]
pub enum KeyRequest {
    /// Allocate a fresh id and secret
    Generated,
    /// Use the given pair verbatim
    Supplied { access_key_id: String, secret_key: String },
}

impl std::fmt::Debug for KeyRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyRequest::Generated => f.write_str("Generated"),
            KeyRequest::Supplied { access_key_id, .. } => {
                f.debug_struct("Supplied").field("access_key_id", access_key_id).finish_non_exhaustive()
            },
        }
    }
}

pub struct AccessKeyProvisioner {
    store: Arc<dyn DirectoryStore>,
    allocator: Arc<dyn IdAllocator>,
    max_attempts: u32,
}

impl AccessKeyProvisioner {
    pub fn new(store: Arc<dyn DirectoryStore>, allocator: Arc<dyn IdAllocator>, max_attempts: u32) -> Self {
        Self { store, allocator, max_attempts }
    }

    /// Fail with `AccessKeyAlreadyExists` if the id is taken.
    ///
    /// Account creation calls this before writing anything so that a
    /// colliding request leaves no partial account behind.
    pub async fn ensure_available(&self, access_key_id: &str) -> AccountResult<()> {
        match self.store.find_access_key(access_key_id).await.map_err(store_fault("find access key"))? {
            Some(_) => {
                tracing::info!(access_key_id, "Requested access key id already exists");
                Err(AccountError::AccessKeyAlreadyExists)
            },
            None => Ok(()),
        }
    }

    /// Create and persist an access key for `user`
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id), level = "debug")]
    pub async fn provision(&self, user: &User, request: &KeyRequest) -> AccountResult<AccessKey> {
        let (key, supplied) = match request {
            KeyRequest::Generated => {
                let access_key_id = self.free_access_key_id().await?;
                (AccessKey::new(access_key_id, &user.id, self.allocator.secret_key()), false)
            },
            KeyRequest::Supplied { access_key_id, secret_key } => {
                (AccessKey::new(access_key_id, &user.id, secret_key), true)
            },
        };

        match self.store.save_access_key(&key).await {
            Ok(()) => {},
            // The id was free at lookup and got taken since
            Err(StoreError::Conflict) if supplied => return Err(AccountError::AccessKeyAlreadyExists),
            Err(StoreError::Conflict) => {
                tracing::error!(access_key_id = %key.id, "Generated access key id taken after lookup");
                return Err(AccountError::Internal(format!("generated access key id {} already in use", key.id)));
            },
            Err(e) => return Err(store_fault("save access key")(e)),
        }

        tracing::debug!(access_key_id = %key.id, "Access key provisioned");
        Ok(key)
    }

    async fn free_access_key_id(&self) -> AccountResult<String> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.allocator.access_key_id();
            if self.store.find_access_key(&candidate).await.map_err(store_fault("find access key"))?.is_none() {
                return Ok(candidate);
            }
            tracing::debug!(attempt, "Generated access key id already in use");
        }

        tracing::error!(max_attempts = self.max_attempts, "No free access key id");
        Err(AccountError::Internal(format!("no free access key id after {} attempts", self.max_attempts)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use iam_store::{AccountStore, MemoryBackend, UserStore};
    use iam_types::{Account, AccountId, CanonicalId};

    use super::*;
    use crate::allocator::RandomIdAllocator;

    async fn setup() -> (Arc<MemoryBackend>, User) {
        let store = Arc::new(MemoryBackend::new());
        let account = Account::new(AccountId("123456789012".into()), CanonicalId("can1234".into()), "s3test", "a@b.c");
        store.save_account(&account).await.unwrap();
        let root = User::root("AIDAROOT", &account.id, "s3test");
        store.save_user(&root).await.unwrap();
        (store, root)
    }

    fn provisioner(store: Arc<MemoryBackend>) -> AccessKeyProvisioner {
        AccessKeyProvisioner::new(store, Arc::new(RandomIdAllocator), 10)
    }

    #[tokio::test]
    async fn test_provision_generated_key() {
        let (store, root) = setup().await;
        let key = provisioner(store.clone()).provision(&root, &KeyRequest::Generated).await.unwrap();

        assert!(key.id.starts_with("AK"));
        assert_eq!(key.user_id, root.id);
        assert!(key.is_active());
        assert_eq!(store.find_access_key(&key.id).await.unwrap().unwrap(), key);
    }

    #[tokio::test]
    async fn test_provision_supplied_key_verbatim() {
        let (store, root) = setup().await;
        let request = KeyRequest::Supplied {
            access_key_id: "AKIASIASCustom".into(),
            secret_key: "htuspscae/123/custom".into(),
        };
        let key = provisioner(store).provision(&root, &request).await.unwrap();
        assert_eq!(key.id, "AKIASIASCustom");
        assert_eq!(key.secret, "htuspscae/123/custom");
    }

    #[tokio::test]
    async fn test_ensure_available_detects_existing_key() {
        let (store, root) = setup().await;
        store.save_access_key(&AccessKey::new("AKIASIASCustom", &root.id, "whatever-secret")).await.unwrap();

        let provisioner = provisioner(store);
        assert!(matches!(
            provisioner.ensure_available("AKIASIASCustom").await,
            Err(AccountError::AccessKeyAlreadyExists)
        ));
        assert!(provisioner.ensure_available("AKIAFREE").await.is_ok());
    }

    #[tokio::test]
    async fn test_supplied_key_conflict_on_save() {
        let (store, root) = setup().await;
        store.save_access_key(&AccessKey::new("AKIASIASCustom", "other-user", "whatever-secret")).await.unwrap();

        let request =
            KeyRequest::Supplied { access_key_id: "AKIASIASCustom".into(), secret_key: "htuspscae/123".into() };
        let result = provisioner(store).provision(&root, &request).await;
        assert!(matches!(result, Err(AccountError::AccessKeyAlreadyExists)));
    }

    #[test]
    fn test_key_request_debug_hides_secret() {
        let request = KeyRequest::Supplied { access_key_id: "AKIASIAS".into(), secret_key: "htuspscae/123".into() };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("AKIASIAS"));
        assert!(!rendered.contains("htuspscae"));
    }
}

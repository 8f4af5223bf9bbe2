//! Delete authorization
//!
//! Deleting an account requires holding the root user's access key, unless the
//! requestor signed with the configured administrative login.

use iam_config::AccountLimits;
use iam_store::{AccessKeyStore, DirectoryStore};
use iam_types::{Requestor, User};

use crate::error::{AccountError, AccountResult, store_fault};

/// Strategy used to authorize an account delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAuthorization {
    /// The requestor must have signed with one of the root user's keys
    RootKeyHolder,
    /// The requestor is the administrative login
    AdministrativeIdentity,
}

impl DeleteAuthorization {
    /// Pick the strategy for `requestor` under the current limits
    pub fn select(requestor: &Requestor, limits: &AccountLimits) -> Self {
        if limits.is_admin_login(&requestor.access_key_id) {
            DeleteAuthorization::AdministrativeIdentity
        } else {
            DeleteAuthorization::RootKeyHolder
        }
    }

    /// Check the requestor against the account's root user.
    ///
    /// Returns the root access key id that identifies the account in the
    /// delete notification.
    pub async fn authorize(
        &self,
        store: &dyn DirectoryStore,
        requestor: &Requestor,
        root: &User,
    ) -> AccountResult<String> {
        match self {
            DeleteAuthorization::RootKeyHolder => {
                let keys =
                    store.find_all_access_keys(&root.id).await.map_err(store_fault("find root access keys"))?;
                if keys.iter().any(|key| key.id == requestor.access_key_id) {
                    Ok(requestor.access_key_id.clone())
                } else {
                    tracing::warn!(
                        requestor = %requestor.user_id,
                        access_key_id = %requestor.access_key_id,
                        "Requestor does not hold the root access key"
                    );
                    Err(AccountError::Unauthorized)
                }
            },
            DeleteAuthorization::AdministrativeIdentity => {
                let key = store
                    .find_account_access_key(&root.id)
                    .await
                    .map_err(store_fault("find root primary access key"))?
                    .ok_or_else(|| {
                        tracing::error!(root_user = %root.id, "Root user has no access key");
                        AccountError::Internal("root user has no access key".to_string())
                    })?;
                tracing::info!(requestor = %requestor.user_id, "Delete authorized by administrative login");
                Ok(key.id)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use iam_store::{AccountStore, MemoryBackend, UserStore};
    use iam_types::{AccessKey, Account, AccountId, CanonicalId};

    use super::*;

    async fn setup(with_key: bool) -> (MemoryBackend, User) {
        let store = MemoryBackend::new();
        let account = Account::new(AccountId("123456789012".into()), CanonicalId("can1234".into()), "s3test", "a@b.c");
        store.save_account(&account).await.unwrap();
        let root = User::root("AIDAROOT", &account.id, "s3test");
        store.save_user(&root).await.unwrap();
        if with_key {
            store.save_access_key(&AccessKey::new("AKIASIAS", &root.id, "htuspscae/123")).await.unwrap();
        }
        (store, root)
    }

    fn limits_with_admin() -> AccountLimits {
        AccountLimits { admin_login_id: Some("AKIAADMIN".to_string()), ..Default::default() }
    }

    #[test]
    fn test_select_strategy() {
        let limits = limits_with_admin();
        let admin = Requestor::new("admin", "iam-admin", "AKIAADMIN");
        let owner = Requestor::new("AIDAROOT", "s3test", "AKIASIAS");

        assert_eq!(DeleteAuthorization::select(&admin, &limits), DeleteAuthorization::AdministrativeIdentity);
        assert_eq!(DeleteAuthorization::select(&owner, &limits), DeleteAuthorization::RootKeyHolder);
        assert_eq!(
            DeleteAuthorization::select(&admin, &AccountLimits::default()),
            DeleteAuthorization::RootKeyHolder
        );
    }

    #[tokio::test]
    async fn test_root_key_holder_authorized() {
        let (store, root) = setup(true).await;
        let requestor = Requestor::new(&root.id, "s3test", "AKIASIAS");
        let key_id = DeleteAuthorization::RootKeyHolder.authorize(&store, &requestor, &root).await.unwrap();
        assert_eq!(key_id, "AKIASIAS");
    }

    #[tokio::test]
    async fn test_other_key_is_unauthorized() {
        let (store, root) = setup(true).await;
        let requestor = Requestor::new("AIDAOTHER", "other", "AKIAOTHER");
        let result = DeleteAuthorization::RootKeyHolder.authorize(&store, &requestor, &root).await;
        assert!(matches!(result, Err(AccountError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_admin_resolves_root_key() {
        let (store, root) = setup(true).await;
        let requestor = Requestor::new("admin", "iam-admin", "AKIAADMIN");
        let key_id =
            DeleteAuthorization::AdministrativeIdentity.authorize(&store, &requestor, &root).await.unwrap();
        assert_eq!(key_id, "AKIASIAS");
    }

    #[tokio::test]
    async fn test_admin_without_root_key_is_internal() {
        let (store, root) = setup(false).await;
        let requestor = Requestor::new("admin", "iam-admin", "AKIAADMIN");
        let result = DeleteAuthorization::AdministrativeIdentity.authorize(&store, &requestor, &root).await;
        assert!(matches!(result, Err(AccountError::Internal(_))));
    }
}

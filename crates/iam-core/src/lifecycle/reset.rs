use iam_observe::account_span;
use iam_store::{AccessKeyStore, UserStore};
use iam_types::ROOT_USER_NAME;

use super::{AccountLifecycleManager, AccountWithKey, observed};
use crate::error::{AccountError, AccountResult, store_fault};
use crate::provisioner::KeyRequest;

impl AccountLifecycleManager {
    /// Replace every access key of the account's root user with one new key.
    ///
    /// The old keys are deleted before the new one is provisioned; a failure in
    /// between leaves the root user without keys until the next reset.
    pub async fn reset_root_access_key(&self, name: &str) -> AccountResult<AccountWithKey> {
        observed("reset_root_access_key", account_span("reset_root_access_key", name), self.reset_key(name)).await
    }

    async fn reset_key(&self, name: &str) -> AccountResult<AccountWithKey> {
        let account = self.find_account(name).await?;

        let root = self
            .store
            .find_user(&account.name, ROOT_USER_NAME)
            .await
            .map_err(store_fault("find root user"))?
            .ok_or_else(|| {
                tracing::info!("Root user does not exist");
                AccountError::NoSuchEntity
            })?;

        let old_keys =
            self.store.find_all_access_keys(&root.id).await.map_err(store_fault("list root access keys"))?;
        for key in &old_keys {
            self.store.delete_access_key(key).await.map_err(store_fault("delete root access key"))?;
        }

        let limits = self.current_limits().await;
        let key = self.provisioner(&limits).provision(&root, &KeyRequest::Generated).await?;

        tracing::info!(
            account_id = %account.id,
            removed = old_keys.len(),
            access_key_id = %key.id,
            "Root access key reset"
        );

        Ok(AccountWithKey::new(account, &root.name, key))
    }
}

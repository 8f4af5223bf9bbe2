use std::fmt;

use iam_config::AccountLimits;
use iam_observe::{account_span, metrics};
use iam_store::{AccessKeyStore, AccountStore, UserStore};
use iam_types::{AccessKey, Account, ContainerKind, ROOT_USER_NAME, StoreError, User};

use super::{AccountLifecycleManager, AccountWithKey, observed, report_notification};
use crate::allocator::allocate_canonical_id;
use crate::error::{AccountError, AccountResult, store_fault};
use crate::provisioner::KeyRequest;
use crate::validation;

/// Input of an account creation
#[derive(Clone, bon::Builder)]
pub struct CreateAccountRequest {
    #[builder(into)]
    pub name: String,

    #[builder(into)]
    pub email: String,

    /// Caller-chosen root access key id; must come with `secret_key`
    #[builder(into)]
    pub access_key_id: Option<String>,

    #[builder(into)]
    pub secret_key: Option<String>,
}

impl CreateAccountRequest {
    /// Request with a generated root access key
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into(), access_key_id: None, secret_key: None }
    }

    /// Use the given root access key instead of a generated one
    pub fn with_access_key(mut self, access_key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_key = Some(secret_key.into());
        self
    }
}

impl fmt::Debug for CreateAccountRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAccountRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "********"))
            .finish()
    }
}

impl AccountLifecycleManager {
    /// Create an account with its root user and root access key.
    ///
    /// Checks run in order: input validation, capacity (skipped for internal
    /// accounts), name uniqueness, and availability of a caller-supplied key
    /// id. Only then is anything written. After the writes the live count is
    /// taken again; if a concurrent creator pushed it past the limit the new
    /// account is rolled back and the call fails as an internal error.
    pub async fn create(&self, request: CreateAccountRequest) -> AccountResult<AccountWithKey> {
        let span = account_span("create", &request.name);
        observed("create", span, self.create_account(request)).await
    }

    async fn create_account(&self, request: CreateAccountRequest) -> AccountResult<AccountWithKey> {
        validation::validate_account_name(&request.name)?;
        validation::validate_email(&request.email)?;
        let key_request =
            validation::validate_key_pair(request.access_key_id.as_deref(), request.secret_key.as_deref())?;

        let limits = self.current_limits().await;
        let internal = limits.is_internal(&request.name);
        if internal {
            tracing::debug!("Internal account, capacity check skipped");
        } else {
            self.check_capacity(&limits).await?;
        }

        if self.store.find_account_by_name(&request.name).await.map_err(store_fault("find account by name"))?.is_some()
        {
            tracing::info!("Account already exists");
            return Err(AccountError::AccountAlreadyExists);
        }

        let provisioner = self.provisioner(&limits);
        if let KeyRequest::Supplied { access_key_id, .. } = &key_request {
            provisioner.ensure_available(access_key_id).await?;
        }

        let canonical_id =
            allocate_canonical_id(self.store.as_ref(), self.allocator.as_ref(), limits.canonical_id_max_attempts)
                .await?;
        let account = Account::new(self.allocator.account_id(), canonical_id, &request.name, &request.email);
        self.save_account(&account).await?;

        let root = User::root(self.allocator.opaque_id(), &account.id, &account.name);
        self.store.save_user(&root).await.map_err(store_fault("save root user"))?;

        let key = provisioner.provision(&root, &key_request).await?;

        if !internal {
            self.verify_capacity(&limits, &account, &root, &key).await?;
        }

        tracing::info!(account_id = %account.id, canonical_id = %account.canonical_id, "Account created");

        let outcome = self.notifier.notify_create(&account.id, &account.canonical_id, &account.name).await;
        report_notification("create", outcome);

        Ok(AccountWithKey::new(account, ROOT_USER_NAME, key))
    }

    /// Reject the request if the live account count is at the limit
    #[tracing::instrument(skip_all, level = "debug")]
    async fn check_capacity(&self, limits: &AccountLimits) -> AccountResult<()> {
        let count = self.store.find_all_accounts().await.map_err(store_fault("count accounts"))?.len();
        metrics::set_live_accounts(count);

        if count >= limits.max_account_limit {
            tracing::warn!(count, limit = limits.max_account_limit, "Account limit reached");
            return Err(AccountError::MaxAccountLimitExceeded { limit: limits.max_account_limit });
        }
        Ok(())
    }

    async fn save_account(&self, account: &Account) -> AccountResult<()> {
        match self.store.save_account(account).await {
            Ok(()) => Ok(()),
            // Another creator took the name or canonical id after our checks
            Err(StoreError::Conflict) => {
                let taken = self.store.find_account_by_name(&account.name).await.map_err(store_fault("find account by name"))?;
                if taken.is_some() {
                    tracing::info!("Account name taken by a concurrent request");
                    Err(AccountError::AccountAlreadyExists)
                } else {
                    tracing::error!(canonical_id = %account.canonical_id, "Canonical id taken by a concurrent request");
                    Err(AccountError::Internal("canonical id conflict on save".to_string()))
                }
            },
            Err(e) => Err(store_fault("save account")(e)),
        }
    }

    /// Post-commit race check.
    ///
    /// Count and create are not atomic, so two creators can both pass the
    /// capacity check. Recounting after the writes detects the overshoot; the
    /// just-created entries are then removed on a best-effort basis.
    #[tracing::instrument(skip_all, level = "debug")]
    async fn verify_capacity(
        &self,
        limits: &AccountLimits,
        account: &Account,
        root: &User,
        key: &AccessKey,
    ) -> AccountResult<()> {
        let count = self.store.find_all_accounts().await.map_err(store_fault("recount accounts"))?.len();
        metrics::set_live_accounts(count);

        if count > limits.max_account_limit {
            metrics::record_capacity_race();
            tracing::error!(
                count,
                limit = limits.max_account_limit,
                "Account limit exceeded by concurrent creation, rolling back"
            );
            self.roll_back(account, root, key).await;
            return Err(AccountError::Internal(format!(
                "account count {count} exceeds limit {} after creation",
                limits.max_account_limit
            )));
        }
        Ok(())
    }

    /// Remove the access key, the root user and the account, in that order.
    ///
    /// Failures are logged and the remaining steps still run.
    async fn roll_back(&self, account: &Account, root: &User, key: &AccessKey) {
        if let Err(e) = self.store.delete_access_key(key).await {
            tracing::error!(error = %e, "Rollback: failed to delete access key");
        }
        if let Err(e) = self.store.delete_user(root).await {
            tracing::error!(error = %e, "Rollback: failed to delete root user");
        }
        for kind in ContainerKind::DELETION_ORDER {
            if let Err(e) = self.store.delete_container(account, kind).await {
                tracing::error!(error = %e, container = %kind, "Rollback: failed to delete container");
            }
        }
        match self.store.delete_account(account).await {
            Ok(()) => tracing::info!(account_id = %account.id, "Rolled back account creation"),
            Err(e) => tracing::error!(error = %e, "Rollback: failed to delete account"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_and_helpers() {
        let request = CreateAccountRequest::builder()
            .name("s3test")
            .email("testuser@example.com")
            .access_key_id("AKIASIASCustom")
            .secret_key("htuspscae/123/custom")
            .build();

        let same = CreateAccountRequest::new("s3test", "testuser@example.com")
            .with_access_key("AKIASIASCustom", "htuspscae/123/custom");
        assert_eq!(request.access_key_id, same.access_key_id);
        assert_eq!(request.secret_key, same.secret_key);

        let rendered = format!("{request:?}");
        assert!(!rendered.contains("htuspscae"));
    }
}

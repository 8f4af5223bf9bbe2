use iam_observe::account_span;
use iam_store::{AccountStore, UserStore};
use iam_types::{Account, ROOT_USER_NAME, ROOT_USER_PATH, Requestor, StoreError, User};

use super::{AccountLifecycleManager, observed, report_notification};
use crate::authorization::DeleteAuthorization;
use crate::cascade::CascadingDelete;
use crate::error::{AccountError, AccountResult, store_fault};

impl AccountLifecycleManager {
    /// Delete an account and everything under it.
    ///
    /// The requestor must hold the root access key or be the administrative
    /// login. Without `force`, an account with users besides root is refused
    /// before anything is deleted; with `force`, its roles are deleted too.
    /// A cascade that stops part way is not undone.
    pub async fn delete(&self, name: &str, requestor: &Requestor, force: bool) -> AccountResult<()> {
        let span = account_span("delete", name);
        observed("delete", span, self.delete_account(name, requestor, force)).await
    }

    async fn delete_account(&self, name: &str, requestor: &Requestor, force: bool) -> AccountResult<()> {
        let account = self.find_account(name).await?;
        let root = self.find_root_user(&account).await?;

        let limits = self.current_limits().await;
        let strategy = DeleteAuthorization::select(requestor, &limits);
        let root_key_id = strategy.authorize(self.store.as_ref(), requestor, &root).await?;

        let users =
            self.store.find_all_users(&account.name, ROOT_USER_PATH).await.map_err(store_fault("list users"))?;
        let dependents: Vec<&str> = users.iter().filter(|u| !u.is_root()).map(|u| u.name.as_str()).collect();
        if !dependents.is_empty() && !force {
            tracing::info!(users = ?dependents, "Account has users besides root");
            return Err(AccountError::DeleteConflict { detail: format!("users: {}", dependents.join(", ")) });
        }

        let report = CascadingDelete::new(self.store.as_ref(), &account, force).execute(&users).await?;

        match self.store.delete_account(&account).await {
            Ok(()) => {},
            Err(StoreError::DependentsRemain(detail)) => {
                tracing::warn!(detail = %detail, "Account still has subordinate entries");
                return Err(AccountError::DeleteConflict { detail });
            },
            Err(e) => return Err(store_fault("delete account")(e)),
        }

        tracing::info!(
            account_id = %account.id,
            steps = report.completed.len(),
            authorization = ?strategy,
            force,
            "Account deleted"
        );

        let outcome =
            self.notifier.notify_delete(&account.id, &account.canonical_id, &account.name, &root_key_id).await;
        report_notification("delete", outcome);

        Ok(())
    }

    /// The root user must exist for every account; its absence is an internal failure
    async fn find_root_user(&self, account: &Account) -> AccountResult<User> {
        let root = self
            .store
            .find_user(&account.name, ROOT_USER_NAME)
            .await
            .map_err(store_fault("find root user"))?;

        root.ok_or_else(|| {
            tracing::error!(account_id = %account.id, "Account has no root user");
            AccountError::Internal(format!("account {} has no root user", account.name))
        })
    }
}

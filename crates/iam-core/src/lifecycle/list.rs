use iam_observe::account_span;
use iam_store::AccountStore;
use iam_types::Account;

use super::{AccountLifecycleManager, observed};
use crate::error::{AccountResult, store_fault};

impl AccountLifecycleManager {
    /// List all accounts ordered by name. No accounts is a successful empty list.
    pub async fn list(&self) -> AccountResult<Vec<Account>> {
        observed("list", account_span("list", "*"), async {
            let mut accounts = self.store.find_all_accounts().await.map_err(store_fault("list accounts"))?;
            accounts.sort_by(|a, b| a.name.cmp(&b.name));
            iam_observe::metrics::set_live_accounts(accounts.len());
            tracing::debug!(count = accounts.len(), "Listed accounts");
            Ok(accounts)
        })
        .await
    }
}

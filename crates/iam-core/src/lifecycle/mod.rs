//! Account Lifecycle Manager
//!
//! Orchestrates the account-level operations (create, list, delete and reset
//! of the root access key) over a directory store that offers no multi-object
//! transactions. Expected rejections come back as typed [`AccountError`]s;
//! store faults are logged and reported as internal failures.
//!
//! Each operation runs in its own `account_operation` span and reads the
//! current [`AccountLimits`] once at its start.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use iam_config::AccountLimits;
//! use iam_core::{AccountLifecycleManager, CreateAccountRequest};
//! use iam_store::MemoryBackend;
//!
//! # async fn run() -> iam_core::AccountResult<()> {
//! let manager = AccountLifecycleManager::builder()
//!     .store(Arc::new(MemoryBackend::new()))
//!     .limits(Arc::new(AccountLimits::default()))
//!     .build();
//!
//! let created = manager.create(CreateAccountRequest::new("s3test", "testuser@example.com")).await?;
//! println!("{} {}", created.account.id, created.access_key_id);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use iam_config::{AccountLimits, LimitsProvider, SharedConfig, ValidationError};
use iam_observe::{metrics, record_outcome};
use iam_store::{AccountStore, DirectoryStore, StorageFactory};
use iam_types::{AccessKey, AccessKeyStatus, Account};
use serde::Serialize;
use tracing::{Instrument, Span};

use crate::allocator::{IdAllocator, RandomIdAllocator};
use crate::error::{AccountError, AccountResult, store_fault};
use crate::notifier::{ChangeNotifier, LoggingNotifier, NoopNotifier, NotifyOutcome};
use crate::provisioner::AccessKeyProvisioner;

mod create;
mod delete;
mod list;
mod reset;

pub use create::CreateAccountRequest;

/// Account identity plus a freshly minted root access key
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AccountWithKey {
    pub account: Account,
    pub root_user_name: String,
    pub access_key_id: String,
    pub secret_key: String,
    pub status: AccessKeyStatus,
}

impl AccountWithKey {
    fn new(account: Account, root_user_name: &str, key: AccessKey) -> Self {
        Self {
            account,
            root_user_name: root_user_name.to_string(),
            access_key_id: key.id,
            secret_key: key.secret,
            status: key.status,
        }
    }
}

impl fmt::Debug for AccountWithKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountWithKey")
            .field("account", &self.account)
            .field("root_user_name", &self.root_user_name)
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"********")
            .field("status", &self.status)
            .finish()
    }
}

fn default_allocator() -> Arc<dyn IdAllocator> {
    Arc::new(RandomIdAllocator)
}

fn default_notifier() -> Arc<dyn ChangeNotifier> {
    Arc::new(NoopNotifier)
}

/// Entry point for account-level operations
///
/// Holds no per-account state; concurrent operations only share what the
/// store serializes.
#[derive(bon::Builder)]
pub struct AccountLifecycleManager {
    store: Arc<dyn DirectoryStore>,

    #[builder(default = default_allocator())]
    allocator: Arc<dyn IdAllocator>,

    #[builder(default = default_notifier())]
    notifier: Arc<dyn ChangeNotifier>,

    /// Consulted at the start of every operation
    limits: Arc<dyn LimitsProvider>,
}

impl AccountLifecycleManager {
    /// Build a manager from loaded configuration.
    ///
    /// The store comes from `storage.backend`; `notifications.enabled` selects
    /// the logging notifier over the no-op one. Limits keep being read from
    /// `config`, so later replacements take effect.
    pub async fn from_config(config: SharedConfig) -> Result<Self, ValidationError> {
        let current = config.get().await;
        iam_config::validate(&current)?;

        let store = StorageFactory::from_name(&current.storage.backend)
            .map_err(|_| ValidationError::InvalidBackend(current.storage.backend.clone()))?;

        let notifier: Arc<dyn ChangeNotifier> =
            if current.notifications.enabled { Arc::new(LoggingNotifier) } else { Arc::new(NoopNotifier) };

        tracing::info!(
            backend = %current.storage.backend,
            notifications = current.notifications.enabled,
            "Account lifecycle manager configured"
        );

        Ok(Self::builder().store(store).notifier(notifier).limits(Arc::new(config)).build())
    }

    async fn current_limits(&self) -> AccountLimits {
        self.limits.account_limits().await
    }

    fn provisioner(&self, limits: &AccountLimits) -> AccessKeyProvisioner {
        AccessKeyProvisioner::new(
            Arc::clone(&self.store),
            Arc::clone(&self.allocator),
            limits.access_key_max_attempts,
        )
    }

    /// Look up an account by name, `NoSuchEntity` if absent
    async fn find_account(&self, name: &str) -> AccountResult<Account> {
        match self.store.find_account_by_name(name).await.map_err(store_fault("find account by name"))? {
            Some(account) => Ok(account),
            None => {
                tracing::info!(account_name = name, "Account does not exist");
                Err(AccountError::NoSuchEntity)
            },
        }
    }
}

/// Run `work` inside `span`, then record its outcome on the span and in metrics
async fn observed<T, F>(operation: &'static str, span: Span, work: F) -> AccountResult<T>
where
    F: Future<Output = AccountResult<T>>,
{
    let start = Instant::now();
    let result = work.instrument(span.clone()).await;
    let elapsed = start.elapsed();

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    };
    record_outcome(&span, outcome, elapsed.as_millis());
    metrics::record_operation(operation, outcome, elapsed.as_secs_f64());

    result
}

/// Log and count a failed notification; the operation result stays as decided
fn report_notification(event: &'static str, outcome: NotifyOutcome) {
    match outcome {
        NotifyOutcome::Delivered => tracing::debug!(event, "Change notification delivered"),
        NotifyOutcome::Failed(reason) => {
            tracing::warn!(event, reason = %reason, "Change notification failed");
            metrics::record_notification_failure(event);
        },
    }
}

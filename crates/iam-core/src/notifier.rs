//! Change Notifier
//!
//! Best-effort notification of account creation and deletion. The lifecycle
//! manager calls the notifier only after an operation's outcome is decided
//! and never lets the notification result change it.

use async_trait::async_trait;
use iam_types::{AccountId, CanonicalId};

/// Result of a notification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    Failed(String),
}

impl NotifyOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotifyOutcome::Delivered)
    }
}

#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn notify_create(&self, account_id: &AccountId, canonical_id: &CanonicalId, name: &str) -> NotifyOutcome;

    async fn notify_delete(
        &self,
        account_id: &AccountId,
        canonical_id: &CanonicalId,
        name: &str,
        root_key_id: &str,
    ) -> NotifyOutcome;
}

/// Notifier used when notifications are disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl ChangeNotifier for NoopNotifier {
    async fn notify_create(&self, _: &AccountId, _: &CanonicalId, _: &str) -> NotifyOutcome {
        NotifyOutcome::Delivered
    }

    async fn notify_delete(&self, _: &AccountId, _: &CanonicalId, _: &str, _: &str) -> NotifyOutcome {
        NotifyOutcome::Delivered
    }
}

/// Notifier that emits each change as a structured log event
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl ChangeNotifier for LoggingNotifier {
    async fn notify_create(&self, account_id: &AccountId, canonical_id: &CanonicalId, name: &str) -> NotifyOutcome {
        tracing::info!(
            event = "account_created",
            account_id = %account_id,
            canonical_id = %canonical_id,
            account_name = name,
            "Account change"
        );
        NotifyOutcome::Delivered
    }

    async fn notify_delete(
        &self,
        account_id: &AccountId,
        canonical_id: &CanonicalId,
        name: &str,
        root_key_id: &str,
    ) -> NotifyOutcome {
        tracing::info!(
            event = "account_deleted",
            account_id = %account_id,
            canonical_id = %canonical_id,
            account_name = name,
            root_key_id,
            "Account change"
        );
        NotifyOutcome::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builtin_notifiers_deliver() {
        let id = AccountId("987654352188".into());
        let canonical = CanonicalId("can1234".into());

        assert!(NoopNotifier.notify_create(&id, &canonical, "s3test").await.is_delivered());
        assert!(LoggingNotifier.notify_create(&id, &canonical, "s3test").await.is_delivered());
        assert!(LoggingNotifier.notify_delete(&id, &canonical, "s3test", "AKIASIAS").await.is_delivered());
    }

    #[test]
    fn test_failed_outcome() {
        assert!(!NotifyOutcome::Failed("unreachable".into()).is_delivered());
    }
}

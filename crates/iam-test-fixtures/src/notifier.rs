//! Notifier that remembers what it was told

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use iam_core::{ChangeNotifier, NotifyOutcome};
use iam_types::{AccountId, CanonicalId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Created { account_id: String, canonical_id: String, name: String },
    Deleted { account_id: String, canonical_id: String, name: String, root_key_id: String },
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records like [`RecordingNotifier::new`] but reports every delivery as failed
    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Notification) -> NotifyOutcome {
        self.events.lock().unwrap().push(event);
        if self.failing {
            NotifyOutcome::Failed("notification sink unavailable".to_string())
        } else {
            NotifyOutcome::Delivered
        }
    }
}

#[async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn notify_create(&self, account_id: &AccountId, canonical_id: &CanonicalId, name: &str) -> NotifyOutcome {
        self.push(Notification::Created {
            account_id: account_id.to_string(),
            canonical_id: canonical_id.to_string(),
            name: name.to_string(),
        })
    }

    async fn notify_delete(
        &self,
        account_id: &AccountId,
        canonical_id: &CanonicalId,
        name: &str,
        root_key_id: &str,
    ) -> NotifyOutcome {
        self.push(Notification::Deleted {
            account_id: account_id.to_string(),
            canonical_id: canonical_id.to_string(),
            name: name.to_string(),
            root_key_id: root_key_id.to_string(),
        })
    }
}

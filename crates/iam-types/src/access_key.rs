//! Access key type

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an access key may be used to authenticate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessKeyStatus {
    #[default]
    Active,
    Inactive,
}

impl AccessKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKeyStatus::Active => "Active",
            AccessKeyStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for AccessKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An id/secret credential pair bound to a user.
///
/// The access key id is unique across all users. `Debug` output never contains
/// the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    pub id: String,

    /// Identifier of the owning user
    pub user_id: String,

    pub secret: String,

    pub status: AccessKeyStatus,

    /// Session token, present only on temporary credentials
    pub token: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl AccessKey {
    /// Create an active, permanent access key
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            secret: secret.into(),
            status: AccessKeyStatus::Active,
            token: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccessKeyStatus::Active
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("secret", &"********")
            .field("status", &self.status)
            .field("token", &self.token.as_ref().map(|_| "********"))
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_key_is_active() {
        let key = AccessKey::new("AKIASIAS", "user-1", "htuspscae/123");
        assert!(key.is_active());
        assert_eq!(key.status.to_string(), "Active");
        assert!(key.token.is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut key = AccessKey::new("AKIASIAS", "user-1", "htuspscae/123");
        key.token = Some("session-token".to_string());
        let rendered = format!("{key:?}");
        assert!(rendered.contains("AKIASIAS"));
        assert!(!rendered.contains("htuspscae"));
        assert!(!rendered.contains("session-token"));
    }
}

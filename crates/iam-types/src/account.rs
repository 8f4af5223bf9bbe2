//! Account type
//!
//! Represents a tenant that owns users, roles, groups and policies.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// System-generated account identifier (12 decimal digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Globally unique, system-generated identifier used for cross-referencing an
/// account from other services.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(pub String);

impl CanonicalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An Account is the top-level tenant of the directory.
///
/// The name is unique across all accounts and is the key callers use to address
/// it. Both identifiers are allocated by the service and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    pub canonical_id: CanonicalId,

    /// Unique account name
    pub name: String,

    pub email: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new Account stamped with the current time
    pub fn new(
        id: AccountId,
        canonical_id: CanonicalId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self { id, canonical_id, name: name.into(), email: email.into(), created_at: now, updated_at: now }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Account {
        Account::new(
            AccountId("987654352188".to_string()),
            CanonicalId("can1234".to_string()),
            "s3test",
            "testuser@example.com",
        )
    }

    #[test]
    fn test_account_new() {
        let account = sample();
        assert_eq!(account.id.as_str(), "987654352188");
        assert_eq!(account.canonical_id.as_str(), "can1234");
        assert_eq!(account.name, "s3test");
        assert!(account.created_at <= Utc::now());
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn test_account_serialization() {
        let account = sample();
        let json = serde_json::to_value(&account).unwrap();
        // Identifiers serialize as bare strings
        assert_eq!(json["id"], "987654352188");
        assert_eq!(json["canonical_id"], "can1234");

        let deserialized: Account = serde_json::from_value(json).unwrap();
        assert_eq!(account, deserialized);
    }
}

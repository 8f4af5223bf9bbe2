//! User type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Name of the user created with every account.
pub const ROOT_USER_NAME: &str = "root";

/// Path of the root user, and the path prefix that matches every user.
pub const ROOT_USER_PATH: &str = "/";

/// A User belongs to exactly one account and is addressed by
/// (account name, user name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque user identifier
    pub id: String,

    /// Name of the owning account
    pub account_name: String,

    pub name: String,

    pub path: String,

    pub arn: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user under the given account
    pub fn new(
        id: impl Into<String>,
        account_id: &AccountId,
        account_name: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let path = path.into();
        let arn = if name == ROOT_USER_NAME {
            format!("arn:aws:iam::{account_id}:root")
        } else {
            format!("arn:aws:iam::{account_id}:user{path}{name}")
        };
        Self {
            id: id.into(),
            account_name: account_name.into(),
            name,
            path,
            arn,
            created_at: Utc::now(),
        }
    }

    /// Create the root user of an account
    pub fn root(id: impl Into<String>, account_id: &AccountId, account_name: impl Into<String>) -> Self {
        Self::new(id, account_id, account_name, ROOT_USER_NAME, ROOT_USER_PATH)
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_USER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_user() {
        let account_id = AccountId("123456789012".to_string());
        let user = User::root("AIDA1", &account_id, "s3test");
        assert!(user.is_root());
        assert_eq!(user.path, "/");
        assert_eq!(user.arn, "arn:aws:iam::123456789012:root");
    }

    #[test]
    fn test_regular_user_arn() {
        let account_id = AccountId("123456789012".to_string());
        let user = User::new("AIDA2", &account_id, "s3test", "s3user", "/team/");
        assert!(!user.is_root());
        assert_eq!(user.arn, "arn:aws:iam::123456789012:user/team/s3user");
    }
}

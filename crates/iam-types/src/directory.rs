//! Account-scoped directory entries other than users
//!
//! Roles are managed by the account service during forced deletes. Groups and
//! policies are only ever observed: they keep their containers non-empty until
//! removed out of band.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A role owned by an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub account_name: String,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(
        id: impl Into<String>,
        account_name: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            account_name: account_name.into(),
            name: name.into(),
            path: path.into(),
            created_at: Utc::now(),
        }
    }
}

/// A group owned by an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub account_name: String,
    pub name: String,
    pub path: String,
}

/// A managed policy owned by an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub account_name: String,
    pub name: String,
    pub path: String,
}

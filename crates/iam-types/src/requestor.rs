//! Authenticated requestor identity

use serde::{Deserialize, Serialize};

/// The caller of an account operation, as established by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requestor {
    /// Identifier of the authenticated user
    pub user_id: String,

    pub account_name: String,

    /// Access key the request was signed with
    pub access_key_id: String,
}

impl Requestor {
    pub fn new(
        user_id: impl Into<String>,
        account_name: impl Into<String>,
        access_key_id: impl Into<String>,
    ) -> Self {
        Self { user_id: user_id.into(), account_name: account_name.into(), access_key_id: access_key_id.into() }
    }
}

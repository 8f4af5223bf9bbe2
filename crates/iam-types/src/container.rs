//! Organizational containers
//!
//! Each account owns one container per kind of member. A container can only be
//! deleted once it is empty, which is how the directory reports that
//! subordinate objects remain.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContainerKind {
    Users,
    Roles,
    Groups,
    Policies,
}

impl ContainerKind {
    /// Order in which an account's containers are removed.
    pub const DELETION_ORDER: [ContainerKind; 4] =
        [ContainerKind::Users, ContainerKind::Roles, ContainerKind::Groups, ContainerKind::Policies];

    /// Directory name of the container
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerKind::Users => "users",
            ContainerKind::Roles => "roles",
            ContainerKind::Groups => "groups",
            ContainerKind::Policies => "policies",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ou={}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_order() {
        assert_eq!(
            ContainerKind::DELETION_ORDER,
            [ContainerKind::Users, ContainerKind::Roles, ContainerKind::Groups, ContainerKind::Policies]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ContainerKind::Roles.to_string(), "ou=roles");
    }
}

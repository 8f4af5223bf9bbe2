//! Cascading Delete Executor
//!
//! Removes an account's sub-resources in a fixed order before the account
//! record itself:
//!
//! 1. every user's access keys, then the user,
//! 2. with `force`, every role of the account,
//! 3. the user, role, group and policy containers, in that order.
//!
//! The store has no transactions. A failed step stops the pipeline and the
//! steps already applied stay applied.

use std::fmt;

use iam_store::{AccessKeyStore, AccountStore, DirectoryStore, RoleStore, UserStore};
use iam_types::{Account, ContainerKind, ROOT_USER_PATH, StoreError, User};

use crate::error::{AccountError, AccountResult};

/// One store mutation of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeStep {
    DeleteAccessKey(String),
    DeleteUser(String),
    DeleteRole(String),
    DeleteContainer(ContainerKind),
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeStep::DeleteAccessKey(id) => write!(f, "delete access key {id}"),
            CascadeStep::DeleteUser(name) => write!(f, "delete user {name}"),
            CascadeStep::DeleteRole(name) => write!(f, "delete role {name}"),
            CascadeStep::DeleteContainer(kind) => write!(f, "delete container {kind}"),
        }
    }
}

/// Steps applied by a cascade, in order
#[derive(Debug, Default)]
pub struct CascadeReport {
    pub completed: Vec<CascadeStep>,
}

pub struct CascadingDelete<'a> {
    store: &'a dyn DirectoryStore,
    account: &'a Account,
    force: bool,
    report: CascadeReport,
}

impl<'a> CascadingDelete<'a> {
    pub fn new(store: &'a dyn DirectoryStore, account: &'a Account, force: bool) -> Self {
        Self { store, account, force, report: CascadeReport::default() }
    }

    /// Run the pipeline over `users`.
    ///
    /// A dependents-remain signal from the store becomes `DeleteConflict`;
    /// any other store error becomes `Internal`.
    pub async fn execute(mut self, users: &[User]) -> AccountResult<CascadeReport> {
        // Root goes last so the account keeps its credentials as long as possible
        let (root, others): (Vec<&User>, Vec<&User>) = users.iter().partition(|u| u.is_root());
        for user in others.into_iter().chain(root) {
            self.delete_user(user).await?;
        }

        for kind in ContainerKind::DELETION_ORDER {
            if kind == ContainerKind::Roles && self.force {
                self.delete_roles().await?;
            }
            let result = self.store.delete_container(self.account, kind).await;
            self.apply(CascadeStep::DeleteContainer(kind), result)?;
        }

        tracing::debug!(steps = self.report.completed.len(), "Cascading delete finished");
        Ok(self.report)
    }

    async fn delete_user(&mut self, user: &User) -> AccountResult<()> {
        let keys = self.store.find_all_access_keys(&user.id).await;
        let keys = self.classify(&format!("list access keys of {}", user.name), keys)?;
        for key in keys {
            let result = self.store.delete_access_key(&key).await;
            self.apply(CascadeStep::DeleteAccessKey(key.id.clone()), result)?;
        }

        let result = self.store.delete_user(user).await;
        self.apply(CascadeStep::DeleteUser(user.name.clone()), result)
    }

    async fn delete_roles(&mut self) -> AccountResult<()> {
        let roles = self.store.find_all_roles(&self.account.name, ROOT_USER_PATH).await;
        let roles = self.classify("list roles", roles)?;
        for role in roles {
            let result = self.store.delete_role(&role).await;
            self.apply(CascadeStep::DeleteRole(role.name.clone()), result)?;
        }
        Ok(())
    }

    fn apply(&mut self, step: CascadeStep, result: Result<(), StoreError>) -> AccountResult<()> {
        let description = step.to_string();
        self.classify(&description, result)?;
        self.report.completed.push(step);
        Ok(())
    }

    fn classify<T>(&self, step: &str, result: Result<T, StoreError>) -> AccountResult<T> {
        result.map_err(|err| match err {
            StoreError::DependentsRemain(detail) => {
                tracing::warn!(
                    account = %self.account.name,
                    step,
                    detail = %detail,
                    completed = self.report.completed.len(),
                    "Cascading delete stopped: subordinate entities remain"
                );
                AccountError::DeleteConflict { detail }
            },
            other => {
                tracing::error!(
                    account = %self.account.name,
                    step,
                    error = %other,
                    completed = self.report.completed.len(),
                    "Cascading delete failed"
                );
                AccountError::Internal(format!("{step}: {other}"))
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use iam_store::MemoryBackend;
    use iam_types::{AccessKey, AccountId, CanonicalId, Group, Role};

    use super::*;

    struct Fixture {
        store: MemoryBackend,
        account: Account,
        users: Vec<User>,
    }

    async fn fixture() -> Fixture {
        let store = MemoryBackend::new();
        let account = Account::new(AccountId("987654352188".into()), CanonicalId("can1234".into()), "s3test", "a@b.c");
        store.save_account(&account).await.unwrap();

        let root = User::root("AIDAROOT", &account.id, "s3test");
        let user = User::new("AIDAUSER", &account.id, "s3test", "s3user", "/");
        for (u, key_id) in [(&root, "AKIASIAS"), (&user, "AKIAUSER")] {
            store.save_user(u).await.unwrap();
            store.save_access_key(&AccessKey::new(key_id, &u.id, "htuspscae/123")).await.unwrap();
        }

        Fixture { store, account, users: vec![root, user] }
    }

    #[tokio::test]
    async fn test_cascade_order() {
        let f = fixture().await;
        let report = CascadingDelete::new(&f.store, &f.account, false).execute(&f.users).await.unwrap();

        assert_eq!(
            report.completed,
            vec![
                CascadeStep::DeleteAccessKey("AKIAUSER".into()),
                CascadeStep::DeleteUser("s3user".into()),
                CascadeStep::DeleteAccessKey("AKIASIAS".into()),
                CascadeStep::DeleteUser("root".into()),
                CascadeStep::DeleteContainer(ContainerKind::Users),
                CascadeStep::DeleteContainer(ContainerKind::Roles),
                CascadeStep::DeleteContainer(ContainerKind::Groups),
                CascadeStep::DeleteContainer(ContainerKind::Policies),
            ]
        );
        assert_eq!(f.store.access_key_count().await, 0);
        f.store.delete_account(&f.account).await.unwrap();
    }

    #[tokio::test]
    async fn test_remaining_role_is_delete_conflict_without_force() {
        let f = fixture().await;
        f.store.save_role(&Role::new("AROA1", "s3test", "reader", "/")).await.unwrap();

        let result = CascadingDelete::new(&f.store, &f.account, false).execute(&f.users).await;
        assert!(matches!(result, Err(AccountError::DeleteConflict { .. })));

        // Earlier steps are not undone and later containers are untouched
        assert!(!f.store.has_container("s3test", ContainerKind::Users).await);
        assert!(f.store.has_container("s3test", ContainerKind::Roles).await);
        assert!(f.store.has_container("s3test", ContainerKind::Groups).await);
        assert!(f.store.has_container("s3test", ContainerKind::Policies).await);
    }

    #[tokio::test]
    async fn test_force_deletes_roles_first() {
        let f = fixture().await;
        for name in ["reader", "writer"] {
            f.store.save_role(&Role::new(format!("AROA-{name}"), "s3test", name, "/")).await.unwrap();
        }

        let report = CascadingDelete::new(&f.store, &f.account, true).execute(&f.users).await.unwrap();
        let role_steps: Vec<_> =
            report.completed.iter().filter(|s| matches!(s, CascadeStep::DeleteRole(_))).collect();
        assert_eq!(role_steps.len(), 2);
        assert!(f.store.find_all_roles("s3test", "/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_group_blocks_even_with_force() {
        let f = fixture().await;
        f.store
            .insert_group(Group {
                id: "AGPA1".into(),
                account_name: "s3test".into(),
                name: "admins".into(),
                path: "/".into(),
            })
            .await
            .unwrap();

        let result = CascadingDelete::new(&f.store, &f.account, true).execute(&f.users).await;
        assert!(matches!(result, Err(AccountError::DeleteConflict { .. })));
        assert!(f.store.has_container("s3test", ContainerKind::Policies).await);
    }
}

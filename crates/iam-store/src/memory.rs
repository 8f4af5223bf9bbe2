//! In-memory directory backend for testing and development
//!
//! Entries are kept in ordered maps behind a single `RwLock`. Every trait
//! method takes the lock once, so each call is atomic on its own while a
//! sequence of calls is not.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use iam_types::{
    AccessKey, Account, CanonicalId, ContainerKind, Group, Policy, Role, StoreError, User,
};
use tokio::sync::RwLock;

use crate::{AccessKeyStore, AccountStore, Result, RoleStore, UserStore};

/// In-memory directory with container semantics
#[derive(Clone)]
pub struct MemoryBackend {
    data: Arc<RwLock<Directory>>,
}

#[derive(Default)]
struct Directory {
    /// Accounts by name
    accounts: BTreeMap<String, Account>,

    /// Live containers as (account name, kind)
    containers: BTreeSet<(String, ContainerKind)>,

    /// Users by (account name, user name)
    users: BTreeMap<(String, String), User>,

    /// Access keys by id
    access_keys: HashMap<String, AccessKey>,

    /// Roles by (account name, role name)
    roles: BTreeMap<(String, String), Role>,

    /// Groups by (account name, group name)
    groups: BTreeMap<(String, String), Group>,

    /// Policies by (account name, policy name)
    policies: BTreeMap<(String, String), Policy>,
}

impl Directory {
    fn container_exists(&self, account_name: &str, kind: ContainerKind) -> bool {
        self.containers.contains(&(account_name.to_string(), kind))
    }

    fn require_container(&self, account_name: &str, kind: ContainerKind) -> Result<()> {
        if self.container_exists(account_name, kind) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn member_count(&self, account_name: &str, kind: ContainerKind) -> usize {
        match kind {
            ContainerKind::Users => count_in(&self.users, account_name),
            ContainerKind::Roles => count_in(&self.roles, account_name),
            ContainerKind::Groups => count_in(&self.groups, account_name),
            ContainerKind::Policies => count_in(&self.policies, account_name),
        }
    }
}

fn count_in<V>(map: &BTreeMap<(String, String), V>, account_name: &str) -> usize {
    map.keys().filter(|(account, _)| account == account_name).count()
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self { data: Arc::new(RwLock::new(Directory::default())) }
    }

    /// Add a group to an existing account.
    ///
    /// Groups are managed outside the account service; this is how they
    /// enter the directory in development setups.
    pub async fn insert_group(&self, group: Group) -> Result<()> {
        let mut dir = self.data.write().await;
        dir.require_container(&group.account_name, ContainerKind::Groups)?;
        let key = (group.account_name.clone(), group.name.clone());
        if dir.groups.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        dir.groups.insert(key, group);
        Ok(())
    }

    /// Add a managed policy to an existing account
    pub async fn insert_policy(&self, policy: Policy) -> Result<()> {
        let mut dir = self.data.write().await;
        dir.require_container(&policy.account_name, ContainerKind::Policies)?;
        let key = (policy.account_name.clone(), policy.name.clone());
        if dir.policies.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        dir.policies.insert(key, policy);
        Ok(())
    }

    /// Whether the given container of an account still exists
    pub async fn has_container(&self, account_name: &str, kind: ContainerKind) -> bool {
        self.data.read().await.container_exists(account_name, kind)
    }

    /// Total number of access keys across all users
    pub async fn access_key_count(&self) -> usize {
        self.data.read().await.access_keys.len()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryBackend {
    async fn find_account_by_name(&self, name: &str) -> Result<Option<Account>> {
        Ok(self.data.read().await.accounts.get(name).cloned())
    }

    async fn find_all_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.data.read().await.accounts.values().cloned().collect())
    }

    async fn find_account_by_canonical_id(&self, canonical_id: &CanonicalId) -> Result<Option<Account>> {
        let dir = self.data.read().await;
        Ok(dir.accounts.values().find(|a| &a.canonical_id == canonical_id).cloned())
    }

    async fn save_account(&self, account: &Account) -> Result<()> {
        let mut dir = self.data.write().await;
        if dir.accounts.contains_key(&account.name) {
            return Err(StoreError::Conflict);
        }
        if dir.accounts.values().any(|a| a.canonical_id == account.canonical_id) {
            return Err(StoreError::Conflict);
        }

        dir.accounts.insert(account.name.clone(), account.clone());
        for kind in ContainerKind::DELETION_ORDER {
            dir.containers.insert((account.name.clone(), kind));
        }
        Ok(())
    }

    async fn delete_account(&self, account: &Account) -> Result<()> {
        let mut dir = self.data.write().await;
        if !dir.accounts.contains_key(&account.name) {
            return Err(StoreError::NotFound);
        }
        if let Some(kind) =
            ContainerKind::DELETION_ORDER.into_iter().find(|kind| dir.container_exists(&account.name, *kind))
        {
            return Err(StoreError::DependentsRemain(format!("{kind},o={}", account.name)));
        }
        dir.accounts.remove(&account.name);
        Ok(())
    }

    async fn delete_container(&self, account: &Account, kind: ContainerKind) -> Result<()> {
        let mut dir = self.data.write().await;
        if !dir.container_exists(&account.name, kind) {
            return Ok(());
        }
        let members = dir.member_count(&account.name, kind);
        if members > 0 {
            return Err(StoreError::DependentsRemain(format!(
                "{kind},o={} holds {members} entries",
                account.name
            )));
        }
        dir.containers.remove(&(account.name.clone(), kind));
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryBackend {
    async fn find_user(&self, account_name: &str, user_name: &str) -> Result<Option<User>> {
        let dir = self.data.read().await;
        Ok(dir.users.get(&(account_name.to_string(), user_name.to_string())).cloned())
    }

    async fn find_all_users(&self, account_name: &str, path_prefix: &str) -> Result<Vec<User>> {
        let dir = self.data.read().await;
        Ok(dir
            .users
            .values()
            .filter(|u| u.account_name == account_name && u.path.starts_with(path_prefix))
            .cloned()
            .collect())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let mut dir = self.data.write().await;
        dir.require_container(&user.account_name, ContainerKind::Users)?;
        let key = (user.account_name.clone(), user.name.clone());
        if dir.users.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        dir.users.insert(key, user.clone());
        Ok(())
    }

    async fn delete_user(&self, user: &User) -> Result<()> {
        let mut dir = self.data.write().await;
        let key = (user.account_name.clone(), user.name.clone());
        if !dir.users.contains_key(&key) {
            return Err(StoreError::NotFound);
        }
        if dir.access_keys.values().any(|k| k.user_id == user.id) {
            return Err(StoreError::DependentsRemain(format!("access keys of {}", user.name)));
        }
        dir.users.remove(&key);
        Ok(())
    }
}

#[async_trait]
impl AccessKeyStore for MemoryBackend {
    async fn find_access_key(&self, access_key_id: &str) -> Result<Option<AccessKey>> {
        Ok(self.data.read().await.access_keys.get(access_key_id).cloned())
    }

    async fn find_all_access_keys(&self, user_id: &str) -> Result<Vec<AccessKey>> {
        let dir = self.data.read().await;
        let mut keys: Vec<AccessKey> =
            dir.access_keys.values().filter(|k| k.user_id == user_id).cloned().collect();
        keys.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(keys)
    }

    async fn find_account_access_key(&self, user_id: &str) -> Result<Option<AccessKey>> {
        let keys = self.find_all_access_keys(user_id).await?;
        Ok(keys.into_iter().find(AccessKey::is_active))
    }

    async fn save_access_key(&self, key: &AccessKey) -> Result<()> {
        let mut dir = self.data.write().await;
        if dir.access_keys.contains_key(&key.id) {
            return Err(StoreError::Conflict);
        }
        dir.access_keys.insert(key.id.clone(), key.clone());
        Ok(())
    }

    async fn delete_access_key(&self, key: &AccessKey) -> Result<()> {
        let mut dir = self.data.write().await;
        match dir.access_keys.remove(&key.id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl RoleStore for MemoryBackend {
    async fn find_all_roles(&self, account_name: &str, path_prefix: &str) -> Result<Vec<Role>> {
        let dir = self.data.read().await;
        Ok(dir
            .roles
            .values()
            .filter(|r| r.account_name == account_name && r.path.starts_with(path_prefix))
            .cloned()
            .collect())
    }

    async fn save_role(&self, role: &Role) -> Result<()> {
        let mut dir = self.data.write().await;
        dir.require_container(&role.account_name, ContainerKind::Roles)?;
        let key = (role.account_name.clone(), role.name.clone());
        if dir.roles.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        dir.roles.insert(key, role.clone());
        Ok(())
    }

    async fn delete_role(&self, role: &Role) -> Result<()> {
        let mut dir = self.data.write().await;
        match dir.roles.remove(&(role.account_name.clone(), role.name.clone())) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

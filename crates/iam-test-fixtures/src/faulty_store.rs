//! Fault-injecting directory store
//!
//! Wraps a [`MemoryBackend`] and records every gateway call. Individual
//! operations can be made to fail, account listings can be scripted to a
//! given length, container deletes can be forced to report dependents, and
//! access key lookups can be made to miss.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use iam_store::{AccessKeyStore, AccountStore, MemoryBackend, RoleStore, UserStore};
use iam_types::{
    AccessKey, Account, AccountId, CanonicalId, ContainerKind, Role, StoreError, StoreResult, User,
};

/// Gateway operations that can be observed and failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FindAccountByName,
    FindAllAccounts,
    FindAccountByCanonicalId,
    SaveAccount,
    DeleteAccount,
    DeleteContainer,
    FindUser,
    FindAllUsers,
    SaveUser,
    DeleteUser,
    FindAccessKey,
    FindAllAccessKeys,
    FindAccountAccessKey,
    SaveAccessKey,
    DeleteAccessKey,
    FindAllRoles,
    SaveRole,
    DeleteRole,
}

impl StoreOp {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreOp::SaveAccount
                | StoreOp::DeleteAccount
                | StoreOp::DeleteContainer
                | StoreOp::SaveUser
                | StoreOp::DeleteUser
                | StoreOp::SaveAccessKey
                | StoreOp::DeleteAccessKey
                | StoreOp::SaveRole
                | StoreOp::DeleteRole
        )
    }
}

#[derive(Default)]
struct FaultState {
    /// Remaining failures per operation; `None` fails forever
    faults: HashMap<StoreOp, Option<usize>>,
    account_counts: VecDeque<usize>,
    dependents: HashSet<ContainerKind>,
    blind_key_lookups: bool,
    calls: Vec<(StoreOp, String)>,
}

#[derive(Clone, Default)]
pub struct FaultyStore {
    inner: MemoryBackend,
    state: Arc<Mutex<FaultState>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped backend; calls made through it are neither recorded nor failed
    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    /// Fail every call of `op`
    pub fn fail(&self, op: StoreOp) {
        self.state.lock().unwrap().faults.insert(op, None);
    }

    /// Fail the next `times` calls of `op`
    pub fn fail_times(&self, op: StoreOp, times: usize) {
        self.state.lock().unwrap().faults.insert(op, Some(times));
    }

    /// Make the next account listings return exactly these many accounts
    pub fn script_account_counts(&self, counts: impl IntoIterator<Item = usize>) {
        self.state.lock().unwrap().account_counts.extend(counts);
    }

    /// Make deletes of this container kind report remaining dependents
    pub fn force_dependents_remain(&self, kind: ContainerKind) {
        self.state.lock().unwrap().dependents.insert(kind);
    }

    /// Make `find_access_key` report every id as free; saves still see taken ids
    pub fn blind_key_lookups(&self) {
        self.state.lock().unwrap().blind_key_lookups = true;
    }

    /// Every call so far with its subject
    pub fn calls(&self) -> Vec<(StoreOp, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|(o, _)| *o == op).count()
    }

    /// Calls that modify the directory
    pub fn writes(&self) -> Vec<(StoreOp, String)> {
        self.calls().into_iter().filter(|(op, _)| op.is_write()).collect()
    }

    /// Record the call and decide whether it fails
    fn enter(&self, op: StoreOp, subject: impl Into<String>) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((op, subject.into()));

        match state.faults.get_mut(&op) {
            Some(None) => Err(injected(op)),
            Some(Some(remaining)) if *remaining > 0 => {
                *remaining -= 1;
                Err(injected(op))
            },
            _ => Ok(()),
        }
    }
}

fn injected(op: StoreOp) -> StoreError {
    StoreError::Database(format!("injected fault in {op:?}"))
}

/// An account that only exists in scripted listings
fn filler_account(n: usize) -> Account {
    Account::new(
        AccountId(format!("{:012}", 100_000_000_000_u64 + n as u64)),
        CanonicalId(format!("filler{n}")),
        format!("filler{n}"),
        "filler@example.com",
    )
}

#[async_trait]
impl AccountStore for FaultyStore {
    async fn find_account_by_name(&self, name: &str) -> StoreResult<Option<Account>> {
        self.enter(StoreOp::FindAccountByName, name)?;
        self.inner.find_account_by_name(name).await
    }

    async fn find_all_accounts(&self) -> StoreResult<Vec<Account>> {
        self.enter(StoreOp::FindAllAccounts, "*")?;
        let mut accounts = self.inner.find_all_accounts().await?;

        let scripted = self.state.lock().unwrap().account_counts.pop_front();
        if let Some(count) = scripted {
            accounts.truncate(count);
            let missing = count - accounts.len();
            accounts.extend((0..missing).map(filler_account));
        }
        Ok(accounts)
    }

    async fn find_account_by_canonical_id(&self, canonical_id: &CanonicalId) -> StoreResult<Option<Account>> {
        self.enter(StoreOp::FindAccountByCanonicalId, canonical_id.as_str())?;
        self.inner.find_account_by_canonical_id(canonical_id).await
    }

    async fn save_account(&self, account: &Account) -> StoreResult<()> {
        self.enter(StoreOp::SaveAccount, account.name.as_str())?;
        self.inner.save_account(account).await
    }

    async fn delete_account(&self, account: &Account) -> StoreResult<()> {
        self.enter(StoreOp::DeleteAccount, account.name.as_str())?;
        self.inner.delete_account(account).await
    }

    async fn delete_container(&self, account: &Account, kind: ContainerKind) -> StoreResult<()> {
        self.enter(StoreOp::DeleteContainer, kind.as_str())?;
        if self.state.lock().unwrap().dependents.contains(&kind) {
            return Err(StoreError::DependentsRemain(format!("{kind} is not empty")));
        }
        self.inner.delete_container(account, kind).await
    }
}

#[async_trait]
impl UserStore for FaultyStore {
    async fn find_user(&self, account_name: &str, user_name: &str) -> StoreResult<Option<User>> {
        self.enter(StoreOp::FindUser, user_name)?;
        self.inner.find_user(account_name, user_name).await
    }

    async fn find_all_users(&self, account_name: &str, path_prefix: &str) -> StoreResult<Vec<User>> {
        self.enter(StoreOp::FindAllUsers, account_name)?;
        self.inner.find_all_users(account_name, path_prefix).await
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.enter(StoreOp::SaveUser, user.name.as_str())?;
        self.inner.save_user(user).await
    }

    async fn delete_user(&self, user: &User) -> StoreResult<()> {
        self.enter(StoreOp::DeleteUser, user.name.as_str())?;
        self.inner.delete_user(user).await
    }
}

#[async_trait]
impl AccessKeyStore for FaultyStore {
    async fn find_access_key(&self, access_key_id: &str) -> StoreResult<Option<AccessKey>> {
        self.enter(StoreOp::FindAccessKey, access_key_id)?;
        if self.state.lock().unwrap().blind_key_lookups {
            return Ok(None);
        }
        self.inner.find_access_key(access_key_id).await
    }

    async fn find_all_access_keys(&self, user_id: &str) -> StoreResult<Vec<AccessKey>> {
        self.enter(StoreOp::FindAllAccessKeys, user_id)?;
        self.inner.find_all_access_keys(user_id).await
    }

    async fn find_account_access_key(&self, user_id: &str) -> StoreResult<Option<AccessKey>> {
        self.enter(StoreOp::FindAccountAccessKey, user_id)?;
        self.inner.find_account_access_key(user_id).await
    }

    async fn save_access_key(&self, key: &AccessKey) -> StoreResult<()> {
        self.enter(StoreOp::SaveAccessKey, key.id.as_str())?;
        self.inner.save_access_key(key).await
    }

    async fn delete_access_key(&self, key: &AccessKey) -> StoreResult<()> {
        self.enter(StoreOp::DeleteAccessKey, key.id.as_str())?;
        self.inner.delete_access_key(key).await
    }
}

#[async_trait]
impl RoleStore for FaultyStore {
    async fn find_all_roles(&self, account_name: &str, path_prefix: &str) -> StoreResult<Vec<Role>> {
        self.enter(StoreOp::FindAllRoles, account_name)?;
        self.inner.find_all_roles(account_name, path_prefix).await
    }

    async fn save_role(&self, role: &Role) -> StoreResult<()> {
        self.enter(StoreOp::SaveRole, role.name.as_str())?;
        self.inner.save_role(role).await
    }

    async fn delete_role(&self, role: &Role) -> StoreResult<()> {
        self.enter(StoreOp::DeleteRole, role.name.as_str())?;
        self.inner.delete_role(role).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fail_times_then_recovers() {
        let store = FaultyStore::new();
        store.fail_times(StoreOp::FindAllAccounts, 1);

        assert!(store.find_all_accounts().await.is_err());
        assert!(store.find_all_accounts().await.unwrap().is_empty());
        assert_eq!(store.count(StoreOp::FindAllAccounts), 2);
    }

    #[tokio::test]
    async fn test_scripted_account_counts() {
        let store = FaultyStore::new();
        store.script_account_counts([3, 0]);

        assert_eq!(store.find_all_accounts().await.unwrap().len(), 3);
        assert_eq!(store.find_all_accounts().await.unwrap().len(), 0);
        assert!(store.find_all_accounts().await.unwrap().is_empty());
    }
}

//! Helpers that put accounts, users and roles straight into a store

use iam_store::{AccessKeyStore, AccountStore, DirectoryStore, RoleStore, UserStore};
use iam_types::{AccessKey, Account, AccountId, CanonicalId, ROOT_USER_PATH, Role, User};

/// An account written by [`seed_account`]
#[derive(Debug, Clone)]
pub struct Seeded {
    pub account: Account,
    pub root: User,
    pub root_key: AccessKey,
}

/// Write an account with its root user and one root access key.
///
/// Ids derive from `name`: the root key id is `AK{NAME}ROOT`.
pub async fn seed_account(store: &dyn DirectoryStore, name: &str, canonical_id: &str) -> Seeded {
    let account = Account::new(
        AccountId(format!("{:012}", 200_000_000_000_u64 + name.len() as u64)),
        CanonicalId(canonical_id.to_string()),
        name,
        format!("{name}@example.com"),
    );
    store.save_account(&account).await.unwrap();

    let root = User::root(format!("AIDA{name}ROOT"), &account.id, name);
    store.save_user(&root).await.unwrap();

    let root_key =
        AccessKey::new(format!("AK{}ROOT", name.to_uppercase()), root.id.clone(), format!("{name}-root-secret"));
    store.save_access_key(&root_key).await.unwrap();

    Seeded { account, root, root_key }
}

/// Write a non-root user holding `keys` access keys, ids scoped by account name
pub async fn seed_user(
    store: &dyn DirectoryStore,
    account: &Account,
    name: &str,
    keys: usize,
) -> (User, Vec<AccessKey>) {
    let user = User::new(format!("AIDA{}{name}", account.name), &account.id, &account.name, name, ROOT_USER_PATH);
    store.save_user(&user).await.unwrap();

    let mut saved = Vec::with_capacity(keys);
    for n in 0..keys {
        let id = format!("AK{}{}{n}", account.name.to_uppercase(), name.to_uppercase());
        let key = AccessKey::new(id, user.id.clone(), format!("{name}-secret-{n}"));
        store.save_access_key(&key).await.unwrap();
        saved.push(key);
    }
    (user, saved)
}

pub async fn seed_role(store: &dyn DirectoryStore, account: &Account, name: &str) -> Role {
    let role = Role::new(format!("AROA{}{name}", account.name), &account.name, name, ROOT_USER_PATH);
    store.save_role(&role).await.unwrap();
    role
}

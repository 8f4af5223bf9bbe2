//! # IAM Store - Directory Store Gateway
//!
//! Typed CRUD and search operations per directory entity kind.
//!
//! ## Architecture
//!
//! The gateway is split into one trait per entity kind (`AccountStore`,
//! `UserStore`, `AccessKeyStore`, `RoleStore`) and combined into
//! [`DirectoryStore`] so services can hold a single trait object.
//!
//! The contract mirrors what a directory server offers: each call is atomic
//! for a single object and reads observe preceding writes, but nothing spans
//! more than one object. Container deletes report remaining members with
//! [`StoreError::DependentsRemain`](iam_types::StoreError::DependentsRemain).

#![deny(unsafe_code)]

use async_trait::async_trait;
use iam_types::{AccessKey, Account, CanonicalId, ContainerKind, Role, StoreResult, User};

pub mod factory;
pub mod memory;

pub use factory::{BackendType, StorageConfig, StorageFactory};
pub use memory::MemoryBackend;

type Result<T> = StoreResult<T>;

/// Combined store trait that provides every gateway operation
pub trait DirectoryStore: AccountStore + UserStore + AccessKeyStore + RoleStore + Send + Sync {}

impl<T> DirectoryStore for T where T: AccountStore + UserStore + AccessKeyStore + RoleStore + Send + Sync {}

/// Account records and their organizational containers
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by its unique name
    async fn find_account_by_name(&self, name: &str) -> Result<Option<Account>>;

    /// List every account
    async fn find_all_accounts(&self) -> Result<Vec<Account>>;

    /// Look up an account by canonical id
    async fn find_account_by_canonical_id(&self, canonical_id: &CanonicalId) -> Result<Option<Account>>;

    /// Persist a new account together with its empty containers.
    ///
    /// Fails with `Conflict` if an account with the same name exists.
    async fn save_account(&self, account: &Account) -> Result<()>;

    /// Delete an account record.
    ///
    /// Fails with `DependentsRemain` while any of its containers still exist.
    async fn delete_account(&self, account: &Account) -> Result<()>;

    /// Delete one of the account's organizational containers.
    ///
    /// Fails with `DependentsRemain` if the container still holds members.
    /// Deleting a container that is already gone succeeds.
    async fn delete_container(&self, account: &Account, kind: ContainerKind) -> Result<()>;
}

/// Users within an account
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, account_name: &str, user_name: &str) -> Result<Option<User>>;

    /// List the account's users whose path starts with `path_prefix`
    async fn find_all_users(&self, account_name: &str, path_prefix: &str) -> Result<Vec<User>>;

    /// Fails with `Conflict` if the name is taken within the account
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Fails with `DependentsRemain` while the user still holds access keys
    async fn delete_user(&self, user: &User) -> Result<()>;
}

/// Access keys, unique by id across all users
#[async_trait]
pub trait AccessKeyStore: Send + Sync {
    async fn find_access_key(&self, access_key_id: &str) -> Result<Option<AccessKey>>;

    /// Every key held by the user, oldest first
    async fn find_all_access_keys(&self, user_id: &str) -> Result<Vec<AccessKey>>;

    /// The user's primary key: the oldest active one
    async fn find_account_access_key(&self, user_id: &str) -> Result<Option<AccessKey>>;

    /// Fails with `Conflict` if the id is already in use
    async fn save_access_key(&self, key: &AccessKey) -> Result<()>;

    async fn delete_access_key(&self, key: &AccessKey) -> Result<()>;
}

/// Roles within an account
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// List the account's roles whose path starts with `path_prefix`
    async fn find_all_roles(&self, account_name: &str, path_prefix: &str) -> Result<Vec<Role>>;

    async fn save_role(&self, role: &Role) -> Result<()>;

    async fn delete_role(&self, role: &Role) -> Result<()>;
}

//! # IAM Core - Account Lifecycle
//!
//! Account-level operations of the IAM service on top of a directory store:
//! create an account with its root user and root access key, list accounts,
//! delete an account with a cascading teardown, and reset the root access key.
//!
//! The building blocks are usable on their own:
//!
//! - [`allocator`]: identifier and secret generation, canonical id probing
//! - [`provisioner`]: root access key provisioning with uniqueness checks
//! - [`authorization`]: delete authorization strategies
//! - [`cascade`]: ordered deletion of an account's subordinate entries
//! - [`notifier`]: post-commit change notifications

#![deny(unsafe_code)]

pub mod allocator;
pub mod authorization;
pub mod cascade;
pub mod error;
pub mod lifecycle;
pub mod notifier;
pub mod provisioner;
pub mod validation;

pub use allocator::{IdAllocator, RandomIdAllocator, allocate_canonical_id};
pub use authorization::DeleteAuthorization;
pub use cascade::{CascadeReport, CascadeStep, CascadingDelete};
pub use error::{AccountError, AccountResult, ErrorKind};
pub use lifecycle::{AccountLifecycleManager, AccountWithKey, CreateAccountRequest};
pub use notifier::{ChangeNotifier, LoggingNotifier, NoopNotifier, NotifyOutcome};
pub use provisioner::{AccessKeyProvisioner, KeyRequest};

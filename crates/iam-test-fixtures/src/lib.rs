//! Test fixtures for IAM account service tests
//!
//! Deterministic identifier allocation, a fault-injecting store wrapper, a
//! recording notifier and helpers to seed directory state.

#![deny(unsafe_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod allocator;
pub mod faulty_store;
pub mod notifier;
pub mod proptest_config;
pub mod seed;

pub use allocator::SequenceAllocator;
pub use faulty_store::{FaultyStore, StoreOp};
pub use notifier::{Notification, RecordingNotifier};
pub use seed::{Seeded, seed_account, seed_role, seed_user};

//! Deterministic identifier allocation
//!
//! The first value of each kind is a fixed well-known value; later values
//! append a counter so repeated creations stay unique. Canonical ids and
//! access key ids can be scripted to force collisions.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use iam_core::IdAllocator;
use iam_types::{AccountId, CanonicalId};

pub const FIRST_ACCOUNT_ID: u64 = 987_654_352_188;
pub const FIRST_CANONICAL_ID: &str = "can1234";
pub const FIRST_ACCESS_KEY_ID: &str = "AKIASIAS";
pub const FIRST_SECRET_KEY: &str = "htuspscae/123";

#[derive(Default)]
pub struct SequenceAllocator {
    canonical_script: Mutex<VecDeque<String>>,
    access_key_script: Mutex<VecDeque<String>>,
    accounts: AtomicU64,
    canonicals: AtomicU64,
    opaques: AtomicU64,
    access_keys: AtomicU64,
    secrets: AtomicU64,
}

fn nth(base: &str, n: u64) -> String {
    if n == 0 { base.to_string() } else { format!("{base}{n}") }
}

impl SequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out these canonical ids first, in order
    pub fn with_canonical_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.canonical_script.lock().unwrap().extend(ids.into_iter().map(Into::into));
        self
    }

    /// Hand out these access key ids first, in order
    pub fn with_access_key_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.access_key_script.lock().unwrap().extend(ids.into_iter().map(Into::into));
        self
    }
}

impl IdAllocator for SequenceAllocator {
    fn account_id(&self) -> AccountId {
        let n = self.accounts.fetch_add(1, Ordering::SeqCst);
        AccountId((FIRST_ACCOUNT_ID + n).to_string())
    }

    fn canonical_id(&self) -> CanonicalId {
        if let Some(id) = self.canonical_script.lock().unwrap().pop_front() {
            return CanonicalId(id);
        }
        CanonicalId(nth(FIRST_CANONICAL_ID, self.canonicals.fetch_add(1, Ordering::SeqCst)))
    }

    fn opaque_id(&self) -> String {
        format!("AIDA{:04}", self.opaques.fetch_add(1, Ordering::SeqCst))
    }

    fn access_key_id(&self) -> String {
        if let Some(id) = self.access_key_script.lock().unwrap().pop_front() {
            return id;
        }
        nth(FIRST_ACCESS_KEY_ID, self.access_keys.fetch_add(1, Ordering::SeqCst))
    }

    fn secret_key(&self) -> String {
        nth(FIRST_SECRET_KEY, self.secrets.fetch_add(1, Ordering::SeqCst))
    }
}

//! Identifier Allocator
//!
//! Generates account ids, canonical ids, opaque entity ids and access key
//! material. Canonical ids must be globally unique, so
//! [`allocate_canonical_id`] probes the store for each candidate and draws
//! again on collision.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use iam_store::{AccountStore, DirectoryStore};
use iam_types::{AccountId, CanonicalId};
use rand::Rng;

use crate::error::{AccountError, AccountResult};

const ACCESS_KEY_PREFIX: &str = "AK";
const ACCESS_KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const ACCESS_KEY_RANDOM_LEN: usize = 18;

/// Source of identifiers and secret material
pub trait IdAllocator: Send + Sync {
    /// 12 decimal digits, first digit non-zero
    fn account_id(&self) -> AccountId;

    /// Candidate canonical id; uniqueness is checked by the caller
    fn canonical_id(&self) -> CanonicalId;

    /// Opaque id for users and roles
    fn opaque_id(&self) -> String;

    /// Candidate access key id; uniqueness is checked by the caller
    fn access_key_id(&self) -> String;

    fn secret_key(&self) -> String;
}

/// Allocator backed by the thread-local CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdAllocator;

impl IdAllocator for RandomIdAllocator {
    fn account_id(&self) -> AccountId {
        let mut rng = rand::rng();
        let mut id = String::with_capacity(12);
        id.push(char::from(b'0' + rng.random_range(1..=9u8)));
        for _ in 0..11 {
            id.push(char::from(b'0' + rng.random_range(0..=9u8)));
        }
        AccountId(id)
    }

    fn canonical_id(&self) -> CanonicalId {
        let bytes: [u8; 32] = rand::rng().random();
        CanonicalId(hex::encode(bytes))
    }

    fn opaque_id(&self) -> String {
        let bytes: [u8; 16] = rand::rng().random();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn access_key_id(&self) -> String {
        let mut rng = rand::rng();
        let mut id = String::with_capacity(ACCESS_KEY_PREFIX.len() + ACCESS_KEY_RANDOM_LEN);
        id.push_str(ACCESS_KEY_PREFIX);
        for _ in 0..ACCESS_KEY_RANDOM_LEN {
            id.push(char::from(ACCESS_KEY_ALPHABET[rng.random_range(0..ACCESS_KEY_ALPHABET.len())]));
        }
        id
    }

    fn secret_key(&self) -> String {
        let bytes: [u8; 30] = rand::rng().random();
        STANDARD.encode(bytes)
    }
}

/// Draw canonical ids until one is not used by any account.
///
/// `max_attempts` bounds the number of store probes. Collisions and store
/// faults both consume an attempt; running out is an internal failure since
/// canonical ids are never chosen by the caller.
pub async fn allocate_canonical_id(
    store: &dyn DirectoryStore,
    allocator: &dyn IdAllocator,
    max_attempts: u32,
) -> AccountResult<CanonicalId> {
    let mut last_fault = None;

    for attempt in 1..=max_attempts {
        let candidate = allocator.canonical_id();
        match store.find_account_by_canonical_id(&candidate).await {
            Ok(None) => return Ok(candidate),
            Ok(Some(_)) => {
                iam_observe::metrics::record_canonical_id_collision();
                tracing::debug!(attempt, "Canonical id collision, drawing a new candidate");
            },
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Canonical id probe failed");
                last_fault = Some(e);
            },
        }
    }

    tracing::error!(max_attempts, last_fault = ?last_fault, "Canonical id allocation exhausted");
    Err(AccountError::Internal(format!("no free canonical id after {max_attempts} attempts")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::sync::Mutex;

    use iam_store::MemoryBackend;
    use iam_types::Account;

    use super::*;

    /// Hands out canonical ids from a fixed list
    struct ScriptedCanonical(Mutex<Vec<&'static str>>);

    impl IdAllocator for ScriptedCanonical {
        fn account_id(&self) -> AccountId {
            AccountId("123456789012".into())
        }
        fn canonical_id(&self) -> CanonicalId {
            CanonicalId(self.0.lock().unwrap().remove(0).to_string())
        }
        fn opaque_id(&self) -> String {
            "opaque".into()
        }
        fn access_key_id(&self) -> String {
            "AKTEST".into()
        }
        fn secret_key(&self) -> String {
            "secret".into()
        }
    }

    #[test]
    fn test_account_id_format() {
        for _ in 0..100 {
            let id = RandomIdAllocator.account_id();
            assert_eq!(id.as_str().len(), 12);
            assert!(id.as_str().chars().all(|c| c.is_ascii_digit()));
            assert_ne!(id.as_str().as_bytes()[0], b'0');
        }
    }

    #[test]
    fn test_canonical_id_format() {
        let id = RandomIdAllocator.canonical_id();
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(id, RandomIdAllocator.canonical_id());
    }

    #[test]
    fn test_opaque_id_format() {
        let id = RandomIdAllocator.opaque_id();
        assert_eq!(id.len(), 22);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_access_key_format() {
        let id = RandomIdAllocator.access_key_id();
        assert_eq!(id.len(), 20);
        assert!(id.starts_with("AK"));
        assert!(id[2..].bytes().all(|b| ACCESS_KEY_ALPHABET.contains(&b)));

        let secret = RandomIdAllocator.secret_key();
        assert_eq!(secret.len(), 40);
    }

    #[tokio::test]
    async fn test_canonical_id_retries_on_collision() {
        let store = MemoryBackend::new();
        for (name, canonical) in [("first", "can0"), ("second", "can1")] {
            let account = Account::new(AccountId("123456789012".into()), CanonicalId(canonical.into()), name, "a@b.c");
            store.save_account(&account).await.unwrap();
        }

        let allocator = ScriptedCanonical(Mutex::new(vec!["can0", "can1", "can1234"]));
        let id = allocate_canonical_id(&store, &allocator, 10).await.unwrap();
        assert_eq!(id.as_str(), "can1234");
    }

    #[tokio::test]
    async fn test_canonical_id_exhaustion_is_internal() {
        let store = MemoryBackend::new();
        let account = Account::new(AccountId("123456789012".into()), CanonicalId("can0".into()), "first", "a@b.c");
        store.save_account(&account).await.unwrap();

        let allocator = ScriptedCanonical(Mutex::new(vec!["can0", "can0", "can0"]));
        let result = allocate_canonical_id(&store, &allocator, 3).await;
        assert!(matches!(result, Err(AccountError::Internal(_))));
    }
}

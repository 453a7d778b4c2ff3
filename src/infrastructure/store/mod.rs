//! Typed adapter between ledger documents and the raw key-value store.
//! Owns the retry policy for transient store failures and the per-document
//! locks that close the read-modify-write race.

use crate::core::errors::BalancerError;
use crate::core::models::balance::Balance;
use crate::core::models::user::User;
use crate::infrastructure::kv::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

const BALANCE_KEY_PREFIX: &str = "balance:";
const USER_KEY_PREFIX: &str = "user:";

/// Transient store failures are retried this many times per get/put before
/// the whole operation is abandoned.
const STORE_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Upper bound on waiting for a per-document lock; exceeding it reports a
/// retryable conflict instead of parking the request indefinitely.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

type LockMap = Mutex<HashMap<String, Arc<Mutex<()>>>>;

pub struct LedgerStore<K: KeyValueStore> {
    kv: K,
    // entries are never reclaimed; bounded by the number of documents
    // touched by this process
    balance_locks: LockMap,
    user_locks: LockMap,
}

impl<K: KeyValueStore> LedgerStore<K> {
    pub fn new(kv: K) -> Self {
        LedgerStore {
            kv,
            balance_locks: Mutex::new(HashMap::new()),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Serializes every read-modify-write against one balance document.
    /// Hold the guard across get, compute and put.
    pub async fn lock_balance(
        &self,
        balance_id: &str,
    ) -> Result<OwnedMutexGuard<()>, BalancerError> {
        Self::acquire(&self.balance_locks, balance_id).await
    }

    /// Same as [`Self::lock_balance`] for user documents. Lock ordering is
    /// always balance before user.
    pub async fn lock_user(&self, user_id: &str) -> Result<OwnedMutexGuard<()>, BalancerError> {
        Self::acquire(&self.user_locks, user_id).await
    }

    async fn acquire(locks: &LockMap, key: &str) -> Result<OwnedMutexGuard<()>, BalancerError> {
        let entry = {
            let mut locks = locks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        tokio::time::timeout(LOCK_TIMEOUT, entry.lock_owned())
            .await
            .map_err(|_| BalancerError::Conflict(key.to_string()))
    }

    pub async fn get_balance(&self, balance_id: &str) -> Result<Option<Balance>, BalancerError> {
        self.get_doc(&format!("{BALANCE_KEY_PREFIX}{balance_id}"))
            .await
    }

    pub async fn put_balance(&self, balance: &Balance) -> Result<(), BalancerError> {
        self.put_doc(&format!("{BALANCE_KEY_PREFIX}{}", balance.id), balance)
            .await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, BalancerError> {
        self.get_doc(&format!("{USER_KEY_PREFIX}{user_id}")).await
    }

    pub async fn put_user(&self, user: &User) -> Result<(), BalancerError> {
        self.put_doc(&format!("{USER_KEY_PREFIX}{}", user.id), user)
            .await
    }

    async fn get_doc<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, BalancerError> {
        match self.get_with_retry(key).await? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|err| {
                BalancerError::Internal(format!("corrupt document at {key}: {err}"))
            }),
        }
    }

    async fn put_doc<T: Serialize>(&self, key: &str, doc: &T) -> Result<(), BalancerError> {
        let bytes = serde_json::to_vec(doc)
            .map_err(|err| BalancerError::Internal(format!("encoding {key}: {err}")))?;
        self.put_with_retry(key, bytes).await
    }

    async fn get_with_retry(&self, key: &str) -> Result<Option<Vec<u8>>, BalancerError> {
        let mut attempt = 1;
        loop {
            match self.kv.get(key).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < STORE_ATTEMPTS => {
                    warn!("get {} failed on attempt {}: {}", key, attempt, err);
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn put_with_retry(&self, key: &str, bytes: Vec<u8>) -> Result<(), BalancerError> {
        let mut attempt = 1;
        loop {
            match self.kv.put(key, bytes.clone()).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_retryable() && attempt < STORE_ATTEMPTS => {
                    warn!("put {} failed on attempt {}: {}", key, attempt, err);
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

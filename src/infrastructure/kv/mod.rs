pub mod in_memory;

use crate::core::errors::BalancerError;
use async_trait::async_trait;

/// Narrow contract of the external key-value store: whole-document get/put
/// by opaque key. No transactions, no field-level patch, no conditional
/// writes. Transient failures surface as `StoreUnavailable`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BalancerError>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), BalancerError>;
}

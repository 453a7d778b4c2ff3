use crate::core::errors::BalancerError;
use crate::infrastructure::kv::KeyValueStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local key-value store with the same observable semantics as the
/// external one: whole values in, whole values out, last write wins.
#[derive(Clone)]
pub struct InMemoryKv {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        InMemoryKv {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BalancerError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), BalancerError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

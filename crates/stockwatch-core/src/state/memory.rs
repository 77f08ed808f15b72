// # Memory State Store
//
// In-memory implementation of StateStore.
//
// Nothing survives a restart: the first cycle after a restart treats every
// key as unknown and only seeds state. Useful for tests and dry runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::model::StateKey;
use crate::traits::state_store::StateStore;

/// In-memory state store implementation
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<StateKey, String>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of keys in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: &StateKey) -> Result<Option<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).filter(|token| !token.is_empty()).cloned())
    }

    async fn save(&self, key: &StateKey, token: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(key.clone(), token.to_string());
        Ok(())
    }
}

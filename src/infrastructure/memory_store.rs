// In-memory persistence backend
use crate::application::persistence::Persistence;
use crate::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn save(&self, key: &str, blob: Bytes) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), blob);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::storage::BlobStore;

/// Process-local blob store, used for tests and throwaway deployments
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryStorage {
    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn storage_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_reads_back() {
        let store = MemoryStorage::new();
        store.put("k", Bytes::from_static(b"abc")).await.unwrap();

        assert_eq!(&store.get("k").await.unwrap()[..], b"abc");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let store = MemoryStorage::new();
        assert!(matches!(store.get("k").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn rejects_empty_key() {
        let store = MemoryStorage::new();
        assert!(store.put("", Bytes::new()).await.is_err());
        assert_eq!(store.len().await, 0);
    }
}

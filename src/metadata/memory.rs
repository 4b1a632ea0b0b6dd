use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::metadata::MetadataStore;
use crate::models::{FileId, FileRecord};

/// Process-local metadata store
#[derive(Default)]
pub struct MemoryMetadataStore {
    records: RwLock<HashMap<FileId, FileRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn insert(&self, record: &FileRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(StoreError::Backend(format!("Duplicate file id {}", record.id)));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &FileId) -> StoreResult<Option<FileRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }
}

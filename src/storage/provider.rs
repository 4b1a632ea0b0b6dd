use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreResult;

/// Key-addressed byte storage.
///
/// A successful `put` must be visible to a subsequent `get` of the same key.
/// `get` of an unknown key fails with `StoreError::NotFound`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store data under `key`
    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()>;

    /// Read the data stored under `key`
    async fn get(&self, key: &str) -> StoreResult<Bytes>;

    /// Get the storage type name
    fn storage_type(&self) -> &'static str;
}

pub mod local;
pub mod memory;
pub mod provider;
pub mod s3;

pub use local::*;
pub use memory::*;
pub use provider::*;
pub use s3::*;

use std::sync::Arc;

use crate::config::{BlobBackend, StorageConfig};

/// Build the blob store selected in the configuration
pub async fn from_config(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.backend {
        BlobBackend::Local => Arc::new(LocalStorage::new(&config.local_path)),
        BlobBackend::Memory => {
            tracing::warn!("Using in-memory blob storage, content is lost on restart");
            Arc::new(MemoryStorage::new())
        }
        BlobBackend::S3 => {
            let store = S3Storage::new(&config.s3).await;
            store.ensure_bucket().await?;
            tracing::info!(
                "Using object storage at {} (bucket {})",
                config.s3.endpoint,
                config.s3.bucket
            );
            Arc::new(store)
        }
    };

    Ok(store)
}

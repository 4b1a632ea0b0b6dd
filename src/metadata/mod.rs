pub mod memory;
pub mod sqlite;

pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, MetadataBackend};
use crate::db::Database;
use crate::error::StoreResult;
use crate::models::{FileId, FileRecord};

/// Durable storage of file records, keyed by `FileId`.
///
/// Single-record inserts and lookups are atomic; a second insert with an
/// existing id must fail.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert(&self, record: &FileRecord) -> StoreResult<()>;

    /// `Ok(None)` when no record exists for `id`
    async fn find_by_id(&self, id: &FileId) -> StoreResult<Option<FileRecord>>;
}

/// Build the metadata store selected in the configuration
pub async fn from_config(config: &Config) -> anyhow::Result<Arc<dyn MetadataStore>> {
    match config.metadata.backend {
        MetadataBackend::Sqlite => {
            let db = Database::new(&config.database.path).await?;
            db.run_migrations().await?;
            tracing::info!("Database initialized at {}", config.database.path);
            Ok(Arc::new(SqliteMetadataStore::new(db)))
        }
        MetadataBackend::Memory => {
            tracing::warn!("Using in-memory metadata store, records are lost on restart");
            Ok(Arc::new(MemoryMetadataStore::new()))
        }
    }
}

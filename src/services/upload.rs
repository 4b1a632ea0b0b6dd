use bytes::Bytes;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::FileError;
use crate::metadata::MetadataStore;
use crate::models::{BlobLocation, FileId, FileRecord};
use crate::services::cancellable;
use crate::storage::BlobStore;

/// Stores new files: content first, then metadata
#[derive(Clone)]
pub struct UploadService {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl UploadService {
    pub fn new(blobs: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { blobs, metadata }
    }

    /// Upload a file and return its new identifier.
    ///
    /// The blob is written before the record so an identifier is never
    /// observable without its content. A failure or cancellation after the
    /// blob write leaves an orphaned blob, which is logged for reconciliation.
    pub async fn upload(
        &self,
        content: Bytes,
        display_name: &str,
        cancel: &CancellationToken,
    ) -> Result<FileId, FileError> {
        if display_name.trim().is_empty() {
            return Err(FileError::InvalidInput("File name must be provided.".to_string()));
        }

        let location = BlobLocation::for_upload(display_name);
        let size = content.len() as u64;

        cancellable(cancel, self.blobs.put(location.as_str(), content))
            .await?
            .map_err(|e| {
                tracing::error!(
                    location = %location,
                    storage = self.blobs.storage_type(),
                    error = %e,
                    "Blob write failed"
                );
                FileError::StorageWriteFailed(e)
            })?;

        let record = FileRecord::new(display_name, location, size);

        match cancellable(cancel, self.metadata.insert(&record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(
                    file_id = %record.id,
                    location = %record.location,
                    error = %e,
                    "Metadata write failed, blob is orphaned"
                );
                return Err(FileError::MetadataWriteFailed(e));
            }
            Err(cancelled) => {
                tracing::warn!(
                    file_id = %record.id,
                    location = %record.location,
                    "Upload cancelled after blob write, blob may be orphaned"
                );
                return Err(cancelled);
            }
        }

        tracing::info!(
            file_id = %record.id,
            location = %record.location,
            size,
            "File uploaded"
        );
        Ok(record.id)
    }
}

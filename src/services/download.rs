use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::{FileError, StoreError};
use crate::metadata::MetadataStore;
use crate::models::{DownloadedFile, FileId};
use crate::services::cancellable;
use crate::storage::BlobStore;

/// Reassembles stored files from their record and blob
#[derive(Clone)]
pub struct DownloadService {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl DownloadService {
    pub fn new(blobs: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { blobs, metadata }
    }

    /// Fetch the content and display name of a stored file.
    ///
    /// `NotFound` only means "no record"; a record whose blob cannot be read
    /// is a `StorageReadFailed`.
    pub async fn download(
        &self,
        id: &FileId,
        cancel: &CancellationToken,
    ) -> Result<DownloadedFile, FileError> {
        let record = cancellable(cancel, self.metadata.find_by_id(id))
            .await?
            .map_err(|e| {
                tracing::error!(file_id = %id, error = %e, "Metadata lookup failed");
                FileError::StorageReadFailed(e)
            })?
            .ok_or(FileError::NotFound(*id))?;

        let content = cancellable(cancel, self.blobs.get(record.location.as_str()))
            .await?
            .map_err(|e| {
                if matches!(e, StoreError::NotFound(_)) {
                    tracing::error!(
                        file_id = %id,
                        location = %record.location,
                        "Record exists but its blob is missing"
                    );
                } else {
                    tracing::error!(
                        file_id = %id,
                        location = %record.location,
                        storage = self.blobs.storage_type(),
                        error = %e,
                        "Blob read failed"
                    );
                }
                FileError::StorageReadFailed(e)
            })?;

        tracing::debug!(file_id = %id, size = content.len(), "File downloaded");
        Ok(DownloadedFile {
            content,
            name: record.name,
        })
    }
}

pub mod file;
pub mod grpc;

use std::time::Duration;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Per-request cancellation: fires when the timeout elapses or when the
/// returned guard is dropped (client went away or the handler finished).
pub fn request_token(timeout: Duration) -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let timer = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!("Request exceeded {:?}, cancelling", timeout);
                timer.cancel();
            }
            _ = timer.cancelled() => {}
        }
    });

    let guard = token.clone().drop_guard();
    (token, guard)
}

/// MIME type presented to clients, guessed from the stored file name
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::metadata::{MemoryMetadataStore, MetadataStore};
    use crate::services::{DownloadService, UploadService};
    use crate::storage::{BlobStore, MemoryStorage};
    use crate::{create_router, AppState};

    pub fn router_with_config(
        config: Config,
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Router {
        let state = AppState {
            config: Arc::new(config),
            uploads: UploadService::new(blobs.clone(), metadata.clone()),
            downloads: DownloadService::new(blobs, metadata),
        };
        create_router(state)
    }

    pub fn router_with(blobs: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataStore>) -> Router {
        router_with_config(Config::default(), blobs, metadata)
    }

    pub fn memory_router() -> Router {
        router_with(Arc::new(MemoryStorage::new()), Arc::new(MemoryMetadataStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("report.PDF"), "application/pdf");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }

    #[tokio::test]
    async fn token_fires_after_timeout() {
        let (token, _guard) = request_token(Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(5), token.cancelled())
            .await
            .expect("token should be cancelled by the timer");
    }

    #[tokio::test]
    async fn token_fires_when_guard_dropped() {
        let (token, guard) = request_token(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
        drop(guard);
        assert!(token.is_cancelled());
    }
}

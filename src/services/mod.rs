pub mod download;
pub mod upload;

pub use download::DownloadService;
pub use upload::UploadService;

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::FileError;

/// Await a store call unless `cancel` fires first.
///
/// A token that is already cancelled wins before the call is polled, so the
/// store is never touched.
async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T, FileError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FileError::Cancelled),
        out = fut => Ok(out),
    }
}

//! gRPC front-end exposing `FileStorage.UploadFile` and `FileStorage.DownloadFile`.

use bytes::Bytes;
use std::time::Duration;
use tonic::{Request, Response, Status};

use crate::error::FileError;
use crate::handlers::{content_type_for, request_token};
use crate::models::FileId;
use crate::services::{DownloadService, UploadService};
use crate::AppState;

pub mod proto {
    tonic::include_proto!("file_storage");
}

use proto::file_storage_server::{FileStorage, FileStorageServer};
use proto::{DownloadFileReply, FileRequest, UploadFileReply, UploadFileRequest};

#[derive(Clone)]
pub struct FileStorageService {
    uploads: UploadService,
    downloads: DownloadService,
    request_timeout: Duration,
}

impl FileStorageService {
    pub fn new(state: &AppState) -> Self {
        Self {
            uploads: state.uploads.clone(),
            downloads: state.downloads.clone(),
            request_timeout: Duration::from_secs(state.config.server.request_timeout_secs),
        }
    }

    /// Wrap into a tonic server that rejects messages above `max_message_bytes`
    pub fn into_server(self, max_message_bytes: usize) -> FileStorageServer<Self> {
        FileStorageServer::new(self)
            .max_decoding_message_size(max_message_bytes)
            .max_encoding_message_size(max_message_bytes)
    }
}

#[tonic::async_trait]
impl FileStorage for FileStorageService {
    async fn upload_file(
        &self,
        request: Request<UploadFileRequest>,
    ) -> Result<Response<UploadFileReply>, Status> {
        let request = request.into_inner();

        let (cancel, _guard) = request_token(self.request_timeout);
        let file_id = self
            .uploads
            .upload(Bytes::from(request.content), &request.file_name, &cancel)
            .await?;

        Ok(Response::new(UploadFileReply {
            file_id: file_id.to_string(),
        }))
    }

    async fn download_file(
        &self,
        request: Request<FileRequest>,
    ) -> Result<Response<DownloadFileReply>, Status> {
        let file_id = FileId::parse(&request.get_ref().file_id)?;

        let (cancel, _guard) = request_token(self.request_timeout);
        let file = self.downloads.download(&file_id, &cancel).await?;

        Ok(Response::new(DownloadFileReply {
            content: file.content.to_vec(),
            content_type: content_type_for(&file.name),
            file_name: file.name,
        }))
    }
}

impl From<FileError> for Status {
    fn from(err: FileError) -> Self {
        match err {
            FileError::InvalidInput(msg) => Status::invalid_argument(msg),
            FileError::InvalidIdentifier(_) => Status::invalid_argument("Invalid FileId format."),
            FileError::NotFound(id) => Status::not_found(format!("File with ID={} not found.", id)),
            FileError::Cancelled => Status::cancelled("Request cancelled"),
            other => {
                tracing::error!(error = ?other, "gRPC storage error");
                Status::internal("Server error")
            }
        }
    }
}

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use bytes::Bytes;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::handlers::{content_type_for, request_token};
use crate::models::{FileId, UploadFileResponse};
use crate::AppState;

/// Liveness ping
/// GET /
pub async fn ping() -> &'static str {
    "FileStoringService API is running."
}

/// Upload a file
/// POST /api/files/upload (multipart field `file`)
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadFileResponse>> {
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        file = Some((file_name, data));
    }

    let (file_name, data) = match file {
        Some((name, data)) if !data.is_empty() => (name, data),
        _ => return Err(AppError::BadRequest("File is required.".to_string())),
    };

    let (cancel, _guard) = request_token(Duration::from_secs(state.config.server.request_timeout_secs));
    let file_id = state.uploads.upload(data, &file_name, &cancel).await?;

    Ok(Json(UploadFileResponse {
        file_id: file_id.to_string(),
    }))
}

/// Download a file
/// GET /api/files/:id
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let file_id = FileId::parse(&id)?;

    let (cancel, _guard) = request_token(Duration::from_secs(state.config.server.request_timeout_secs));
    let file = state.downloads.download(&file_id, &cancel).await?;

    let fallback_name = ascii_fallback_name(&file.name);
    let encoded_name = urlencoding::encode(&file.name);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&file.name))
        .header(header::CONTENT_LENGTH, file.content.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"; filename*=UTF-8''{}",
                fallback_name, encoded_name
            ),
        )
        .body(Body::from(file.content))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Plain `filename=` value for clients that ignore `filename*`
fn ascii_fallback_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(format!("Failed to process multipart: {}", e.body_text()))
    }
}

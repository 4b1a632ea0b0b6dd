use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::FileId;

/// Longest sanitized file name kept in a blob key
const MAX_KEY_NAME_LEN: usize = 200;

/// Key of a file's content inside the blob store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocation(String);

impl BlobLocation {
    pub fn new(value: impl Into<String>) -> Result<Self, StoreError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(StoreError::InvalidKey("blob location must not be empty".to_string()));
        }
        Ok(Self(value))
    }

    /// Derive a fresh location for an upload: `<uuid>_<sanitized name>`.
    ///
    /// The random prefix keeps keys unique even when the same name is
    /// uploaded concurrently.
    pub fn for_upload(display_name: &str) -> Self {
        Self(format!("{}_{}", Uuid::new_v4(), sanitize_key_name(display_name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client file names are untrusted: keep `[A-Za-z0-9._-]`, replace the rest.
fn sanitize_key_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return "file".to_string();
    }

    // ASCII only at this point, so byte truncation is char-safe
    cleaned[..cleaned.len().min(MAX_KEY_NAME_LEN)].to_string()
}

/// Metadata of a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    pub location: BlobLocation,
    pub size: u64,
    pub created_at: String,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, location: BlobLocation, size: u64) -> Self {
        Self {
            id: FileId::new(),
            name: name.into(),
            location,
            size,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Row of the `files` table
#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub size: i64,
    pub created_at: String,
}

impl TryFrom<FileRow> for FileRecord {
    type Error = StoreError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let id = FileId::parse(&row.id)
            .map_err(|_| StoreError::Backend(format!("Corrupt file id in metadata: {}", row.id)))?;

        Ok(Self {
            id,
            name: row.name,
            location: BlobLocation::new(row.location)?,
            size: u64::try_from(row.size).unwrap_or_default(),
            created_at: row.created_at,
        })
    }
}

/// A file reassembled from its metadata and content
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub content: Bytes,
    pub name: String,
}

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileResponse {
    pub file_id: String,
}

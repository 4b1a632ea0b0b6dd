use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::{primitives::ByteStream, Client};
use bytes::Bytes;

use crate::config::S3Config;
use crate::error::{StoreError, StoreResult};
use crate::storage::BlobStore;

/// Blob store on an S3-compatible object service (MinIO, RustFS, AWS)
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub async fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "filestore",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint.clone())
            .load()
            .await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true)
                .build(),
        );

        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }

    /// Create the bucket when it does not exist yet
    pub async fn ensure_bucket(&self) -> StoreResult<()> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }

        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::info!("Created bucket {}", self.bucket);
                Ok(())
            }
            Err(e) => match e.into_service_error() {
                CreateBucketError::BucketAlreadyOwnedByYou(_) => Ok(()),
                other => Err(StoreError::Backend(format!(
                    "failed to create bucket {}: {}",
                    self.bucket,
                    DisplayErrorContext(&other)
                ))),
            },
        }
    }
}

/// Classify a failed `GetObject` call
fn get_object_error(key: &str, err: GetObjectError) -> StoreError {
    match err {
        GetObjectError::NoSuchKey(_) => StoreError::NotFound(key.to_string()),
        other => StoreError::Backend(format!("get {}: {}", key, DisplayErrorContext(&other))),
    }
}

#[async_trait]
impl BlobStore for S3Storage {
    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }

        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(size as i64)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("put {}: {}", key, DisplayErrorContext(&e))))?;

        tracing::debug!(bucket = %self.bucket, key, size, "Saved blob to object storage");
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| get_object_error(key, e.into_service_error()))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(format!("read {}: {}", key, e)))?;

        Ok(data.into_bytes())
    }

    fn storage_type(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::types::error::{InvalidObjectState, NoSuchKey};

    #[test]
    fn missing_key_is_not_found() {
        let err = get_object_error("abc_a.bin", GetObjectError::NoSuchKey(NoSuchKey::builder().build()));
        match err {
            StoreError::NotFound(key) => assert_eq!(key, "abc_a.bin"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn other_service_errors_are_backend_failures() {
        let err = get_object_error(
            "abc_a.bin",
            GetObjectError::InvalidObjectState(InvalidObjectState::builder().build()),
        );
        assert!(matches!(err, StoreError::Backend(_)), "{:?}", err);
    }
}

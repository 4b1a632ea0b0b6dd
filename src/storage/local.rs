use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{StoreError, StoreResult};
use crate::storage::BlobStore;

/// Local file system blob store
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Resolve `key` under the base directory, refusing anything that could
    /// step outside of it.
    fn get_full_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }

        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalStorage {
    async fn put(&self, key: &str, data: Bytes) -> StoreResult<()> {
        let full_path = self.get_full_path(key)?;

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(&data).await?;
        file.flush().await?;
        file.sync_all().await?;

        tracing::debug!("Saved blob to {:?}", full_path);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Bytes> {
        let full_path = self.get_full_path(key)?;

        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(key.to_string())
            } else {
                StoreError::Io(e)
            }
        })?;

        Ok(Bytes::from(data))
    }

    fn storage_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorage::new(dir.path());

        store.put("abc_a.bin", Bytes::from_static(&[1, 2, 3])).await.unwrap();
        let data = store.get("abc_a.bin").await.unwrap();

        assert_eq!(&data[..], &[1, 2, 3]);
        assert!(dir.path().join("abc_a.bin").exists());
    }

    #[tokio::test]
    async fn creates_missing_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorage::new(dir.path().join("nested").join("blobs"));

        store.put("k", Bytes::from_static(b"hello")).await.unwrap();
        assert_eq!(&store.get("k").await.unwrap()[..], b"hello");
    }

    #[tokio::test]
    async fn empty_content_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorage::new(dir.path());

        store.put("empty", Bytes::new()).await.unwrap();
        assert!(store.get("empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorage::new(dir.path());

        match store.get("nope").await {
            Err(StoreError::NotFound(key)) => assert_eq!(key, "nope"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejects_keys_escaping_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorage::new(dir.path().join("blobs"));

        for key in ["../outside", "/etc/passwd", "a/../../b", "", "./x"] {
            let err = store.put(key, Bytes::from_static(b"x")).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "{key}: {err:?}");
        }
        assert!(!dir.path().join("outside").exists());
    }
}

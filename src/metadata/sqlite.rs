use async_trait::async_trait;

use crate::db::Database;
use crate::error::StoreResult;
use crate::metadata::MetadataStore;
use crate::models::{FileId, FileRecord, FileRow};

/// `files` table in SQLite
#[derive(Clone)]
pub struct SqliteMetadataStore {
    db: Database,
}

impl SqliteMetadataStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn insert(&self, record: &FileRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO files (id, name, location, size, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.name)
        .bind(record.location.as_str())
        .bind(i64::try_from(record.size).unwrap_or(i64::MAX))
        .bind(&record.created_at)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &FileId) -> StoreResult<Option<FileRecord>> {
        let row: Option<FileRow> = sqlx::query_as(
            "SELECT id, name, location, size, created_at FROM files WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.db.pool())
        .await?;

        row.map(FileRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::BlobLocation;

    async fn store() -> SqliteMetadataStore {
        let db = Database::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        SqliteMetadataStore::new(db)
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let store = store().await;
        let record = FileRecord::new("report.pdf", BlobLocation::for_upload("report.pdf"), 42);

        store.insert(&record).await.unwrap();
        let found = store.find_by_id(&record.id).await.unwrap();

        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn unknown_id_is_absent() {
        let store = store().await;
        assert!(store.find_by_id(&FileId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = store().await;
        let record = FileRecord::new("a.bin", BlobLocation::for_upload("a.bin"), 1);
        store.insert(&record).await.unwrap();

        let mut clash = FileRecord::new("b.bin", BlobLocation::for_upload("b.bin"), 1);
        clash.id = record.id;

        assert!(matches!(store.insert(&clash).await, Err(StoreError::Database(_))));
        assert_eq!(store.find_by_id(&record.id).await.unwrap().unwrap().name, "a.bin");
    }

    #[tokio::test]
    async fn duplicate_location_is_rejected() {
        let store = store().await;
        let location = BlobLocation::for_upload("a.bin");
        store.insert(&FileRecord::new("a.bin", location.clone(), 1)).await.unwrap();

        let err = store.insert(&FileRecord::new("a.bin", location, 1)).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn keeps_display_name_verbatim() {
        let store = store().await;
        let name = "  отчёт (final).pdf ";
        let record = FileRecord::new(name, BlobLocation::for_upload(name), 0);
        store.insert(&record).await.unwrap();

        let found = store.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(found.name, name);
    }
}

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::info;

use crate::errors::StoreError;
use crate::records::store::{record_key, Record, RecordStore};
use crate::storage::json_map_store::JsonMapStore;

/// File-backed record table.
/// Keeps a map of `student_id -> record` persisted as JSON, so records
/// survive restarts.
#[derive(Clone)]
pub struct FileRecordStore {
    table: String,
    store: Arc<JsonMapStore<String, Record>>,
}

impl FileRecordStore {
    /// Open the table at the given file path. Creates the file if missing.
    pub async fn open<P: Into<PathBuf>>(table: &str, path: P) -> Result<Self, StoreError> {
        let path = path.into();
        let store = JsonMapStore::<String, Record>::new(path.clone()).await?;
        let rows = store.len().await;
        info!(table, path = %path.display(), rows, "file record store loaded");
        Ok(Self { table: table.to_string(), store })
    }

    pub fn table(&self) -> &str { &self.table }

    pub async fn len(&self) -> usize { self.store.len().await }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn get(&self, student_id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.store.get(&student_id.to_string()).await)
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let key = record_key(&record)?.to_owned();
        self.store.insert(key, record).await
    }

    async fn delete(&self, student_id: &str) -> Result<(), StoreError> {
        self.store.remove(&student_id.to_string()).await.map(|_| ())
    }

    async fn insert_if_absent(&self, record: Record) -> Result<bool, StoreError> {
        let key = record_key(&record)?.to_owned();
        self.store.insert_if_absent(key, record).await
    }

    async fn replace_if_present(&self, record: Record) -> Result<bool, StoreError> {
        let key = record_key(&record)?.to_owned();
        self.store.replace_if_present(key, record).await
    }

    async fn remove_if_present(&self, student_id: &str) -> Result<bool, StoreError> {
        self.store.remove(&student_id.to_string()).await
    }
}

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::debug;

use crate::errors::StoreError;
use crate::records::store::{record_key, Record, RecordStore};

/// In-process record table backed by a sharded concurrent map.
///
/// Conditional operations go through the entry API, which holds the shard
/// lock for the key, so check and write happen as one step.
pub struct MemoryRecordStore {
    table: String,
    rows: DashMap<String, Record>,
}

impl MemoryRecordStore {
    pub fn new(table: &str) -> Self {
        Self { table: table.to_string(), rows: DashMap::new() }
    }

    pub fn table(&self) -> &str { &self.table }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, student_id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.rows.get(student_id).map(|r| r.value().clone()))
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let key = record_key(&record)?.to_owned();
        debug!(table = %self.table, student_id = %key, "put");
        self.rows.insert(key, record);
        Ok(())
    }

    async fn delete(&self, student_id: &str) -> Result<(), StoreError> {
        self.rows.remove(student_id);
        Ok(())
    }

    async fn insert_if_absent(&self, record: Record) -> Result<bool, StoreError> {
        let key = record_key(&record)?.to_owned();
        match self.rows.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(true)
            }
        }
    }

    async fn replace_if_present(&self, record: Record) -> Result<bool, StoreError> {
        let key = record_key(&record)?.to_owned();
        match self.rows.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(record);
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }

    async fn remove_if_present(&self, student_id: &str) -> Result<bool, StoreError> {
        Ok(self.rows.remove(student_id).is_some())
    }
}

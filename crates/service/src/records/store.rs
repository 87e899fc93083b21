use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::StoreError;

/// A student record: an open, string-keyed JSON mapping. Only `student_id`,
/// `name` and `course` mean anything to the service; every other field is
/// carried through untouched.
pub type Record = Map<String, Value>;

pub const STUDENT_ID: &str = "student_id";

/// The key a record is stored under, if it carries a usable one.
pub fn record_key(record: &Record) -> Result<&str, StoreError> {
    match record.get(STUDENT_ID) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id),
        _ => Err(StoreError::MissingKey),
    }
}

/// Key-value persistence keyed by `student_id`.
///
/// `get`, `put` and `delete` are the minimal contract. The conditional
/// operations default to a read followed by a write, which leaves a window
/// where two callers can both pass the check; adapters that can do better
/// override them with a single atomic step.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, student_id: &str) -> Result<Option<Record>, StoreError>;

    /// Insert or replace, keyed by the record's own `student_id`.
    async fn put(&self, record: Record) -> Result<(), StoreError>;

    async fn delete(&self, student_id: &str) -> Result<(), StoreError>;

    /// Store `record` unless its key is taken. Returns `false` on conflict.
    async fn insert_if_absent(&self, record: Record) -> Result<bool, StoreError> {
        if self.get(record_key(&record)?).await?.is_some() {
            return Ok(false);
        }
        self.put(record).await?;
        Ok(true)
    }

    /// Replace the record under its key only if one exists. Returns `false` when missing.
    async fn replace_if_present(&self, record: Record) -> Result<bool, StoreError> {
        if self.get(record_key(&record)?).await?.is_none() {
            return Ok(false);
        }
        self.put(record).await?;
        Ok(true)
    }

    /// Remove the record if it exists. Returns `false` when missing.
    async fn remove_if_present(&self, student_id: &str) -> Result<bool, StoreError> {
        if self.get(student_id).await?.is_none() {
            return Ok(false);
        }
        self.delete(student_id).await?;
        Ok(true)
    }
}

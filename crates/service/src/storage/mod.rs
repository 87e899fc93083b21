//! Storage adapters for the record service
//!
//! Concrete `RecordStore` implementations plus the reusable JSON file map
//! they build on. The service itself only ever sees `Arc<dyn RecordStore>`.

pub mod json_map_store;
pub mod memory_record_store;
pub mod file_record_store;

use std::sync::Arc;

use configs::{StoreBackend, StoreConfig};
use tracing::info;

use crate::errors::StoreError;
use crate::records::store::RecordStore;

pub use file_record_store::FileRecordStore;
pub use memory_record_store::MemoryRecordStore;

/// Open the store adapter selected by configuration. Called once at startup;
/// the returned handle is shared by every request.
pub async fn open_store(cfg: &StoreConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store: Arc<dyn RecordStore> = match cfg.backend {
        StoreBackend::Memory => Arc::new(MemoryRecordStore::new(&cfg.table)),
        StoreBackend::File => Arc::new(FileRecordStore::open(&cfg.table, &cfg.path).await?),
    };
    info!(table = %cfg.table, backend = ?cfg.backend, "record store opened");
    Ok(store)
}

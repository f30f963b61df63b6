use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{StorageBackend, StorageSettings};
use crate::error::StoreError;

mod file;
mod memory;
mod redis_store;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use redis_store::RedisStore;

/// One demo-mode submission: the submitted fields plus when it was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// Milliseconds since the Unix epoch.
    pub time: i64,
}

impl StoredRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            time: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Durable key-value storage where each slot holds one JSON array of records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Raw slot contents, `None` when the slot was never written.
    async fn read_slot(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Adds one record to the end of the slot. Appends to the same slot never
    /// interleave, so a concurrent append cannot drop another's record.
    async fn append(&self, key: &str, record: StoredRecord) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Vec<StoredRecord>, StoreError> {
        match self.read_slot(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}

/// New slot contents with `record` pushed onto `raw`. A slot that does not
/// hold a record array is an error and must be left as it is.
pub(crate) fn append_to_slot(raw: Option<&str>, record: StoredRecord) -> Result<String, StoreError> {
    let mut records: Vec<StoredRecord> = match raw {
        Some(raw) => serde_json::from_str(raw)?,
        None => Vec::new(),
    };
    records.push(record);
    tracing::debug!(count = records.len(), "demo record appended");

    Ok(serde_json::to_string(&records)?)
}

/// Builds the backend named in the configuration.
pub async fn from_settings(settings: &StorageSettings) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store: Arc<dyn RecordStore> = match settings.backend {
        StorageBackend::Memory => Arc::new(InMemoryStore::default()),
        StorageBackend::File => Arc::new(FileStore::new(settings.path.clone())),
        StorageBackend::Redis => Arc::new(RedisStore::connect(&settings.redis_url).await?),
    };

    Ok(store)
}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{append_to_slot, RecordStore, StoredRecord};
use crate::error::StoreError;

/// Slots held in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    /// Replaces a slot's raw contents, e.g. to seed a fake with existing data.
    pub async fn write_slot(&self, key: &str, value: String) {
        self.slots.lock().await.insert(key.to_owned(), value);
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn append(&self, key: &str, record: StoredRecord) -> Result<(), StoreError> {
        // One lock for the whole read-modify-write.
        let mut slots = self.slots.lock().await;
        let updated = append_to_slot(slots.get(key).map(String::as_str), record)?;
        slots.insert(key.to_owned(), updated);
        Ok(())
    }
}

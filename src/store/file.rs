use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{append_to_slot, RecordStore, StoredRecord};
use crate::error::StoreError;

/// A lock file older than this was left behind by a crashed writer.
const SLOT_LOCK_STALE_AFTER: Duration = Duration::from_secs(30);
const SLOT_LOCK_RETRY_EVERY: Duration = Duration::from_millis(10);
const SLOT_LOCK_GIVE_UP_AFTER: Duration = Duration::from_secs(10);

/// One `<slot>.json` file per slot under a data directory.
///
/// Appends are serialized per slot twice over: a mutex for tasks in this
/// process and a `<slot>.lock` file for other processes sharing the
/// directory. New contents go to a temporary file that is renamed over the
/// slot, so a crash mid-write leaves the previous array intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    slot_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            slot_locks: Arc::default(),
        }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }

    async fn slot_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.slot_locks
            .lock()
            .await
            .entry(key.to_owned())
            .or_default()
            .clone()
    }

    async fn read_raw(path: &Path) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::read_raw(&self.slot_path(key)).await
    }

    #[tracing::instrument(name = "Append record to slot file", skip(self, record))]
    async fn append(&self, key: &str, record: StoredRecord) -> Result<(), StoreError> {
        let slot_lock = self.slot_lock(key).await;
        let _in_process = slot_lock.lock().await;

        tokio::fs::create_dir_all(&self.data_dir).await?;
        let _across_processes =
            SlotLockFile::acquire(self.data_dir.join(format!("{key}.lock"))).await?;

        let path = self.slot_path(key);
        let updated = append_to_slot(Self::read_raw(&path).await?.as_deref(), record)?;

        let tmp_path = self
            .data_dir
            .join(format!("{key}.json.{}.tmp", std::process::id()));
        tokio::fs::write(&tmp_path, updated).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        Ok(())
    }
}

/// Exclusive `<slot>.lock` file, removed on drop.
struct SlotLockFile {
    path: PathBuf,
}

impl SlotLockFile {
    async fn acquire(path: PathBuf) -> Result<Self, StoreError> {
        let started = Instant::now();

        loop {
            let created = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match created {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if lock_is_stale(&path).await {
                        tracing::warn!(path = %path.display(), "removing stale slot lock");
                        let _ = tokio::fs::remove_file(&path).await;
                        continue;
                    }
                    if started.elapsed() > SLOT_LOCK_GIVE_UP_AFTER {
                        return Err(StoreError::Backend(format!(
                            "Timed out waiting for slot lock {}",
                            path.display()
                        )));
                    }
                    tokio::time::sleep(SLOT_LOCK_RETRY_EVERY).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for SlotLockFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn lock_is_stale(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .map(|age| age > SLOT_LOCK_STALE_AFTER)
        .unwrap_or(false)
}

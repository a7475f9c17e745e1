//! Device-local key/value storage and the guest persistence backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::backend::{BackendKind, PersistenceBackend};
use super::record::{normalize_ambience, PersistenceRecord, Statistics, DEFAULT_AMBIENCE};
use crate::error::StoreError;
use crate::task::Task;

pub const TASKS_KEY: &str = "focushub_tasks";
pub const AMBIENCE_KEY: &str = "focushub_vibe";
pub const STATS_KEY: &str = "focushub_stats";
pub const TIMER_KEY: &str = "focushub_timer";
pub const SESSION_USER_KEY: &str = "focushub_session_user";

/// Simple key -> string storage with no expiry, scoped to the device.
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory `LocalStorage`, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Tasks held on this device. Unreadable or corrupt data reads as empty.
pub fn read_tasks(storage: &dyn LocalStorage) -> Vec<Task> {
    match storage.get(TASKS_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("discarding unreadable local tasks: {e}");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!("failed to read local tasks: {e}");
            Vec::new()
        }
    }
}

/// Ambience selected on this device, `simple` when unset.
pub fn read_ambience(storage: &dyn LocalStorage) -> String {
    match storage.get(AMBIENCE_KEY) {
        Ok(Some(raw)) => normalize_ambience(&raw).to_string(),
        Ok(None) => DEFAULT_AMBIENCE.to_string(),
        Err(e) => {
            tracing::warn!("failed to read local ambience: {e}");
            DEFAULT_AMBIENCE.to_string()
        }
    }
}

/// Guest backend: everything lives in local storage, no network.
pub struct LocalBackend {
    storage: Arc<dyn LocalStorage>,
}

impl LocalBackend {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl PersistenceBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn load(&self) -> Result<Option<PersistenceRecord>, StoreError> {
        let tasks_raw = self.storage.get(TASKS_KEY)?;
        let stats_raw = self.storage.get(STATS_KEY)?;
        if tasks_raw.is_none() && stats_raw.is_none() {
            return Ok(None);
        }

        let tasks = match tasks_raw {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        let mut record = PersistenceRecord::seeded(tasks, &read_ambience(self.storage.as_ref()));
        if let Some(raw) = stats_raw {
            record.statistics = serde_json::from_str::<Statistics>(&raw)?;
        }
        Ok(Some(record))
    }

    async fn save(&self, record: &PersistenceRecord) -> Result<(), StoreError> {
        self.storage
            .set(TASKS_KEY, &serde_json::to_string(&record.tasks)?)?;
        self.storage
            .set(STATS_KEY, &serde_json::to_string(&record.statistics)?)?;
        self.storage
            .set(AMBIENCE_KEY, &record.customizations.selected_vibe)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskList;

    #[test]
    fn memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").unwrap().is_none());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test]
    fn corrupt_tasks_read_as_empty() {
        let storage = MemoryStorage::new();
        storage.set(TASKS_KEY, "{not json").unwrap();
        assert!(read_tasks(&storage).is_empty());
    }

    #[tokio::test]
    async fn local_backend_saves_and_loads() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        let backend = LocalBackend::new(storage.clone());
        assert!(backend.load().await.unwrap().is_none());

        let mut list = TaskList::new();
        list.add("Revise notes", 2).unwrap();
        let mut record = PersistenceRecord::seeded(list.tasks().to_vec(), "rain");
        record.statistics.total_sessions = 3;
        backend.save(&record).await.unwrap();

        let loaded = backend.load().await.unwrap().unwrap();
        assert_eq!(loaded.tasks, record.tasks);
        assert_eq!(loaded.statistics.total_sessions, 3);
        assert_eq!(loaded.customizations.selected_vibe, "rain");
        assert_eq!(read_ambience(storage.as_ref()), "rain");
    }
}

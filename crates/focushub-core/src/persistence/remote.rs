//! Per-user document store and the authenticated persistence backend.
//!
//! Documents are JSON objects keyed by `users/{uid}`. Writes are merge
//! writes: nested objects are merged key by key, everything else in the
//! patch replaces what was stored, and fields absent from the patch are
//! left untouched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::backend::{BackendKind, PersistenceBackend};
use super::record::PersistenceRecord;
use crate::error::StoreError;

/// Field of the user document holding the Focus Hub record.
pub const FOCUS_HUB_FIELD: &str = "focusHub";

pub fn user_doc_key(uid: &str) -> String {
    format!("users/{uid}")
}

/// Point-lookup document store with merge writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set_merge(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Merge `patch` into `target` the way a merge write does.
pub fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                let nested = value.is_object() && existing.get(&key).is_some_and(Value::is_object);
                if !nested {
                    existing.insert(key, value);
                } else if let Some(slot) = existing.get_mut(&key) {
                    merge_json(slot, value);
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// In-memory `DocumentStore`. Counts writes and can be switched offline to
/// exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<String, Value>>,
    writes: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set_merge` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Direct read, bypassing the offline switch.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.docs.lock().ok()?.get(key).cloned()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Remote {
                status: 503,
                message: "store unreachable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.check_online()?;
        let docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(docs.get(key).cloned())
    }

    async fn set_merge(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.check_online()?;
        let mut docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        let slot = docs
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        merge_json(slot, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Authenticated backend: the record lives in the user's remote document.
pub struct RemoteBackend {
    store: Arc<dyn DocumentStore>,
    uid: String,
}

impl RemoteBackend {
    pub fn new(store: Arc<dyn DocumentStore>, uid: impl Into<String>) -> Self {
        Self {
            store,
            uid: uid.into(),
        }
    }
}

#[async_trait]
impl PersistenceBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn load(&self) -> Result<Option<PersistenceRecord>, StoreError> {
        let Some(doc) = self.store.get(&user_doc_key(&self.uid)).await? else {
            return Ok(None);
        };
        match doc.get(FOCUS_HUB_FIELD) {
            Some(Value::Null) | None => Ok(None),
            Some(section) => Ok(Some(serde_json::from_value(section.clone())?)),
        }
    }

    async fn save(&self, record: &PersistenceRecord) -> Result<(), StoreError> {
        let mut section = serde_json::to_value(record)?;
        if let Value::Object(map) = &mut section {
            map.insert("updatedAt".into(), Value::String(Utc::now().to_rfc3339()));
        }
        let mut patch = serde_json::Map::new();
        patch.insert(FOCUS_HUB_FIELD.to_string(), section);
        self.store
            .set_merge(&user_doc_key(&self.uid), Value::Object(patch))
            .await
    }
}

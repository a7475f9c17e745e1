//! Decides where Focus Hub state lives and keeps it there.
//!
//! The coordinator owns the active backend and its debounced writer. On
//! every identity change the caller asks it to `load`, which swaps the
//! backend and reconciles remote state with what the device already has.

use std::sync::Arc;
use std::time::Duration;

use super::backend::{select_backend, BackendKind, PersistenceBackend};
use super::debounce::DebouncedWriter;
use super::local::{read_ambience, read_tasks, LocalStorage, AMBIENCE_KEY, TIMER_KEY};
use super::record::{normalize_ambience, PersistenceRecord};
use super::remote::DocumentStore;
use super::snapshot::TimerSnapshot;
use crate::error::StoreError;
use crate::identity::UserProfile;

pub struct PersistenceCoordinator {
    local: Arc<dyn LocalStorage>,
    remote: Option<Arc<dyn DocumentStore>>,
    delay: Duration,
    writer: DebouncedWriter,
}

impl PersistenceCoordinator {
    /// Starts out on the guest backend until `load` is called.
    pub fn new(
        local: Arc<dyn LocalStorage>,
        remote: Option<Arc<dyn DocumentStore>>,
        delay: Duration,
    ) -> Self {
        let backend = select_backend(None, Arc::clone(&local), remote.clone());
        Self {
            local,
            remote,
            delay,
            writer: DebouncedWriter::new(backend, delay),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.writer.backend().kind()
    }

    pub fn local(&self) -> &Arc<dyn LocalStorage> {
        &self.local
    }

    pub fn has_pending(&self) -> bool {
        self.writer.has_pending()
    }

    /// Switch to the backend for `user` and return the state to adopt.
    ///
    /// A write still pending for the previous identity is flushed to that
    /// identity's backend first. Remote records override tasks and
    /// statistics; the ambience always comes from this device. A remote
    /// account with no record yet is seeded from local data and written
    /// once. A failed read keeps `in_memory`.
    pub async fn load(
        &mut self,
        user: Option<&UserProfile>,
        in_memory: &PersistenceRecord,
    ) -> PersistenceRecord {
        self.writer.flush().await;
        let backend = select_backend(user, Arc::clone(&self.local), self.remote.clone());
        self.writer = DebouncedWriter::new(Arc::clone(&backend), self.delay);

        let vibe = read_ambience(self.local.as_ref());
        match backend.load().await {
            Ok(Some(mut record)) => {
                record.customizations.selected_vibe = vibe;
                tracing::debug!(
                    backend = ?backend.kind(),
                    tasks = record.tasks.len(),
                    "loaded focus hub record"
                );
                record
            }
            Ok(None) => {
                let seeded = PersistenceRecord::seeded(read_tasks(self.local.as_ref()), &vibe);
                if backend.kind() == BackendKind::Remote {
                    tracing::info!(
                        tasks = seeded.tasks.len(),
                        "no remote focus hub record, seeding from device"
                    );
                    if let Err(e) = backend.save(&seeded).await {
                        tracing::warn!("failed to seed remote focus hub record: {e}");
                    }
                }
                seeded
            }
            Err(e) => {
                tracing::warn!(backend = ?backend.kind(), "failed to load focus hub record: {e}");
                in_memory.clone()
            }
        }
    }

    pub fn schedule_save(&mut self, record: PersistenceRecord) {
        self.writer.schedule(record);
    }

    /// Write anything pending right away. Returns whether a write was issued.
    pub async fn flush(&mut self) -> bool {
        self.writer.flush().await
    }

    pub fn cancel(&mut self) {
        self.writer.cancel();
    }

    pub fn save_timer_snapshot(&self, snapshot: &TimerSnapshot) -> Result<(), StoreError> {
        self.local
            .set(TIMER_KEY, &serde_json::to_string(snapshot)?)
    }

    /// The stored timer snapshot, fast-forwarded to `now_ms`.
    pub fn restore_timer(&self, now_ms: i64) -> Option<TimerSnapshot> {
        let raw = match self.local.get(TIMER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("failed to read timer snapshot: {e}");
                return None;
            }
        };
        match serde_json::from_str::<TimerSnapshot>(&raw) {
            Ok(snapshot) => Some(snapshot.fast_forward(now_ms)),
            Err(e) => {
                tracing::warn!("discarding unreadable timer snapshot: {e}");
                None
            }
        }
    }

    /// Persist the ambience on this device right away. Unknown ids are
    /// stored as the default; the stored id is returned.
    pub fn set_ambience(&self, id: &str) -> &'static str {
        let id = normalize_ambience(id);
        if let Err(e) = self.local.set(AMBIENCE_KEY, id) {
            tracing::warn!("failed to store ambience: {e}");
        }
        id
    }
}

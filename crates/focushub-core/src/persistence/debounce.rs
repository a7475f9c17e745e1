//! Debounced, cancellable persistence writes.
//!
//! Each `schedule` stores the newest snapshot in a single pending slot and
//! restarts the delay. When the delay elapses without another `schedule`,
//! the slot is drained and written once. Superseded snapshots are simply
//! overwritten, so there is never a queue and never a double write.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::backend::PersistenceBackend;
use super::record::PersistenceRecord;

/// Inactivity window before a scheduled write is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

#[derive(Default)]
struct Slot {
    record: Option<PersistenceRecord>,
    /// A write has left the slot and is awaiting the backend.
    in_flight: bool,
}

type PendingSlot = Arc<Mutex<Slot>>;

pub struct DebouncedWriter {
    backend: Arc<dyn PersistenceBackend>,
    delay: Duration,
    pending: PendingSlot,
    /// Serialises writes so a flush never overtakes an in-flight save.
    gate: Arc<tokio::sync::Mutex<()>>,
    timer: Option<JoinHandle<()>>,
}

impl DebouncedWriter {
    pub fn new(backend: Arc<dyn PersistenceBackend>, delay: Duration) -> Self {
        Self {
            backend,
            delay,
            pending: Arc::new(Mutex::new(Slot::default())),
            gate: Arc::new(tokio::sync::Mutex::new(())),
            timer: None,
        }
    }

    pub fn backend(&self) -> &Arc<dyn PersistenceBackend> {
        &self.backend
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.pending).record.is_some()
    }

    /// Replace the pending snapshot and restart the delay.
    ///
    /// Outside a tokio runtime nothing is spawned; the snapshot waits for
    /// an explicit `flush`.
    pub fn schedule(&mut self, record: PersistenceRecord) {
        lock(&self.pending).record = Some(record);
        self.stop_timer();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime, write deferred until flush");
            return;
        };
        let backend = Arc::clone(&self.backend);
        let pending = Arc::clone(&self.pending);
        let gate = Arc::clone(&self.gate);
        let delay = self.delay;
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _gate = gate.lock().await;
            let taken = {
                let mut slot = lock(&pending);
                let taken = slot.record.take();
                slot.in_flight = taken.is_some();
                taken
            };
            let Some(record) = taken else {
                return;
            };
            write(backend.as_ref(), &record).await;
            lock(&pending).in_flight = false;
        }));
    }

    /// Write the pending snapshot now, after any write already in flight.
    /// Returns whether anything was pending or in flight.
    pub async fn flush(&mut self) -> bool {
        let was_in_flight = self.stop_timer();
        let _gate = self.gate.lock().await;
        let taken = lock(&self.pending).record.take();
        let Some(record) = taken else {
            return was_in_flight;
        };
        write(self.backend.as_ref(), &record).await;
        true
    }

    /// Drop the pending snapshot and its timer without writing. A write
    /// already handed to the backend is left to finish.
    pub fn cancel(&mut self) {
        self.stop_timer();
        if lock(&self.pending).record.take().is_some() {
            tracing::debug!("discarded pending focus hub write");
        }
    }

    /// Abort a sleeping timer task; detach one whose write is in flight.
    /// Returns true when a write was left running.
    fn stop_timer(&mut self) -> bool {
        let Some(timer) = self.timer.take() else {
            return false;
        };
        if lock(&self.pending).in_flight {
            drop(timer);
            true
        } else {
            timer.abort();
            false
        }
    }
}

impl Drop for DebouncedWriter {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(slot: &PendingSlot) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Best-effort write: failures are logged and otherwise ignored.
async fn write(backend: &dyn PersistenceBackend, record: &PersistenceRecord) {
    match backend.save(record).await {
        Ok(()) => tracing::debug!(
            backend = ?backend.kind(),
            tasks = record.tasks.len(),
            sessions = record.statistics.total_sessions,
            "persisted focus hub record"
        ),
        Err(e) => tracing::warn!(backend = ?backend.kind(), "focus hub write failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::StoreError;
    use crate::persistence::{BackendKind, MemoryDocumentStore, RemoteBackend};

    /// Backend whose saves take one second to complete.
    #[derive(Default)]
    struct SlowBackend {
        writes: AtomicUsize,
        last_sessions: AtomicU64,
    }

    #[async_trait]
    impl PersistenceBackend for SlowBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Remote
        }

        async fn load(&self) -> Result<Option<PersistenceRecord>, StoreError> {
            Ok(None)
        }

        async fn save(&self, record: &PersistenceRecord) -> Result<(), StoreError> {
            tokio::time::sleep(Duration::from_secs(1)).await;
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.last_sessions
                .store(record.statistics.total_sessions, Ordering::SeqCst);
            Ok(())
        }
    }

    fn slow_writer() -> (Arc<SlowBackend>, DebouncedWriter) {
        let backend = Arc::new(SlowBackend::default());
        let writer = DebouncedWriter::new(backend.clone(), DEFAULT_DEBOUNCE);
        (backend, writer)
    }

    fn record(sessions: u64) -> PersistenceRecord {
        let mut record = PersistenceRecord::default();
        record.statistics.total_sessions = sessions;
        record
    }

    fn writer(store: &Arc<MemoryDocumentStore>) -> DebouncedWriter {
        let backend = Arc::new(RemoteBackend::new(store.clone(), "u1"));
        DebouncedWriter::new(backend, DEFAULT_DEBOUNCE)
    }

    fn stored_sessions(store: &MemoryDocumentStore) -> u64 {
        store.peek("users/u1").unwrap()["focusHub"]["statistics"]["totalSessions"]
            .as_u64()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_mutations_writes_once_with_latest() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut writer = writer(&store);

        for n in 1..=5 {
            writer.schedule(record(n));
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(store.write_count(), 0);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(stored_sessions(&store), 5);
        assert!(!writer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_windows_write_separately() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut writer = writer(&store);

        writer.schedule(record(1));
        tokio::time::sleep(Duration::from_secs(3)).await;
        writer.schedule(record(2));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_write() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut writer = writer(&store);
        writer.schedule(record(1));
        writer.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_write() {
        let store = Arc::new(MemoryDocumentStore::new());
        {
            let mut writer = writer(&store);
            writer.schedule(record(1));
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately_once() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut writer = writer(&store);
        writer.schedule(record(3));
        assert!(writer.flush().await);
        assert!(!writer.flush().await);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(stored_sessions(&store), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_is_swallowed() {
        let store = Arc::new(MemoryDocumentStore::new());
        store.set_offline(true);
        let mut writer = writer(&store);
        writer.schedule(record(1));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(store.write_count(), 0);
        assert!(!writer.has_pending());
    }

    #[test]
    fn schedule_without_runtime_defers_to_flush() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut writer = writer(&store);
        writer.schedule(record(1));
        assert!(writer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_waits_for_write_in_flight() {
        let (backend, mut writer) = slow_writer();
        writer.schedule(record(4));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);

        assert!(writer.flush().await);
        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
        assert_eq!(backend.last_sessions.load(Ordering::SeqCst), 4);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_lets_write_in_flight_finish() {
        let (backend, mut writer) = slow_writer();
        writer.schedule(record(2));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        drop(writer);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
        assert_eq!(backend.last_sessions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_during_write_keeps_both_in_order() {
        let (backend, mut writer) = slow_writer();
        writer.schedule(record(1));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        writer.schedule(record(2));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.writes.load(Ordering::SeqCst), 2);
        assert_eq!(backend.last_sessions.load(Ordering::SeqCst), 2);
    }
}

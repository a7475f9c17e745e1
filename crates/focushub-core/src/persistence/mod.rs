//! Where Focus Hub state is stored and how it gets there.
//!
//! - `local`: device key/value storage and the guest backend
//! - `remote`: per-user document store and the authenticated backend
//! - `backend`: the backend trait and the factory choosing between them
//! - `debounce`: coalescing, cancellable writer
//! - `snapshot`: local-only timer snapshot
//! - `coordinator`: ties the above together for the hub

mod backend;
mod coordinator;
mod debounce;
mod local;
mod record;
mod remote;
mod snapshot;

pub use backend::{select_backend, BackendKind, PersistenceBackend};
pub use coordinator::PersistenceCoordinator;
pub use debounce::{DebouncedWriter, DEFAULT_DEBOUNCE};
pub use local::{
    read_ambience, read_tasks, LocalBackend, LocalStorage, MemoryStorage, AMBIENCE_KEY,
    SESSION_USER_KEY, STATS_KEY, TASKS_KEY, TIMER_KEY,
};
pub use record::{
    normalize_ambience, Customizations, PersistenceRecord, Statistics, TimerSettings, AMBIENCES,
    DEFAULT_AMBIENCE,
};
pub use remote::{
    merge_json, user_doc_key, DocumentStore, MemoryDocumentStore, RemoteBackend, FOCUS_HUB_FIELD,
};
pub use snapshot::TimerSnapshot;

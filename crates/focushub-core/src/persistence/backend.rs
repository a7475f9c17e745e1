use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::local::{LocalBackend, LocalStorage};
use super::record::PersistenceRecord;
use super::remote::{DocumentStore, RemoteBackend};
use crate::error::StoreError;
use crate::identity::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

/// Durable home of a `PersistenceRecord`. Exactly one backend is active
/// per session; the coordinator never branches on auth state itself.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// `Ok(None)` means nothing has been stored yet.
    async fn load(&self) -> Result<Option<PersistenceRecord>, StoreError>;

    async fn save(&self, record: &PersistenceRecord) -> Result<(), StoreError>;
}

/// Pick the backend for a session.
///
/// Signed-in users get their remote document when a document store is
/// available; guests, and users without a configured store, stay local.
pub fn select_backend(
    user: Option<&UserProfile>,
    local: Arc<dyn LocalStorage>,
    remote: Option<Arc<dyn DocumentStore>>,
) -> Arc<dyn PersistenceBackend> {
    match (user, remote) {
        (Some(user), Some(store)) => Arc::new(RemoteBackend::new(store, user.uid.clone())),
        (Some(user), None) => {
            tracing::warn!(uid = %user.uid, "no document store configured, persisting locally");
            Arc::new(LocalBackend::new(local))
        }
        (None, _) => Arc::new(LocalBackend::new(local)),
    }
}

//! Signed-in user state.
//!
//! Authentication itself belongs to an external identity provider; this
//! module only holds what the provider handed back. `AuthContext` is owned
//! by the application root and passed to whoever needs it. Interested
//! parties subscribe explicitly and unsubscribe when they go away.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::StoreError;
use crate::notify::{welcome_message, EmailSender};
use crate::persistence::{user_doc_key, DocumentStore, LocalStorage, SESSION_USER_KEY};

/// Profile returned by the identity provider on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl UserProfile {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: String::new(),
            photo_url: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }
}

pub type ListenerId = u64;
type Listener = Box<dyn Fn(Option<&UserProfile>) + Send + Sync>;

/// Observable auth state.
#[derive(Default)]
pub struct AuthContext {
    current: Option<UserProfile>,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: ListenerId,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded from the session remembered on this device.
    pub fn restore(storage: &dyn LocalStorage) -> Self {
        Self {
            current: load_session(storage),
            ..Self::default()
        }
    }

    pub fn current(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(Option<&UserProfile>) + Send + Sync + 'static,
    {
        self.next_id += 1;
        self.listeners.push((self.next_id, Box::new(listener)));
        self.next_id
    }

    /// Returns false when the id was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn sign_in(&mut self, profile: UserProfile) {
        tracing::info!(uid = %profile.uid, "signed in");
        self.current = Some(profile);
        self.notify();
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.current.take() {
            tracing::info!(uid = %user.uid, "signed out");
            self.notify();
        }
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(self.current.as_ref());
        }
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ── Device session ───────────────────────────────────────────────────

pub fn load_session(storage: &dyn LocalStorage) -> Option<UserProfile> {
    let raw = match storage.get(SESSION_USER_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!("failed to read stored session: {e}");
            return None;
        }
    };
    serde_json::from_str(&raw)
        .map_err(|e| tracing::warn!("discarding unreadable stored session: {e}"))
        .ok()
}

pub fn store_session(storage: &dyn LocalStorage, profile: &UserProfile) -> Result<(), StoreError> {
    storage.set(SESSION_USER_KEY, &serde_json::to_string(profile)?)
}

pub fn clear_session(storage: &dyn LocalStorage) -> Result<(), StoreError> {
    storage.remove(SESSION_USER_KEY)
}

// ── Account document ─────────────────────────────────────────────────

/// Record the profile in the user's document.
///
/// An existing document only has its profile fields merged. A missing one
/// is created without a Focus Hub record, which the first load seeds from
/// the device. Returns `true` when the document was created.
pub async fn register_profile(
    store: &dyn DocumentStore,
    profile: &UserProfile,
) -> Result<bool, StoreError> {
    let key = user_doc_key(&profile.uid);
    let now = Utc::now().to_rfc3339();
    let mut fields = json!({
        "email": profile.email,
        "displayName": profile.display_name,
        "photoURL": profile.photo_url.clone().unwrap_or_default(),
        "updatedAt": now,
    });

    let created = store.get(&key).await?.is_none();
    if created {
        if let Value::Object(map) = &mut fields {
            map.insert("createdAt".into(), Value::String(now));
            map.insert("themePreference".into(), Value::String("system".into()));
        }
        tracing::info!(uid = %profile.uid, "creating user document");
    }
    store.set_merge(&key, fields).await?;
    Ok(created)
}

/// Register the profile and greet first-time users.
///
/// The welcome email is best effort: a failed send is logged and does not
/// fail the sign-in.
pub async fn complete_sign_in(
    store: &dyn DocumentStore,
    mailer: &dyn EmailSender,
    profile: &UserProfile,
) -> Result<bool, StoreError> {
    let created = register_profile(store, profile).await?;
    if created && !profile.email.is_empty() {
        let name = Some(profile.display_name.as_str());
        if let Err(e) = mailer.send(&welcome_message(&profile.email, name)).await {
            tracing::warn!(uid = %profile.uid, "welcome email failed: {e}");
        }
    }
    Ok(created)
}

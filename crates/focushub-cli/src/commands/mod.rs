pub mod ambience;
pub mod auth;
pub mod config;
pub mod email;
pub mod stats;
pub mod task;
pub mod timer;

use std::error::Error;
use std::sync::Arc;

use focushub_core::notify::{DemoSender, EmailSender, HttpEmailSender, SilentCue, SoundCue, TerminalBell};
use focushub_core::persistence::DocumentStore;
use focushub_core::{
    AuthContext, Config, Database, Event, FocusHub, HttpDocumentStore, PersistenceCoordinator,
    PresetTable, RemoteMode,
};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Everything one invocation works with. Created by `Session::open`, which
/// loads the hub for the remembered user and restores the timer.
pub struct Session {
    pub config: Config,
    pub db: Arc<Database>,
    pub remote: Option<Arc<dyn DocumentStore>>,
    pub auth: AuthContext,
    pub hub: FocusHub,
}

impl Session {
    pub async fn open() -> Result<Self, Box<dyn Error>> {
        let config = Config::load()?;
        let db = Arc::new(Database::open()?);
        let remote = document_store(&config, &db)?;
        let auth = AuthContext::restore(db.as_ref());

        let mut presets = PresetTable::default();
        presets.set_custom_focus(config.timer.custom_focus_minutes)?;
        let cue: Box<dyn SoundCue> = if config.timer.sound_cue {
            Box::new(TerminalBell)
        } else {
            Box::new(SilentCue)
        };

        let coordinator = PersistenceCoordinator::new(db.clone(), remote.clone(), config.debounce());
        let mut hub = FocusHub::with_preset(coordinator, presets, config.timer.default_preset)
            .with_cue(cue);
        hub.load(auth.current()).await;
        hub.restore_timer();

        Ok(Self {
            config,
            db,
            remote,
            auth,
            hub,
        })
    }

    pub fn mailer(&self) -> Result<Box<dyn EmailSender>, Box<dyn Error>> {
        let email = &self.config.email;
        let Some(endpoint) = &email.relay_endpoint else {
            return Ok(Box::new(DemoSender));
        };
        let mut sender = HttpEmailSender::new(endpoint, email.from.clone())?;
        if let Some(token) = &email.api_token {
            sender = sender.with_token(token.clone());
        }
        Ok(Box::new(sender))
    }

    /// Snapshot the timer, flush pending writes.
    pub async fn close(mut self) {
        self.hub.suspend().await;
    }
}

fn document_store(
    config: &Config,
    db: &Arc<Database>,
) -> Result<Option<Arc<dyn DocumentStore>>, Box<dyn Error>> {
    match config.remote.mode {
        RemoteMode::Embedded => {
            let store: Arc<dyn DocumentStore> = db.clone();
            Ok(Some(store))
        }
        RemoteMode::Http => {
            let endpoint = config
                .remote
                .endpoint
                .as_deref()
                .ok_or("remote.endpoint must be set when remote.mode is http")?;
            let mut store = HttpDocumentStore::new(endpoint)?;
            if let Some(token) = &config.remote.api_token {
                store = store.with_token(token.clone());
            }
            Ok(Some(Arc::new(store)))
        }
        RemoteMode::Off => Ok(None),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the events a command produced, or the current state when it
/// produced none.
pub fn print_events(hub: &mut FocusHub) -> CliResult {
    let events: Vec<Event> = hub.drain_events();
    if events.is_empty() {
        return print_json(&hub.snapshot());
    }
    for event in &events {
        print_json(event)?;
    }
    Ok(())
}

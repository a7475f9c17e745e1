//! # Focus Hub Core Library
//!
//! The study companion behind the `focushub` CLI: a Pomodoro-style
//! countdown with focus and break modes, a session ledger, a task list
//! whose items collect completed focus sessions, and a persistence
//! coordinator that keeps all of it either on the device (guests) or in a
//! per-user document (signed-in users).
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine; the caller invokes
//!   `tick()` once per elapsed second
//! - **Persistence**: one backend per session, chosen by auth state, with
//!   debounced merge writes and a local timer snapshot
//! - **Storage**: SQLite for device state and embedded documents, TOML for
//!   configuration, HTTP for a remote document service
//! - **Notify**: completion messages, sound cue and outbound email
//!
//! ## Key Components
//!
//! - [`FocusHub`]: owns everything and exposes the user commands
//! - [`TimerEngine`]: countdown state machine
//! - [`PersistenceCoordinator`]: backend selection, reconciliation, writes
//! - [`AuthContext`]: observable signed-in user
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod hub;
pub mod identity;
pub mod ledger;
pub mod notify;
pub mod persistence;
pub mod storage;
pub mod task;
pub mod timer;

pub use error::{ConfigError, CoreError, EmailError, StoreError, ValidationError};
pub use events::Event;
pub use hub::FocusHub;
pub use identity::{AuthContext, UserProfile};
pub use ledger::SessionLedger;
pub use persistence::{BackendKind, PersistenceCoordinator, PersistenceRecord, TimerSnapshot};
pub use storage::{Config, Database, HttpDocumentStore, RemoteMode};
pub use task::{Task, TaskList};
pub use timer::{format_time, Preset, PresetKey, PresetTable, TimerEngine, TimerMode, TimerState};

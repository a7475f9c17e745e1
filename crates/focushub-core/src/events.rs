use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{PresetKey, TimerMode};

/// Every state change in the Focus Hub produces an Event.
/// Front ends drain them from the hub after each command or tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero. The engine has already switched to `next`.
    TimerCompleted {
        completed: TimerMode,
        next: TimerMode,
        /// Focus completions in the current long-break cycle.
        cycle_sessions: u64,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    PresetChanged {
        preset: PresetKey,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// User-facing message shown after a completion.
    Notification {
        message: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        preset: PresetKey,
        mode: TimerMode,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        display: String,
        sessions_completed: u64,
        minutes_focused: u64,
        active_task: Option<String>,
        at: DateTime<Utc>,
    },
}

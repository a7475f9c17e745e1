//! Completed-session counters.
//!
//! Minutes are derived from the session count and the active preset's focus
//! length rather than accounted per session. Manual resets mid-interval are
//! therefore not reflected; the approximation is kept as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::Statistics;
use crate::timer::Preset;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLedger {
    sessions_completed: u64,
    last_session_at: Option<DateTime<Utc>>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_statistics(stats: &Statistics) -> Self {
        Self {
            sessions_completed: stats.total_sessions,
            last_session_at: stats.last_session_at,
        }
    }

    pub fn record_focus_completion(&mut self, at: DateTime<Utc>) {
        self.sessions_completed += 1;
        self.last_session_at = Some(at);
    }

    pub fn sessions_completed(&self) -> u64 {
        self.sessions_completed
    }

    pub fn last_session_at(&self) -> Option<DateTime<Utc>> {
        self.last_session_at
    }

    pub fn minutes_focused(&self, preset: &Preset) -> u64 {
        self.sessions_completed.saturating_mul(preset.focus_minutes)
    }

    pub fn statistics(&self, preset: &Preset) -> Statistics {
        Statistics {
            total_sessions: self.sessions_completed,
            total_minutes: self.minutes_focused(preset),
            last_session_at: self.last_session_at,
        }
    }
}

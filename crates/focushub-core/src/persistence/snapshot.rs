//! Local-only timer snapshot and its wall-clock fast-forward on reload.

use serde::{Deserialize, Serialize};

use crate::timer::{PresetKey, PresetTable, TimerEngine, TimerMode};

/// Timer state as written to local storage when the timer stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub preset: PresetKey,
    pub mode: TimerMode,
    /// Remaining seconds.
    #[serde(rename = "time")]
    pub remaining_secs: u64,
    pub is_running: bool,
    #[serde(default)]
    pub sessions: u64,
    #[serde(default)]
    pub cycle_sessions: u64,
    #[serde(default)]
    pub custom_focus: Option<u64>,
    #[serde(default)]
    pub active_task: Option<String>,
    /// Epoch milliseconds at the time of writing.
    pub last_update: i64,
}

impl TimerSnapshot {
    pub fn capture(
        engine: &TimerEngine,
        sessions: u64,
        active_task: Option<&str>,
        now_ms: i64,
    ) -> Self {
        Self {
            preset: engine.preset_key(),
            mode: engine.mode(),
            remaining_secs: engine.remaining_secs(),
            is_running: engine.is_running(),
            sessions,
            cycle_sessions: engine.cycle_sessions(),
            custom_focus: Some(engine.presets().custom_focus_minutes()),
            active_task: active_task.map(str::to_string),
            last_update: now_ms,
        }
    }

    /// Account for wall-clock time spent closed while running.
    ///
    /// Only whole seconds are consumed; `last_update` advances by exactly
    /// that much so the sub-second remainder carries into the next restore.
    /// Remaining time is clamped to zero. A fully elapsed interval comes
    /// back paused at zero; the missed completion is not replayed. A clock
    /// that moved backwards counts as no elapsed time and re-anchors.
    pub fn fast_forward(mut self, now_ms: i64) -> Self {
        if !self.is_running {
            return self;
        }
        if now_ms < self.last_update {
            self.last_update = now_ms;
            return self;
        }
        let elapsed_secs = (now_ms - self.last_update) / 1000;
        self.last_update += elapsed_secs * 1000;
        let elapsed_secs = u64::try_from(elapsed_secs).unwrap_or(0);
        self.remaining_secs = self.remaining_secs.saturating_sub(elapsed_secs);
        self.is_running = self.remaining_secs > 0;
        self
    }

    /// Rebuild an engine from this snapshot.
    pub fn into_engine(self, mut presets: PresetTable) -> TimerEngine {
        if let Some(minutes) = self.custom_focus {
            if let Err(e) = presets.set_custom_focus(minutes) {
                tracing::debug!("ignoring stored custom focus: {e}");
            }
        }
        TimerEngine::restore(
            presets,
            self.preset,
            self.mode,
            self.remaining_secs,
            self.is_running,
            self.cycle_sessions,
        )
    }
}

//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads or read the clock - the caller invokes `tick()` once per elapsed
//! second while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! {focus, shortBreak, longBreak} x {running, paused}
//!
//! focus --complete--> shortBreak | longBreak (every Nth focus)
//! break --complete--> focus
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(PresetTable::default());
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::TimerCompleted) when the countdown expires
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::preset::{Preset, PresetKey, PresetTable, TimerMode};
use crate::error::ValidationError;
use crate::events::Event;

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_seconds: u64,
    pub running: bool,
    pub preset_key: PresetKey,
}

/// Core timer engine.
///
/// `active` is the preset captured at the last reset. Edits to the custom
/// preset land in `presets` and only reach `active` on the next reset, so
/// `remaining_secs` never exceeds the duration being counted down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    presets: PresetTable,
    preset_key: PresetKey,
    active: Preset,
    mode: TimerMode,
    remaining_secs: u64,
    running: bool,
    /// Focus completions since the last preset change.
    cycle_sessions: u64,
}

impl TimerEngine {
    /// Create a paused engine in focus mode under the default preset.
    pub fn new(presets: PresetTable) -> Self {
        Self::with_preset(presets, PresetKey::default())
    }

    pub fn with_preset(presets: PresetTable, preset_key: PresetKey) -> Self {
        let active = presets.get(preset_key);
        Self {
            presets,
            preset_key,
            active,
            mode: TimerMode::Focus,
            remaining_secs: active.duration_secs(TimerMode::Focus),
            running: false,
            cycle_sessions: 0,
        }
    }

    /// Rebuild an engine from persisted values.
    ///
    /// `remaining_secs` is clamped to the mode's duration so a stale or
    /// hand-edited snapshot cannot break the countdown invariant.
    pub fn restore(
        presets: PresetTable,
        preset_key: PresetKey,
        mode: TimerMode,
        remaining_secs: u64,
        running: bool,
        cycle_sessions: u64,
    ) -> Self {
        let active = presets.get(preset_key);
        Self {
            presets,
            preset_key,
            active,
            mode,
            remaining_secs: remaining_secs.min(active.duration_secs(mode)),
            running,
            cycle_sessions,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        TimerState {
            mode: self.mode,
            remaining_seconds: self.remaining_secs,
            running: self.running,
            preset_key: self.preset_key,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn preset_key(&self) -> PresetKey {
        self.preset_key
    }

    /// The preset the current countdown was started under.
    pub fn active_preset(&self) -> Preset {
        self.active
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn cycle_sessions(&self) -> u64 {
        self.cycle_sessions
    }

    pub fn total_secs(&self) -> u64 {
        self.active.duration_secs(self.mode)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down. Starting at zero is allowed; the next tick completes.
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.reset_countdown();
        Some(Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Call once per elapsed second.
    /// Returns `Some(Event::TimerCompleted)` when the countdown expires.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        Some(self.complete())
    }

    pub fn change_preset(&mut self, key: PresetKey) -> Option<Event> {
        self.preset_key = key;
        self.mode = TimerMode::Focus;
        self.cycle_sessions = 0;
        self.reset_countdown();
        Some(Event::PresetChanged {
            preset: key,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn change_mode(&mut self, mode: TimerMode) -> Option<Event> {
        self.mode = mode;
        self.reset_countdown();
        Some(Event::ModeChanged {
            mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Redefine the custom preset's focus length.
    ///
    /// Takes effect on the next `reset()` or `change_preset()`, never on a
    /// countdown already in progress.
    pub fn set_custom_focus(&mut self, minutes: u64) -> Result<(), ValidationError> {
        self.presets.set_custom_focus(minutes)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset_countdown(&mut self) {
        self.running = false;
        self.active = self.presets.get(self.preset_key);
        self.remaining_secs = self.active.duration_secs(self.mode);
    }

    fn complete(&mut self) -> Event {
        let completed = self.mode;
        let next = match completed {
            TimerMode::Focus => {
                self.cycle_sessions += 1;
                let every = self.active.sessions_per_long_break.max(1);
                if self.cycle_sessions % every == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
        };
        self.mode = next;
        self.reset_countdown();
        Event::TimerCompleted {
            completed,
            next,
            cycle_sessions: self.cycle_sessions,
            at: Utc::now(),
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(PresetTable::default())
    }
}

/// Render seconds as `MM:SS`.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

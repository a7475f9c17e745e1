use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Accepted range for the custom preset's focus length, in minutes.
pub const CUSTOM_FOCUS_MIN: u64 = 1;
pub const CUSTOM_FOCUS_MAX: u64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Focus)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(TimerMode::Focus),
            "shortBreak" | "short-break" | "short" => Ok(TimerMode::ShortBreak),
            "longBreak" | "long-break" | "long" => Ok(TimerMode::LongBreak),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKey {
    Pomodoro,
    Deep,
    Distraction,
    Custom,
}

impl PresetKey {
    pub const ALL: [PresetKey; 4] = [
        PresetKey::Pomodoro,
        PresetKey::Deep,
        PresetKey::Distraction,
        PresetKey::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetKey::Pomodoro => "pomodoro",
            PresetKey::Deep => "deep",
            PresetKey::Distraction => "distraction",
            PresetKey::Custom => "custom",
        }
    }
}

impl Default for PresetKey {
    fn default() -> Self {
        PresetKey::Pomodoro
    }
}

impl fmt::Display for PresetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownPreset(s.to_string()))
    }
}

/// Durations for one focus/break cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub focus_minutes: u64,
    pub short_break_minutes: u64,
    pub long_break_minutes: u64,
    pub sessions_per_long_break: u64,
}

impl Preset {
    pub const POMODORO: Preset = Preset::new(25, 5, 15, 4);
    pub const DEEP: Preset = Preset::new(45, 10, 20, 3);
    pub const DISTRACTION: Preset = Preset::new(7, 3, 5, 1);
    pub const CUSTOM_DEFAULT: Preset = Preset::new(30, 5, 15, 4);

    pub const fn new(focus: u64, short_break: u64, long_break: u64, sessions: u64) -> Self {
        Self {
            focus_minutes: focus,
            short_break_minutes: short_break,
            long_break_minutes: long_break,
            sessions_per_long_break: sessions,
        }
    }

    pub fn minutes(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Focus => self.focus_minutes,
            TimerMode::ShortBreak => self.short_break_minutes,
            TimerMode::LongBreak => self.long_break_minutes,
        }
    }

    /// Duration of `mode` in seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        self.minutes(mode).saturating_mul(60)
    }
}

/// The preset catalog: three immutable built-ins and the user's custom preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetTable {
    custom: Preset,
}

impl PresetTable {
    pub fn new() -> Self {
        Self {
            custom: Preset::CUSTOM_DEFAULT,
        }
    }

    pub fn get(&self, key: PresetKey) -> Preset {
        match key {
            PresetKey::Pomodoro => Preset::POMODORO,
            PresetKey::Deep => Preset::DEEP,
            PresetKey::Distraction => Preset::DISTRACTION,
            PresetKey::Custom => self.custom,
        }
    }

    pub fn custom_focus_minutes(&self) -> u64 {
        self.custom.focus_minutes
    }

    /// Redefine the custom preset's focus length.
    ///
    /// Out-of-range values are rejected and leave the table untouched.
    pub fn set_custom_focus(&mut self, minutes: u64) -> Result<(), ValidationError> {
        if !(CUSTOM_FOCUS_MIN..=CUSTOM_FOCUS_MAX).contains(&minutes) {
            return Err(ValidationError::CustomDurationOutOfRange {
                got: minutes,
                min: CUSTOM_FOCUS_MIN,
                max: CUSTOM_FOCUS_MAX,
            });
        }
        self.custom.focus_minutes = minutes;
        Ok(())
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::new()
    }
}

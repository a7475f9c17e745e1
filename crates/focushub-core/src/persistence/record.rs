use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Ambience ids the front end knows how to render.
pub const AMBIENCES: [&str; 6] = ["simple", "rain", "nature", "fire", "ocean", "night"];
pub const DEFAULT_AMBIENCE: &str = "simple";

/// Map an arbitrary stored value onto a known ambience id.
pub fn normalize_ambience(id: &str) -> &'static str {
    AMBIENCES
        .into_iter()
        .find(|known| *known == id)
        .unwrap_or(DEFAULT_AMBIENCE)
}

/// Per-user Focus Hub state, as stored locally or under `focusHub` in the
/// user's remote document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceRecord {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub customizations: Customizations,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customizations {
    #[serde(default = "default_vibe")]
    pub selected_vibe: String,
    #[serde(default = "default_background")]
    pub background: String,
    /// Always written in full so a merge write never leaves a partial object.
    #[serde(default)]
    pub timer_settings: TimerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    #[serde(default = "default_duration")]
    pub default_duration: u64,
    #[serde(default = "default_break_duration")]
    pub break_duration: u64,
    #[serde(default)]
    pub auto_start: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_minutes: u64,
    #[serde(default)]
    pub last_session_at: Option<DateTime<Utc>>,
}

fn default_vibe() -> String {
    DEFAULT_AMBIENCE.into()
}
fn default_background() -> String {
    "default".into()
}
fn default_duration() -> u64 {
    25
}
fn default_break_duration() -> u64 {
    5
}

impl Default for Customizations {
    fn default() -> Self {
        Self {
            selected_vibe: default_vibe(),
            background: default_background(),
            timer_settings: TimerSettings::default(),
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
            break_duration: default_break_duration(),
            auto_start: false,
        }
    }
}

impl PersistenceRecord {
    /// A fresh record seeded with locally held tasks and ambience.
    pub fn seeded(tasks: Vec<Task>, selected_vibe: &str) -> Self {
        Self {
            tasks,
            customizations: Customizations {
                selected_vibe: normalize_ambience(selected_vibe).to_string(),
                ..Customizations::default()
            },
            statistics: Statistics::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_remote_document_fills_defaults() {
        let record: PersistenceRecord =
            serde_json::from_str(r#"{"tasks":[],"customizations":{"selectedVibe":"rain"}}"#).unwrap();
        assert_eq!(record.customizations.selected_vibe, "rain");
        assert_eq!(record.customizations.background, "default");
        assert_eq!(record.customizations.timer_settings, TimerSettings::default());
        assert_eq!(record.statistics.total_sessions, 0);
    }

    #[test]
    fn timer_settings_always_serialized_in_full() {
        let json = serde_json::to_value(PersistenceRecord::default()).unwrap();
        let settings = &json["customizations"]["timerSettings"];
        assert_eq!(settings["defaultDuration"], 25);
        assert_eq!(settings["breakDuration"], 5);
        assert_eq!(settings["autoStart"], false);
        assert!(json["statistics"]["lastSessionAt"].is_null());
    }

    #[test]
    fn unknown_ambience_falls_back() {
        assert_eq!(normalize_ambience("ocean"), "ocean");
        assert_eq!(normalize_ambience("disco"), "simple");
        let record = PersistenceRecord::seeded(Vec::new(), "disco");
        assert_eq!(record.customizations.selected_vibe, "simple");
    }
}

mod engine;
mod preset;

pub use engine::{format_time, TimerEngine, TimerState};
pub use preset::{
    Preset, PresetKey, PresetTable, TimerMode, CUSTOM_FOCUS_MAX, CUSTOM_FOCUS_MIN,
};

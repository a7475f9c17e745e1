//! User-facing completion feedback: messages, the sound cue, and email.

pub mod email;

use std::io::Write;

use crate::timer::TimerMode;

pub use email::{
    send_thank_you, thank_you_message, welcome_message, DemoSender, EmailMessage, EmailSender,
    HttpEmailSender,
};

/// Message shown when a countdown completes.
pub fn completion_message(completed: TimerMode, focus_minutes: u64) -> String {
    match completed {
        TimerMode::Focus => format!("{focus_minutes} minutes of focus done. Take a break!"),
        TimerMode::ShortBreak | TimerMode::LongBreak => {
            "Break is over! Start a new focus session.".to_string()
        }
    }
}

/// Audible signal played on completion. Callers ignore failures.
pub trait SoundCue: Send + Sync {
    fn play(&self) -> std::io::Result<()>;
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCue;

impl SoundCue for SilentCue {
    fn play(&self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl SoundCue for TerminalBell {
    fn play(&self) -> std::io::Result<()> {
        let mut err = std::io::stderr();
        err.write_all(b"\x07")?;
        err.flush()
    }
}

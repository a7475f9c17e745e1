use std::future::Future;
use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use focushub_core::storage::data_dir;
use focushub_core::{FocusHub, PresetKey, TimerMode};

use super::{print_events, CliResult, Session};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Stop and rewind the current mode
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Advance a running timer by N seconds
    Tick {
        #[arg(default_value = "1")]
        count: u64,
    },
    /// Start and count down in real time until the interval completes
    Run,
    /// Switch preset (pomodoro, deep, distraction, custom)
    Preset { key: PresetKey },
    /// Switch mode (focus, short-break, long-break)
    Mode { mode: TimerMode },
    /// Set the custom preset's focus minutes, remember them, and switch to it
    Custom { minutes: u64 },
}

pub async fn run(action: TimerAction) -> CliResult {
    let mut session = Session::open().await?;
    let hub = &mut session.hub;

    match action {
        TimerAction::Start => {
            hub.start();
        }
        TimerAction::Pause => {
            hub.pause();
        }
        TimerAction::Reset => {
            hub.reset();
        }
        TimerAction::Status => {}
        TimerAction::Tick { count } => {
            for _ in 0..count {
                if !hub.engine().is_running() {
                    break;
                }
                hub.tick();
            }
        }
        TimerAction::Preset { key } => {
            hub.change_preset(key);
        }
        TimerAction::Mode { mode } => {
            hub.change_mode(mode);
        }
        TimerAction::Custom { minutes } => {
            hub.apply_custom(minutes)?;
            session
                .config
                .set("timer.custom_focus_minutes", &minutes.to_string())?;
            session.config.save_in(&data_dir()?)?;
        }
        TimerAction::Run => {
            hub.start();
            hub.drain_events();
            count_down(hub, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;
        }
    }

    print_events(&mut session.hub)?;
    session.close().await;
    Ok(())
}

/// Tick once per second until the interval completes, the timer stops, or
/// `stop` resolves. The timer keeps running when stopped early so the
/// caller's suspend snapshots it as running.
async fn count_down(hub: &mut FocusHub, stop: impl Future<Output = ()>) {
    tokio::pin!(stop);
    let mut err = std::io::stderr();
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut stop => {
                let _ = writeln!(err);
                return;
            }
        }
        let completed = hub.tick();
        let _ = write!(err, "\r{} {}", hub.engine().mode(), hub.display());
        let _ = err.flush();
        if completed || !hub.engine().is_running() {
            let _ = writeln!(err);
            return;
        }
    }
}

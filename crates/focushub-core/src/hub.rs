//! The Focus Hub facade.
//!
//! `FocusHub` is the single owner of timer, ledger, task list and
//! persistence. Front ends call its commands from one event loop, call
//! `tick()` once per elapsed second while the timer runs, and drain the
//! resulting events.

use chrono::Utc;

use crate::error::ValidationError;
use crate::events::Event;
use crate::identity::UserProfile;
use crate::ledger::SessionLedger;
use crate::notify::{completion_message, SilentCue, SoundCue};
use crate::persistence::{
    BackendKind, Customizations, PersistenceCoordinator, PersistenceRecord, TimerSnapshot,
};
use crate::task::{Task, TaskList};
use crate::timer::{format_time, PresetKey, PresetTable, TimerEngine, TimerMode};

pub struct FocusHub {
    engine: TimerEngine,
    ledger: SessionLedger,
    tasks: TaskList,
    customizations: Customizations,
    coordinator: PersistenceCoordinator,
    cue: Box<dyn SoundCue>,
    events: Vec<Event>,
    /// Epoch millis at which `remaining_secs` was exact while running.
    clock_anchor_ms: Option<i64>,
}

impl FocusHub {
    pub fn new(coordinator: PersistenceCoordinator, presets: PresetTable) -> Self {
        Self::with_preset(coordinator, presets, PresetKey::default())
    }

    pub fn with_preset(
        coordinator: PersistenceCoordinator,
        presets: PresetTable,
        preset: PresetKey,
    ) -> Self {
        Self {
            engine: TimerEngine::with_preset(presets, preset),
            ledger: SessionLedger::new(),
            tasks: TaskList::new(),
            customizations: Customizations::default(),
            coordinator,
            cue: Box::new(SilentCue),
            events: Vec::new(),
            clock_anchor_ms: None,
        }
    }

    pub fn with_cue(mut self, cue: Box<dyn SoundCue>) -> Self {
        self.cue = cue;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn ambience(&self) -> &str {
        &self.customizations.selected_vibe
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.coordinator.backend_kind()
    }

    pub fn coordinator(&self) -> &PersistenceCoordinator {
        &self.coordinator
    }

    pub fn minutes_focused(&self) -> u64 {
        self.ledger.minutes_focused(&self.engine.active_preset())
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format_time(self.engine.remaining_secs())
    }

    /// The durable view of the current state.
    pub fn record(&self) -> PersistenceRecord {
        PersistenceRecord {
            tasks: self.tasks.tasks().to_vec(),
            customizations: self.customizations.clone(),
            statistics: self.ledger.statistics(&self.engine.active_preset()),
        }
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            preset: self.engine.preset_key(),
            mode: self.engine.mode(),
            running: self.engine.is_running(),
            remaining_secs: self.engine.remaining_secs(),
            total_secs: self.engine.total_secs(),
            display: self.display(),
            sessions_completed: self.ledger.sessions_completed(),
            minutes_focused: self.minutes_focused(),
            active_task: self.tasks.active_id().map(str::to_string),
            at: Utc::now(),
        }
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Adopt the persisted state for `user` (guest when `None`).
    pub async fn load(&mut self, user: Option<&UserProfile>) {
        let in_memory = self.record();
        let record = self.coordinator.load(user, &in_memory).await;
        self.tasks.replace(record.tasks);
        self.ledger = SessionLedger::from_statistics(&record.statistics);
        self.customizations = record.customizations;
    }

    /// Restore the timer from the local snapshot, fast-forwarded to now.
    /// Returns false when there was nothing to restore.
    pub fn restore_timer(&mut self) -> bool {
        self.restore_timer_at(Utc::now().timestamp_millis())
    }

    pub fn restore_timer_at(&mut self, now_ms: i64) -> bool {
        let Some(snapshot) = self.coordinator.restore_timer(now_ms) else {
            return false;
        };
        if let Some(id) = snapshot.active_task.as_deref() {
            if self.tasks.set_active(id).is_err() {
                tracing::debug!(task = id, "stored active task no longer exists");
            }
        }
        self.clock_anchor_ms = snapshot.is_running.then_some(snapshot.last_update);
        self.engine = snapshot.into_engine(self.engine.presets().clone());
        true
    }

    /// Persist the timer snapshot and flush any pending write.
    pub async fn suspend(&mut self) {
        self.save_timer();
        self.coordinator.flush().await;
    }

    // ── Timer commands ───────────────────────────────────────────────

    /// Start the countdown. With no active task, the first incomplete
    /// task (or else the first task) becomes active.
    pub fn start(&mut self) -> bool {
        if self.tasks.active().is_none() {
            let first = self
                .tasks
                .first_incomplete()
                .or_else(|| self.tasks.tasks().first())
                .map(|t| t.id.clone());
            if let Some(id) = first {
                let _ = self.tasks.set_active(&id);
            }
        }
        let started = self.emit(|engine| engine.start());
        if started {
            self.clock_anchor_ms = Some(Utc::now().timestamp_millis());
        }
        started
    }

    pub fn pause(&mut self) -> bool {
        self.stop_with(|engine| engine.pause())
    }

    pub fn reset(&mut self) -> bool {
        self.stop_with(|engine| engine.reset())
    }

    pub fn toggle(&mut self) -> bool {
        if self.engine.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn change_preset(&mut self, key: PresetKey) -> bool {
        self.stop_with(|engine| engine.change_preset(key))
    }

    pub fn change_mode(&mut self, mode: TimerMode) -> bool {
        self.stop_with(|engine| engine.change_mode(mode))
    }

    /// Redefine the custom preset's focus length and switch to it.
    pub fn apply_custom(&mut self, minutes: u64) -> Result<(), ValidationError> {
        self.engine.set_custom_focus(minutes)?;
        self.change_preset(PresetKey::Custom);
        Ok(())
    }

    /// Advance by one second. Returns true when a countdown completed.
    pub fn tick(&mut self) -> bool {
        if self.engine.is_running() {
            if let Some(anchor) = self.clock_anchor_ms.as_mut() {
                *anchor += 1000;
            }
        }
        let Some(event) = self.engine.tick() else {
            return false;
        };
        let Event::TimerCompleted { completed, at, .. } = event else {
            self.events.push(event);
            return false;
        };
        if !completed.is_break() {
            self.ledger.record_focus_completion(at);
            if let Some(id) = self.tasks.active_id().map(str::to_string) {
                self.tasks.increment_sessions(&id);
            }
            self.persist();
        }
        let message = completion_message(completed, self.engine.active_preset().focus_minutes);
        self.events.push(event);
        self.events.push(Event::Notification {
            message,
            at: Utc::now(),
        });
        if let Err(e) = self.cue.play() {
            tracing::debug!("completion cue failed: {e}");
        }
        self.save_timer();
        true
    }

    // ── Task commands ────────────────────────────────────────────────

    pub fn add_task(&mut self, text: &str, target_sessions: u32) -> Result<String, ValidationError> {
        let id = self.tasks.add(text, target_sessions)?;
        self.persist();
        Ok(id)
    }

    pub fn toggle_task(&mut self, id: &str) -> bool {
        let found = self.tasks.toggle_complete(id);
        if found {
            self.persist();
        }
        found
    }

    pub fn remove_task(&mut self, id: &str) -> Option<Task> {
        let removed = self.tasks.remove(id)?;
        self.persist();
        Some(removed)
    }

    pub fn clear_completed(&mut self) -> usize {
        let removed = self.tasks.clear_completed();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    pub fn select_task(&mut self, id: &str) -> Result<(), ValidationError> {
        self.tasks.set_active(id)
    }

    // ── Ambience ─────────────────────────────────────────────────────

    /// Select an ambience. Stored on the device immediately; unknown ids
    /// fall back to the default. Returns the id in effect.
    pub fn set_ambience(&mut self, id: &str) -> &str {
        let id = self.coordinator.set_ambience(id);
        if self.customizations.selected_vibe != id {
            self.customizations.selected_vibe = id.to_string();
            self.persist();
        }
        &self.customizations.selected_vibe
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn emit(&mut self, command: impl FnOnce(&mut TimerEngine) -> Option<Event>) -> bool {
        match command(&mut self.engine) {
            Some(event) => {
                self.events.push(event);
                true
            }
            None => false,
        }
    }

    /// Run a command that leaves the timer stopped, then snapshot it.
    fn stop_with(&mut self, command: impl FnOnce(&mut TimerEngine) -> Option<Event>) -> bool {
        let changed = self.emit(command);
        if changed {
            self.save_timer();
        }
        changed
    }

    fn persist(&mut self) {
        let record = self.record();
        self.coordinator.schedule_save(record);
    }

    fn save_timer(&self) {
        let now_ms = Utc::now().timestamp_millis();
        let at = match self.clock_anchor_ms {
            Some(anchor) if self.engine.is_running() => anchor.min(now_ms),
            _ => now_ms,
        };
        let snapshot = TimerSnapshot::capture(
            &self.engine,
            self.ledger.sessions_completed(),
            self.tasks.active_id(),
            at,
        );
        if let Err(e) = self.coordinator.save_timer_snapshot(&snapshot) {
            tracing::warn!("failed to save timer snapshot: {e}");
        }
    }
}

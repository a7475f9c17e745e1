//! End-to-end behaviour of the Focus Hub over in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use focushub_core::identity::register_profile;
use focushub_core::persistence::{
    read_tasks, DocumentStore, LocalStorage, MemoryDocumentStore, MemoryStorage,
};
use focushub_core::{
    BackendKind, FocusHub, PersistenceCoordinator, PresetKey, PresetTable, TimerMode, UserProfile,
};

const DEBOUNCE: Duration = Duration::from_secs(2);

struct Stores {
    local: Arc<MemoryStorage>,
    remote: Arc<MemoryDocumentStore>,
}

impl Stores {
    fn new() -> Self {
        Self {
            local: Arc::new(MemoryStorage::new()),
            remote: Arc::new(MemoryDocumentStore::new()),
        }
    }

    fn hub(&self) -> FocusHub {
        let local: Arc<dyn LocalStorage> = self.local.clone();
        let remote: Arc<dyn DocumentStore> = self.remote.clone();
        let coordinator = PersistenceCoordinator::new(local, Some(remote), DEBOUNCE);
        FocusHub::new(coordinator, PresetTable::default())
    }
}

fn run_to_completion(hub: &mut FocusHub) -> u64 {
    hub.start();
    let mut ticks = 0;
    loop {
        ticks += 1;
        if hub.tick() {
            return ticks;
        }
    }
}

#[test]
fn scenario_a_pomodoro_focus_completion() {
    let stores = Stores::new();
    let mut hub = stores.hub();
    assert_eq!(hub.engine().preset_key(), PresetKey::Pomodoro);

    assert_eq!(run_to_completion(&mut hub), 1500);
    assert_eq!(hub.engine().mode(), TimerMode::ShortBreak);
    assert_eq!(hub.engine().remaining_secs(), 300);
    assert_eq!(hub.ledger().sessions_completed(), 1);
    assert_eq!(hub.minutes_focused(), 25);
}

#[test]
fn scenario_b_one_minute_custom_preset() {
    let stores = Stores::new();
    let mut hub = stores.hub();
    hub.apply_custom(1).unwrap();
    assert_eq!(run_to_completion(&mut hub), 60);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_guest_tasks_survive_reload_without_remote_writes() {
    let stores = Stores::new();
    {
        let mut hub = stores.hub();
        hub.load(None).await;
        for text in ["Flashcards", "Problem set", "Read ch. 4"] {
            hub.add_task(text, 1).unwrap();
        }
        hub.suspend().await;
    }

    let mut reloaded = stores.hub();
    reloaded.load(None).await;
    assert_eq!(reloaded.backend_kind(), BackendKind::Local);
    let texts: Vec<&str> = reloaded.tasks().tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["Read ch. 4", "Problem set", "Flashcards"]);
    assert_eq!(stores.remote.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn scenario_d_first_login_seeds_remote_from_local_tasks() {
    let stores = Stores::new();
    {
        let mut guest = stores.hub();
        guest.load(None).await;
        guest.add_task("Outline essay", 2).unwrap();
        guest.add_task("Lab report", 1).unwrap();
        guest.suspend().await;
    }
    assert_eq!(read_tasks(stores.local.as_ref()).len(), 2);

    let user = UserProfile::new("uid-42", "maya@example.com");
    let mut hub = stores.hub();
    hub.load(Some(&user)).await;

    assert_eq!(hub.backend_kind(), BackendKind::Remote);
    assert_eq!(hub.tasks().len(), 2);
    assert_eq!(stores.remote.write_count(), 1);
    let doc = stores.remote.peek("users/uid-42").unwrap();
    let tasks = doc["focusHub"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["text"], "Lab report");
    assert_eq!(tasks[0]["sessions"], 1);
}

#[test]
fn scenario_e_active_task_collects_focus_sessions() {
    let stores = Stores::new();
    let mut hub = stores.hub();
    hub.change_preset(PresetKey::Distraction);
    let id = hub.add_task("Vocabulary", 2).unwrap();
    assert_eq!(hub.tasks().active_id(), Some(id.as_str()));

    run_to_completion(&mut hub);
    assert_eq!(hub.engine().mode(), TimerMode::LongBreak);
    run_to_completion(&mut hub);
    assert_eq!(hub.engine().mode(), TimerMode::Focus);
    run_to_completion(&mut hub);

    let task = hub.tasks().get(&id).unwrap();
    assert_eq!(task.completed_sessions, 2);
    assert_eq!(task.progress_label(), "2/2");
    assert!(!task.completed);
    assert_eq!(hub.ledger().sessions_completed(), 2);
}

#[test]
fn empty_task_text_is_rejected() {
    let stores = Stores::new();
    let mut hub = stores.hub();
    hub.add_task("keep", 1).unwrap();
    assert!(hub.add_task("   ", 1).is_err());
    assert!(hub.add_task("", 3).is_err());
    assert!(hub.add_task("zero", 0).is_err());
    assert_eq!(hub.tasks().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn mutations_within_window_produce_one_remote_write() {
    let stores = Stores::new();
    let user = UserProfile::new("uid-1", "sam@example.com");
    let mut hub = stores.hub();
    hub.load(Some(&user)).await;
    let baseline = stores.remote.write_count();

    for n in 0..6 {
        hub.add_task(&format!("task {n}"), 1).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    assert_eq!(stores.remote.write_count(), baseline);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(stores.remote.write_count(), baseline + 1);
    let doc = stores.remote.peek("users/uid-1").unwrap();
    assert_eq!(doc["focusHub"]["tasks"].as_array().unwrap().len(), 6);
    assert_eq!(doc["focusHub"]["tasks"][0]["text"], "task 5");
}

#[tokio::test(start_paused = true)]
async fn signing_in_flushes_pending_guest_write_locally() {
    let stores = Stores::new();
    let mut hub = stores.hub();
    hub.load(None).await;
    hub.add_task("draft", 1).unwrap();
    assert!(read_tasks(stores.local.as_ref()).is_empty());

    hub.load(Some(&UserProfile::new("uid-9", "kim@example.com"))).await;
    assert_eq!(read_tasks(stores.local.as_ref()).len(), 1);
    let doc = stores.remote.peek("users/uid-9").unwrap();
    assert_eq!(doc["focusHub"]["tasks"][0]["text"], "draft");
}

#[tokio::test(start_paused = true)]
async fn offline_remote_keeps_in_memory_state() {
    let stores = Stores::new();
    let mut hub = stores.hub();
    hub.load(None).await;
    hub.add_task("survives", 1).unwrap();

    stores.remote.set_offline(true);
    hub.load(Some(&UserProfile::new("uid-3", "lee@example.com"))).await;
    assert_eq!(hub.tasks().len(), 1);
    assert_eq!(hub.backend_kind(), BackendKind::Remote);

    hub.add_task("also survives", 1).unwrap();
    hub.suspend().await;
    assert_eq!(stores.remote.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn elapsed_interval_restores_paused_at_zero_without_replay() {
    let stores = Stores::new();
    {
        let mut hub = stores.hub();
        hub.load(None).await;
        let id = hub.add_task("long read", 4).unwrap();
        hub.select_task(&id).unwrap();
        hub.start();
        for _ in 0..100 {
            hub.tick();
        }
        hub.suspend().await;
    }

    let mut hub = stores.hub();
    hub.load(None).await;
    let an_hour_later = Utc::now().timestamp_millis() + 3_600_000;
    assert!(hub.restore_timer_at(an_hour_later));

    assert_eq!(hub.engine().mode(), TimerMode::Focus);
    assert_eq!(hub.engine().remaining_secs(), 0);
    assert!(!hub.engine().is_running());
    assert_eq!(hub.ledger().sessions_completed(), 0);
    let active = hub.tasks().active().unwrap();
    assert_eq!(active.text, "long read");
    assert_eq!(active.completed_sessions, 0);
}

#[tokio::test(start_paused = true)]
async fn short_absence_resumes_running_timer() {
    let stores = Stores::new();
    {
        let mut hub = stores.hub();
        hub.change_preset(PresetKey::Deep);
        hub.start();
        hub.suspend().await;
    }

    let mut hub = stores.hub();
    let later = Utc::now().timestamp_millis() + 90_000;
    assert!(hub.restore_timer_at(later));
    assert_eq!(hub.engine().preset_key(), PresetKey::Deep);
    assert!(hub.engine().is_running());
    let remaining = hub.engine().remaining_secs();
    assert!((2600..=2610).contains(&remaining), "remaining = {remaining}");
}

#[tokio::test(start_paused = true)]
async fn ambience_is_device_local_across_accounts() {
    let stores = Stores::new();
    let mut hub = stores.hub();
    hub.load(None).await;
    hub.set_ambience("ocean");

    hub.load(Some(&UserProfile::new("uid-5", "ana@example.com"))).await;
    assert_eq!(hub.ambience(), "ocean");
}

#[tokio::test(start_paused = true)]
async fn registering_profile_does_not_block_first_login_seeding() {
    let stores = Stores::new();
    {
        let mut guest = stores.hub();
        guest.load(None).await;
        guest.add_task("Outline essay", 2).unwrap();
        guest.add_task("Lab report", 1).unwrap();
        guest.suspend().await;
    }

    let user = UserProfile::new("uid-7", "ren@example.com").with_display_name("Ren");
    assert!(register_profile(stores.remote.as_ref(), &user).await.unwrap());

    let mut hub = stores.hub();
    hub.load(Some(&user)).await;
    assert_eq!(hub.tasks().len(), 2);

    let doc = stores.remote.peek("users/uid-7").unwrap();
    assert_eq!(doc["displayName"], "Ren");
    assert_eq!(doc["themePreference"], "system");
    assert_eq!(doc["focusHub"]["tasks"].as_array().unwrap().len(), 2);
}

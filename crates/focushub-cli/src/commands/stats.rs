use serde_json::json;

use super::{print_json, CliResult, Session};

pub async fn run(json: bool) -> CliResult {
    let session = Session::open().await?;
    let hub = &session.hub;
    let ledger = hub.ledger();
    let pending = hub.tasks().pending().count();
    let done = hub.tasks().done().count();

    if json {
        print_json(&json!({
            "sessionsCompleted": ledger.sessions_completed(),
            "minutesFocused": hub.minutes_focused(),
            "lastSessionAt": ledger.last_session_at(),
            "tasksPending": pending,
            "tasksDone": done,
            "backend": hub.backend_kind(),
        }))?;
    } else {
        println!("Sessions completed: {}", ledger.sessions_completed());
        println!("Minutes focused:    {}", hub.minutes_focused());
        match ledger.last_session_at() {
            Some(at) => println!("Last session:       {}", at.format("%Y-%m-%d %H:%M UTC")),
            None => println!("Last session:       never"),
        }
        println!("Tasks:              {pending} pending, {done} done");
    }

    session.close().await;
    Ok(())
}

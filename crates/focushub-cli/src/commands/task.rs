use clap::Subcommand;

use super::{print_json, CliResult, Session};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the top of the list
    Add {
        text: String,
        /// Target number of focus sessions
        #[arg(long, default_value = "1")]
        sessions: u32,
    },
    /// List tasks
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task done or not done
    Toggle { id: String },
    /// Delete a task
    Remove { id: String },
    /// Delete every completed task
    ClearCompleted,
    /// Make a task the active one
    Select { id: String },
}

pub async fn run(action: TaskAction) -> CliResult {
    let mut session = Session::open().await?;
    let hub = &mut session.hub;

    match action {
        TaskAction::Add { text, sessions } => {
            let id = hub.add_task(&text, sessions)?;
            println!("Task created: {id}");
        }
        TaskAction::List { json } => {
            if json {
                print_json(&hub.tasks().tasks())?;
            } else if hub.tasks().is_empty() {
                println!("No tasks.");
            } else {
                let active = hub.tasks().active_id();
                for task in hub.tasks().tasks() {
                    let marker = if active == Some(task.id.as_str()) { '>' } else { ' ' };
                    let check = if task.completed { 'x' } else { ' ' };
                    println!(
                        "{marker} [{check}] {}  {}  ({})",
                        task.id,
                        task.text,
                        task.progress_label()
                    );
                }
            }
        }
        TaskAction::Toggle { id } => {
            if !hub.toggle_task(&id) {
                return Err(format!("task not found: {id}").into());
            }
            println!("Task toggled: {id}");
        }
        TaskAction::Remove { id } => match hub.remove_task(&id) {
            Some(task) => println!("Task removed: {}", task.text),
            None => return Err(format!("task not found: {id}").into()),
        },
        TaskAction::ClearCompleted => {
            let removed = hub.clear_completed();
            println!("Removed {removed} completed task(s)");
        }
        TaskAction::Select { id } => {
            hub.select_task(&id)?;
            println!("Active task: {id}");
        }
    }

    session.close().await;
    Ok(())
}

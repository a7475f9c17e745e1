//! User-defined work items and the active-task selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A work item. Field names match the stored JSON so existing local and
/// remote records load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(rename = "sessions")]
    pub target_sessions: u32,
    #[serde(default)]
    pub completed_sessions: u32,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.completed_sessions, self.target_sessions)
    }
}

/// Ordered task collection, newest first.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    active: Option<String>,
    /// Highest id handed out so far; ids are creation-time millis bumped
    /// past this value to stay unique within a burst.
    last_id: u64,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let last_id = tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            tasks,
            active: None,
            last_id,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Task> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    pub fn first_incomplete(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| !t.completed)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn done(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add(&mut self, text: &str, target_sessions: u32) -> Result<String, ValidationError> {
        self.add_at(text, target_sessions, Utc::now())
    }

    /// Insert a task at the front of the list and return its id.
    ///
    /// The new task becomes active only when nothing is active yet.
    pub fn add_at(
        &mut self,
        text: &str,
        target_sessions: u32,
        now: DateTime<Utc>,
    ) -> Result<String, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyTaskText);
        }
        if target_sessions == 0 {
            return Err(ValidationError::ZeroTargetSessions);
        }

        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last_id = millis.max(self.last_id + 1);
        let id = self.last_id.to_string();

        self.tasks.insert(
            0,
            Task {
                id: id.clone(),
                text: text.to_string(),
                target_sessions,
                completed_sessions: 0,
                completed: false,
                created_at: now,
            },
        );
        if self.active.is_none() {
            self.active = Some(id.clone());
        }
        Ok(id)
    }

    /// Flip the completed flag. Returns false when the id is unknown.
    pub fn toggle_complete(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Delete a task. Removing the active task clears the selection
    /// without promoting another one.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        Some(self.tasks.remove(index))
    }

    /// Drop every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        if let Some(active) = self.active.as_deref() {
            if self.get(active).is_none() {
                self.active = None;
            }
        }
        before - self.tasks.len()
    }

    pub fn set_active(&mut self, id: &str) -> Result<(), ValidationError> {
        if self.get(id).is_none() {
            return Err(ValidationError::TaskNotFound(id.to_string()));
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    /// Credit one focus session to a task. Returns false when the id is unknown.
    pub fn increment_sessions(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed_sessions = task.completed_sessions.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Replace the task set, keeping the active selection if it still exists.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        let active = self.active.take();
        *self = Self::from_tasks(tasks);
        if let Some(id) = active {
            if self.get(&id).is_some() {
                self.active = Some(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn empty_text_is_rejected() {
        let mut list = TaskList::new();
        assert_eq!(list.add("   ", 1), Err(ValidationError::EmptyTaskText));
        assert_eq!(list.add("", 1), Err(ValidationError::EmptyTaskText));
        assert!(list.is_empty());
        assert!(list.active_id().is_none());
    }

    #[test]
    fn zero_target_is_rejected() {
        let mut list = TaskList::new();
        assert_eq!(list.add("Read", 0), Err(ValidationError::ZeroTargetSessions));
        assert!(list.is_empty());
    }

    #[test]
    fn first_task_becomes_active_only() {
        let mut list = TaskList::new();
        let first = list.add_at("  Read chapter 3 ", 2, at(1_000)).unwrap();
        let second = list.add_at("Flashcards", 1, at(2_000)).unwrap();
        assert_eq!(list.active_id(), Some(first.as_str()));
        assert_eq!(list.tasks()[0].id, second);
        assert_eq!(list.tasks()[1].text, "Read chapter 3");
    }

    #[test]
    fn ids_stay_unique_within_same_millisecond() {
        let mut list = TaskList::new();
        let a = list.add_at("a", 1, at(5_000)).unwrap();
        let b = list.add_at("b", 1, at(5_000)).unwrap();
        let c = list.add_at("c", 1, at(4_000)).unwrap();
        assert_eq!(a, "5000");
        assert_eq!(b, "5001");
        assert_eq!(c, "5002");
    }

    #[test]
    fn removing_active_clears_selection() {
        let mut list = TaskList::new();
        let first = list.add("one", 1).unwrap();
        list.add("two", 1).unwrap();
        assert!(list.remove(&first).is_some());
        assert!(list.active_id().is_none());
        assert_eq!(list.len(), 1);
        assert!(list.remove("missing").is_none());
    }

    #[test]
    fn clear_completed_drops_done_tasks() {
        let mut list = TaskList::new();
        let one = list.add("one", 1).unwrap();
        let two = list.add("two", 1).unwrap();
        list.toggle_complete(&one);
        assert_eq!(list.clear_completed(), 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list.tasks()[0].id, two);
        assert!(list.active_id().is_none());
    }

    #[test]
    fn set_active_allows_completed_tasks() {
        let mut list = TaskList::new();
        list.add("one", 1).unwrap();
        let two = list.add("two", 1).unwrap();
        list.toggle_complete(&two);
        list.set_active(&two).unwrap();
        assert_eq!(list.active_id(), Some(two.as_str()));
        assert!(list.set_active("nope").is_err());
    }

    #[test]
    fn increment_is_not_capped() {
        let mut list = TaskList::new();
        let id = list.add("one", 1).unwrap();
        list.increment_sessions(&id);
        list.increment_sessions(&id);
        assert_eq!(list.get(&id).unwrap().completed_sessions, 2);
        assert_eq!(list.get(&id).unwrap().progress_label(), "2/1");
    }

    #[test]
    fn stored_json_uses_sessions_key() {
        let json = r#"[{"id":"1700000000000","text":"Essay","sessions":3,"completedSessions":1,"completed":false,"createdAt":"2024-01-01T00:00:00Z"}]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
        assert_eq!(tasks[0].target_sessions, 3);

        let mut list = TaskList::from_tasks(tasks);
        let id = list.add_at("next", 1, at(1_000)).unwrap();
        assert_eq!(id, "1700000000001");

        let out = serde_json::to_value(list.tasks()).unwrap();
        assert_eq!(out[1]["sessions"], 3);
    }

    #[test]
    fn replace_keeps_existing_active() {
        let mut list = TaskList::new();
        let id = list.add("one", 1).unwrap();
        let tasks = list.tasks().to_vec();
        list.replace(tasks);
        assert_eq!(list.active_id(), Some(id.as_str()));
        list.replace(Vec::new());
        assert!(list.active_id().is_none());
    }
}

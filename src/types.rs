//! Core types for the todo list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Workflow status of a todo.
///
/// The stored and displayed text is the human-readable label, so the column
/// holds `Pending`, `In Progress` or `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TodoStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TodoStatus {
    /// All statuses in the order they are offered to the user.
    pub const ALL: [TodoStatus; 3] = [
        TodoStatus::Pending,
        TodoStatus::InProgress,
        TodoStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "Pending",
            TodoStatus::InProgress => "In Progress",
            TodoStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown todo status '{0}' (expected one of: Pending, In Progress, Completed)")]
pub struct ParseStatusError(pub String);

impl FromStr for TodoStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TodoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A single todo row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub status: TodoStatus,
    /// Milliseconds since the Unix epoch, assigned by the store.
    pub created_at: i64,
}

/// Aggregate counters derived from a list snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodoCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
}

impl TodoCounts {
    /// Count a freshly fetched snapshot. Nothing is cached between renders.
    pub fn from_todos(todos: &[Todo]) -> Self {
        todos.iter().fold(
            TodoCounts {
                total: todos.len(),
                ..Default::default()
            },
            |mut counts, todo| {
                match todo.status {
                    TodoStatus::Completed => counts.completed += 1,
                    TodoStatus::Pending => counts.pending += 1,
                    TodoStatus::InProgress => counts.in_progress += 1,
                }
                counts
            },
        )
    }
}

/// Returns true if the task text is acceptable for a new todo.
pub fn is_valid_task(task: &str) -> bool {
    !task.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: i64, status: TodoStatus) -> Todo {
        Todo {
            id,
            task: format!("task {}", id),
            status,
            created_at: id,
        }
    }

    #[test]
    fn status_parses_display_labels() {
        for status in TodoStatus::ALL {
            assert_eq!(status.as_str().parse::<TodoStatus>(), Ok(status));
        }
        assert_eq!(
            "In Progress".parse::<TodoStatus>(),
            Ok(TodoStatus::InProgress)
        );
    }

    #[test]
    fn status_rejects_unknown_text() {
        let err = "in_progress".parse::<TodoStatus>().unwrap_err();
        assert_eq!(err, ParseStatusError("in_progress".to_string()));
        assert!(err.to_string().contains("in_progress"));
        assert!("pending".parse::<TodoStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&TodoStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn counts_empty_snapshot() {
        assert_eq!(TodoCounts::from_todos(&[]), TodoCounts::default());
    }

    #[test]
    fn counts_by_status() {
        let todos = vec![
            todo(1, TodoStatus::Pending),
            todo(2, TodoStatus::Completed),
            todo(3, TodoStatus::InProgress),
            todo(4, TodoStatus::Pending),
        ];
        let counts = TodoCounts::from_todos(&todos);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.in_progress, 1);
        assert!(counts.completed + counts.pending <= counts.total);
    }

    #[test]
    fn blank_task_is_invalid() {
        assert!(!is_valid_task(""));
        assert!(!is_valid_task("   \t"));
        assert!(is_valid_task("Buy milk"));
    }
}

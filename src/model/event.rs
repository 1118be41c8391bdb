//! Task lifecycle events, the payload carried over the broker.

use super::{Task, TaskId, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskEventType {
    Created,
    Deleted,
    Overdue,
}

impl std::fmt::Display for TaskEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskEventType::Created => "CREATED",
            TaskEventType::Deleted => "DELETED",
            TaskEventType::Overdue => "OVERDUE",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub event_type: TaskEventType,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

impl TaskEvent {
    pub fn new(task: &Task, event_type: TaskEventType) -> Self {
        let message = match event_type {
            TaskEventType::Created => format!("Task '{}' created", task.title),
            TaskEventType::Deleted => format!("Task '{}' deleted", task.title),
            TaskEventType::Overdue => format!("Task '{}' is overdue!", task.title),
        };
        Self {
            task_id: task.id,
            user_id: task.user_id,
            event_type,
            message,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }

    pub fn created(task: &Task) -> Self {
        Self::new(task, TaskEventType::Created)
    }

    pub fn deleted(task: &Task) -> Self {
        Self::new(task, TaskEventType::Deleted)
    }

    pub fn overdue(task: &Task) -> Self {
        Self::new(task, TaskEventType::Overdue)
    }
}

//! User-facing notifications produced from task events.

use super::{TaskEvent, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

uuid_id!(
    /// Newtype for notification IDs.
    NotificationId
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub task_id: TaskId,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    /// A fresh, unread notification.
    pub fn new(user_id: UserId, task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            task_id,
            message: message.into(),
            created_at: Utc::now(),
            read: false,
        }
    }
}

impl From<&TaskEvent> for Notification {
    fn from(event: &TaskEvent) -> Self {
        Self::new(event.user_id, event.task_id, event.message.clone())
    }
}

//! Repository traits shared by the in-memory and Postgres adapters.
//!
//! Services hold `Arc<dyn ...Repository>` and never know which adapter is
//! behind it; the profile decides at startup (see [`crate::app`]).

pub mod memory;

use crate::error::Result;
use crate::model::{Notification, NotificationId, Task, TaskId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::{InMemoryNotificationRepository, InMemoryTaskRepository, InMemoryUserRepository};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Insert or replace by id.
    async fn save(&self, user: User) -> Result<User>;

    /// Insert a new user. The username check and the write are one step:
    /// a taken username is `Error::Conflict`.
    async fn insert(&self, user: User) -> Result<User>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All non-deleted tasks for a user, oldest first.
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>>;

    /// Tasks that are neither completed nor deleted.
    async fn find_pending_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>>;

    /// Pending tasks, across all users, whose target date is before `now`.
    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Task>>;

    /// Insert or replace by id.
    async fn save(&self, task: Task) -> Result<Task>;

    /// Soft delete. Returns the updated task, or `None` if no such id.
    async fn delete_by_id(&self, id: TaskId) -> Result<Option<Task>>;

    /// Set `completed` in place, leaving every other column alone. Returns
    /// the updated task, or `None` if no such id.
    async fn mark_completed(&self, id: TaskId) -> Result<Option<Task>>;

    /// Lookup by id. Deleted tasks are still returned.
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// All notifications for a user, oldest first.
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Notification>>;

    /// Unread notifications for a user.
    async fn find_pending_by_user_id(&self, user_id: UserId) -> Result<Vec<Notification>>;

    /// Returns `false` if no notification has this id.
    async fn mark_as_read(&self, id: NotificationId) -> Result<bool>;

    async fn save(&self, notification: Notification) -> Result<Notification>;
}

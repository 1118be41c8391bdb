//! Map-backed repositories for the `dev` profile and tests.

use super::{NotificationRepository, TaskRepository, UserRepository};
use crate::error::{Error, Result};
use crate::model::{Notification, NotificationId, Task, TaskId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Collect matching values ordered by creation time, so listings come back in
/// the same order the Postgres adapter returns them.
fn sorted_by<T: Clone, K: Ord>(
    values: impl Iterator<Item = T>,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    let mut out: Vec<T> = values.collect();
    out.sort_by_key(|v| key(v));
    out
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }

    async fn insert(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(Error::Conflict(format!("username {} is taken", user.username)));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, pred: impl Fn(&Task) -> bool) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        sorted_by(tasks.values().filter(|t| pred(*t)).cloned(), |t| {
            (t.created_at, t.id)
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>> {
        Ok(self
            .filtered(|t| t.user_id == user_id && !t.deleted)
            .await)
    }

    async fn find_pending_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>> {
        Ok(self
            .filtered(|t| t.user_id == user_id && t.is_pending())
            .await)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        Ok(self.filtered(|t| t.is_overdue(now)).await)
    }

    async fn save(&self, task: Task) -> Result<Task> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn delete_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(&id).map(|task| {
            task.deleted = true;
            task.clone()
        }))
    }

    async fn mark_completed(&self, id: TaskId) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(&id).map(|task| {
            task.completed = true;
            task.clone()
        }))
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, pred: impl Fn(&Notification) -> bool) -> Vec<Notification> {
        let notifications = self.notifications.read().await;
        sorted_by(
            notifications.values().filter(|n| pred(*n)).cloned(),
            |n| (n.created_at, n.id),
        )
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Notification>> {
        Ok(self.filtered(|n| n.user_id == user_id).await)
    }

    async fn find_pending_by_user_id(&self, user_id: UserId) -> Result<Vec<Notification>> {
        Ok(self.filtered(|n| n.user_id == user_id && !n.read).await)
    }

    async fn mark_as_read(&self, id: NotificationId) -> Result<bool> {
        let mut notifications = self.notifications.write().await;
        match notifications.get_mut(&id) {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save(&self, notification: Notification) -> Result<Notification> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(notification)
    }
}

//! Task operations with a read-through cache and event publishing.
//!
//! Reads go to [`TaskCache`] first; a miss takes the key's generation before
//! querying the store so a concurrent eviction voids the fill. Every write
//! evicts the entries it can
//! invalidate (the owner's two list keys, plus the task's own key for updates
//! to an existing task) and then publishes a [`TaskEvent`]. A failed publish
//! is logged; the write itself has already happened and stands.

use crate::cache::{CacheKey, TaskCache};
use crate::error::{Error, Result};
use crate::events::{EventPublisher, publish_recorded};
use crate::model::{NewTask, Task, TaskEvent, TaskId, UserId};
use crate::repo::TaskRepository;
use crate::telemetry::metrics;
use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use std::sync::Arc;
use tracing::{Instrument, info, warn};

#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    cache: Arc<TaskCache>,
    publisher: Arc<dyn EventPublisher>,
}

impl TaskService {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        cache: Arc<TaskCache>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repo,
            cache,
            publisher,
        }
    }

    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    pub fn publisher(&self) -> &Arc<dyn EventPublisher> {
        &self.publisher
    }

    pub async fn get_all_tasks_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>> {
        let key = CacheKey::UserTasks(user_id);
        if let Some(tasks) = self.cache.get_list(key).await {
            return Ok(tasks);
        }
        let generation = self.cache.generation(key).await;
        let tasks = self.repo.find_by_user_id(user_id).await?;
        self.cache.put_list(key, generation, tasks.clone()).await;
        Ok(tasks)
    }

    pub async fn get_pending_tasks_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>> {
        let key = CacheKey::UserPendingTasks(user_id);
        if let Some(tasks) = self.cache.get_list(key).await {
            return Ok(tasks);
        }
        let generation = self.cache.generation(key).await;
        let tasks = self.repo.find_pending_by_user_id(user_id).await?;
        self.cache.put_list(key, generation, tasks.clone()).await;
        Ok(tasks)
    }

    /// Lookup by id. Soft-deleted tasks are returned with `deleted = true`.
    pub async fn get_task_by_id(&self, id: TaskId) -> Result<Task> {
        if let Some(task) = self.cache.get_task(id).await {
            return Ok(task);
        }
        let generation = self.cache.generation(CacheKey::Task(id)).await;
        let task = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("task {id}")))?;
        self.cache.put_task(generation, task.clone()).await;
        Ok(task)
    }

    /// Overdue tasks across all users. Always hits the store.
    pub async fn get_overdue_tasks(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        self.repo.find_overdue(now).await
    }

    pub async fn create_task(&self, new: NewTask) -> Result<Task> {
        if new.title.trim().is_empty() {
            return Err(Error::Validation("title must not be empty".to_string()));
        }

        let task = self.repo.save(new.into_task()).await?;
        self.cache.evict_user(task.user_id).await;
        record_write("create");
        info!(task_id = %task.id, user_id = %task.user_id, "task created");

        self.emit(TaskEvent::created(&task)).await;
        Ok(task)
    }

    /// Soft-delete a task. Deleting an already-deleted task is `NotFound`.
    pub async fn delete_task(&self, id: TaskId) -> Result<Task> {
        match self.repo.find_by_id(id).await? {
            Some(task) if !task.deleted => {}
            _ => return Err(Error::NotFound(format!("task {id}"))),
        }

        let task = self
            .repo
            .delete_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("task {id}")))?;
        self.evict_task(&task).await;
        record_write("delete");
        info!(task_id = %task.id, user_id = %task.user_id, "task deleted");

        self.emit(TaskEvent::deleted(&task)).await;
        Ok(task)
    }

    /// Mark a task completed. Only the `completed` flag is written, so a
    /// concurrent delete is never undone. No event is published.
    pub async fn mark_task_as_completed(&self, id: TaskId) -> Result<Task> {
        let task = self
            .repo
            .mark_completed(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("task {id}")))?;
        self.evict_task(&task).await;
        record_write("complete");
        info!(task_id = %task.id, "task completed");
        Ok(task)
    }

    async fn evict_task(&self, task: &Task) {
        self.cache.evict(CacheKey::Task(task.id)).await;
        self.cache.evict_user(task.user_id).await;
    }

    async fn emit(&self, event: TaskEvent) {
        let span = crate::telemetry::events::start_event_span("publish", &event);
        async {
            if let Err(e) = publish_recorded(self.publisher.as_ref(), &event).await {
                warn!(
                    publisher = self.publisher.name(),
                    "failed to publish task event: {e}"
                );
            }
        }
        .instrument(span)
        .await
    }
}

fn record_write(operation: &'static str) {
    metrics::task_writes().add(1, &[KeyValue::new("operation", operation)]);
}

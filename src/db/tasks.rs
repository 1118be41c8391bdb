//! `tasks` table.

use crate::error::Result;
use crate::model::{Task, TaskId, UserId};
use crate::repo::TaskRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

const TASK_COLUMNS: &str =
    "id, user_id, title, description, completed, deleted, created_at, target_date";

#[async_trait]
impl TaskRepository for super::Db {
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = $1 AND deleted = FALSE
             ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(tasks)
    }

    async fn find_pending_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = $1 AND completed = FALSE AND deleted = FALSE
             ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(tasks)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE completed = FALSE AND deleted = FALSE
             AND target_date IS NOT NULL AND target_date < $1
             ORDER BY created_at, id"
        ))
        .bind(now)
        .fetch_all(self.pool())
        .await?;
        Ok(tasks)
    }

    async fn save(&self, task: Task) -> Result<Task> {
        sqlx::query(
            "INSERT INTO tasks (id, user_id, title, description, completed, deleted, created_at, target_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE
             SET title = EXCLUDED.title, description = EXCLUDED.description,
                 completed = EXCLUDED.completed, deleted = EXCLUDED.deleted,
                 target_date = EXCLUDED.target_date",
        )
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.deleted)
        .bind(task.created_at)
        .bind(task.target_date)
        .execute(self.pool())
        .await?;
        Ok(task)
    }

    async fn delete_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET deleted = TRUE WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(task)
    }

    async fn mark_completed(&self, id: TaskId) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET completed = TRUE WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(task)
    }
}

//! Tasks: user-owned units of work with an optional due date.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

uuid_id!(
    /// Newtype for task IDs.
    TaskId
);

/// A task. Deletion is soft: deleted tasks stay in the store with
/// `deleted = true` and drop out of every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub target_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Not completed and not deleted, regardless of due date.
    pub fn is_pending(&self) -> bool {
        !self.completed && !self.deleted
    }

    /// Pending with a target date strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.target_date.is_some_and(|target| target < now)
    }
}

/// Parameters for creating a task.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(user_id: UserId, title: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            description: None,
            target_date: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn due(mut self, target_date: DateTime<Utc>) -> Self {
        self.target_date = Some(target_date);
        self
    }

    /// Build the stored task with a fresh id and creation timestamp.
    pub fn into_task(self) -> Task {
        Task {
            id: TaskId::new(),
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            completed: false,
            deleted: false,
            created_at: Utc::now(),
            target_date: self.target_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task_due(offset: Duration) -> Task {
        NewTask::new(UserId::new(), "write report")
            .due(Utc::now() + offset)
            .into_task()
    }

    #[test]
    fn new_task_is_pending() {
        let task = NewTask::new(UserId::new(), "t").into_task();
        assert!(task.is_pending());
        assert!(!task.completed);
        assert!(!task.deleted);
    }

    #[test]
    fn past_due_task_is_overdue() {
        let task = task_due(Duration::hours(-1));
        assert!(task.is_overdue(Utc::now()));
    }

    #[test]
    fn future_task_is_not_overdue() {
        let task = task_due(Duration::hours(1));
        assert!(!task.is_overdue(Utc::now()));
    }

    #[test]
    fn task_without_target_date_is_never_overdue() {
        let task = NewTask::new(UserId::new(), "t").into_task();
        assert!(!task.is_overdue(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn completed_or_deleted_tasks_are_not_overdue() {
        let mut completed = task_due(Duration::hours(-1));
        completed.completed = true;
        assert!(!completed.is_overdue(Utc::now()));

        let mut deleted = task_due(Duration::hours(-1));
        deleted.deleted = true;
        assert!(!deleted.is_overdue(Utc::now()));
        assert!(!deleted.is_pending());
    }

    #[test]
    fn target_date_equal_to_now_is_not_overdue() {
        let now = Utc::now();
        let mut task = NewTask::new(UserId::new(), "t").into_task();
        task.target_date = Some(now);
        assert!(!task.is_overdue(now));
    }
}

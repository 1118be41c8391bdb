//! Task service: caching, soft delete, and notifications from task events.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tasklab::cache::{CacheKey, TaskCache};
use tasklab::error::{Error, Result};
use tasklab::events::DirectPublisher;
use tasklab::model::{NewTask, Task, TaskId, UserId};
use tasklab::repo::{InMemoryNotificationRepository, InMemoryTaskRepository, TaskRepository};
use tasklab::service::{NotificationService, TaskService};
use tokio::sync::Notify;

struct Harness {
    repo: Arc<InMemoryTaskRepository>,
    tasks: TaskService,
    notifications: NotificationService,
}

fn harness(cache_enabled: bool) -> Harness {
    let repo = Arc::new(InMemoryTaskRepository::new());
    let notifications =
        NotificationService::new(Arc::new(InMemoryNotificationRepository::new()));
    let tasks = TaskService::new(
        repo.clone(),
        Arc::new(TaskCache::new(cache_enabled)),
        Arc::new(DirectPublisher::new(notifications.clone())),
    );
    Harness {
        repo,
        tasks,
        notifications,
    }
}

// ---------------------------------------------------------------------------
// Create / list / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_task_produces_created_notification() {
    let h = harness(true);
    let user = UserId::new();

    let task = h
        .tasks
        .create_task(NewTask::new(user, "buy milk").description("2 litres"))
        .await
        .unwrap();
    assert!(!task.completed);
    assert!(!task.deleted);

    let notes = h
        .notifications
        .get_all_notifications_by_user_id(user)
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].task_id, task.id);
    assert_eq!(notes[0].message, "Task 'buy milk' created");
    assert!(!notes[0].read);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let h = harness(true);
    let err = h
        .tasks
        .create_task(NewTask::new(UserId::new(), "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn delete_is_soft_and_notifies() {
    let h = harness(true);
    let user = UserId::new();
    let task = h.tasks.create_task(NewTask::new(user, "a")).await.unwrap();

    let deleted = h.tasks.delete_task(task.id).await.unwrap();
    assert!(deleted.deleted);

    assert!(h.tasks.get_all_tasks_by_user_id(user).await.unwrap().is_empty());
    assert!(h.tasks.get_task_by_id(task.id).await.unwrap().deleted);

    let notes = h
        .notifications
        .get_all_notifications_by_user_id(user)
        .await
        .unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().any(|n| n.message == "Task 'a' deleted"));
}

#[tokio::test]
async fn deleting_twice_or_unknown_is_not_found() {
    let h = harness(true);
    let task = h
        .tasks
        .create_task(NewTask::new(UserId::new(), "a"))
        .await
        .unwrap();
    h.tasks.delete_task(task.id).await.unwrap();

    assert!(matches!(
        h.tasks.delete_task(task.id).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        h.tasks.delete_task(tasklab::model::TaskId::new()).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn pending_excludes_completed() {
    let h = harness(true);
    let user = UserId::new();
    let a = h.tasks.create_task(NewTask::new(user, "a")).await.unwrap();
    h.tasks.create_task(NewTask::new(user, "b")).await.unwrap();

    h.tasks.mark_task_as_completed(a.id).await.unwrap();

    let pending = h.tasks.get_pending_tasks_by_user_id(user).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "b");
    assert_eq!(h.tasks.get_all_tasks_by_user_id(user).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_served_from_cache_until_a_write() {
    let h = harness(true);
    let user = UserId::new();
    h.tasks.create_task(NewTask::new(user, "a")).await.unwrap();

    assert_eq!(h.tasks.get_all_tasks_by_user_id(user).await.unwrap().len(), 1);

    // A write behind the service's back is invisible while the entry lives.
    h.repo
        .save(NewTask::new(user, "sneaky").into_task())
        .await
        .unwrap();
    assert_eq!(h.tasks.get_all_tasks_by_user_id(user).await.unwrap().len(), 1);

    // A write through the service evicts the user's entries.
    h.tasks.create_task(NewTask::new(user, "b")).await.unwrap();
    assert_eq!(h.tasks.get_all_tasks_by_user_id(user).await.unwrap().len(), 3);

    let stats = h.tasks.cache().stats().await;
    assert!(stats.hits >= 1);
}

#[tokio::test]
async fn delete_evicts_task_and_user_entries() {
    let h = harness(true);
    let user = UserId::new();
    let task = h.tasks.create_task(NewTask::new(user, "a")).await.unwrap();

    h.tasks.get_task_by_id(task.id).await.unwrap();
    h.tasks.get_pending_tasks_by_user_id(user).await.unwrap();
    h.tasks.delete_task(task.id).await.unwrap();

    let cache = h.tasks.cache();
    assert!(cache.get_task(task.id).await.is_none());
    assert!(cache.get_list(CacheKey::UserPendingTasks(user)).await.is_none());
    assert!(h.tasks.get_task_by_id(task.id).await.unwrap().deleted);
}

#[tokio::test]
async fn other_users_entries_survive_a_write() {
    let h = harness(true);
    let alice = UserId::new();
    let bob = UserId::new();
    h.tasks.create_task(NewTask::new(bob, "b")).await.unwrap();
    h.tasks.get_all_tasks_by_user_id(bob).await.unwrap();

    h.tasks.create_task(NewTask::new(alice, "a")).await.unwrap();
    assert!(
        h.tasks
            .cache()
            .get_list(CacheKey::UserTasks(bob))
            .await
            .is_some()
    );
}

#[tokio::test]
async fn disabled_cache_always_reads_the_store() {
    let h = harness(false);
    let user = UserId::new();
    h.tasks.create_task(NewTask::new(user, "a")).await.unwrap();
    h.tasks.get_all_tasks_by_user_id(user).await.unwrap();

    h.repo
        .save(NewTask::new(user, "direct").into_task())
        .await
        .unwrap();
    assert_eq!(h.tasks.get_all_tasks_by_user_id(user).await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Overdue query
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overdue_is_never_cached() {
    let h = harness(true);
    let user = UserId::new();
    let past = Utc::now() - Duration::minutes(5);

    assert!(h.tasks.get_overdue_tasks(Utc::now()).await.unwrap().is_empty());
    h.repo
        .save(NewTask::new(user, "late").due(past).into_task())
        .await
        .unwrap();
    assert_eq!(h.tasks.get_overdue_tasks(Utc::now()).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Interleaved writes
// ---------------------------------------------------------------------------

/// Parks the next caller at a fixed point until released.
#[derive(Default)]
struct Gate {
    armed: AtomicBool,
    reached: Notify,
    release: Notify,
}

impl Gate {
    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.release.notified().await;
        }
    }
}

/// In-memory store that can pause a list read after it returns, or a
/// completion before it writes.
#[derive(Default)]
struct GatedTaskRepository {
    inner: InMemoryTaskRepository,
    list: Gate,
    complete: Gate,
}

#[async_trait]
impl TaskRepository for GatedTaskRepository {
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>> {
        let tasks = self.inner.find_by_user_id(user_id).await;
        self.list.pass().await;
        tasks
    }

    async fn find_pending_by_user_id(&self, user_id: UserId) -> Result<Vec<Task>> {
        self.inner.find_pending_by_user_id(user_id).await
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        self.inner.find_overdue(now).await
    }

    async fn save(&self, task: Task) -> Result<Task> {
        self.inner.save(task).await
    }

    async fn delete_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        self.inner.delete_by_id(id).await
    }

    async fn mark_completed(&self, id: TaskId) -> Result<Option<Task>> {
        self.complete.pass().await;
        self.inner.mark_completed(id).await
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        self.inner.find_by_id(id).await
    }
}

fn gated_harness() -> (Arc<GatedTaskRepository>, TaskService) {
    let repo = Arc::new(GatedTaskRepository::default());
    let notifications =
        NotificationService::new(Arc::new(InMemoryNotificationRepository::new()));
    let tasks = TaskService::new(
        repo.clone(),
        Arc::new(TaskCache::default()),
        Arc::new(DirectPublisher::new(notifications)),
    );
    (repo, tasks)
}

#[tokio::test]
async fn complete_racing_delete_keeps_task_deleted() {
    let (repo, tasks) = gated_harness();
    let user = UserId::new();
    let id = tasks.create_task(NewTask::new(user, "a")).await.unwrap().id;

    repo.complete.arm();
    let completer = {
        let tasks = tasks.clone();
        tokio::spawn(async move { tasks.mark_task_as_completed(id).await })
    };
    repo.complete.reached.notified().await;
    tasks.delete_task(id).await.unwrap();
    repo.complete.release.notify_one();

    let completed = completer.await.unwrap().unwrap();
    assert!(completed.completed);
    assert!(completed.deleted);

    let stored = repo.inner.find_by_id(id).await.unwrap().unwrap();
    assert!(stored.deleted);
    assert!(tasks.get_all_tasks_by_user_id(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_read_overtaken_by_create_is_not_cached() {
    let (repo, tasks) = gated_harness();
    let user = UserId::new();

    repo.list.arm();
    let reader = {
        let tasks = tasks.clone();
        tokio::spawn(async move { tasks.get_all_tasks_by_user_id(user).await })
    };
    repo.list.reached.notified().await;
    tasks.create_task(NewTask::new(user, "a")).await.unwrap();
    repo.list.release.notify_one();

    // The paused read saw the store before the create.
    assert!(reader.await.unwrap().unwrap().is_empty());
    assert_eq!(tasks.get_all_tasks_by_user_id(user).await.unwrap().len(), 1);
}

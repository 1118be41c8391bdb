//! Read-through cache for task queries.
//!
//! Three kinds of entry: a user's task list, a user's pending task list, and
//! a single task by id. Nothing expires on its own; the task service evicts
//! the affected keys on every write.
//!
//! Each key carries a generation that every eviction bumps. A reader takes
//! the generation before querying the store and passes it back on `put_*`;
//! the fill is dropped if an eviction happened in between, so a result read
//! before a write can never land after that write's eviction.

use crate::model::{Task, TaskId, UserId};
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    UserTasks(UserId),
    UserPendingTasks(UserId),
    Task(TaskId),
}

impl CacheKey {
    fn label(&self) -> &'static str {
        match self {
            CacheKey::UserTasks(_) => "user",
            CacheKey::UserPendingTasks(_) => "user_pending",
            CacheKey::Task(_) => "task",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::UserTasks(id) => write!(f, "user_{id}"),
            CacheKey::UserPendingTasks(id) => write!(f, "user_pending_{id}"),
            CacheKey::Task(id) => write!(f, "task_{id}"),
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    List(Vec<Task>),
    Task(Task),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Generation of a key, taken before a store query. See [`TaskCache::generation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<CacheKey, Entry>,
    generations: HashMap<CacheKey, u64>,
}

impl Slots {
    fn generation(&self, key: &CacheKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct TaskCache {
    enabled: bool,
    slots: RwLock<Slots>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TaskCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            slots: RwLock::new(Slots::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn lookup(&self, key: CacheKey) -> Option<Entry> {
        let found = if self.enabled {
            self.slots.read().await.entries.get(&key).cloned()
        } else {
            None
        };
        let result = if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            "hit"
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            "miss"
        };
        metrics::cache_lookups().add(
            1,
            &[
                KeyValue::new("key", key.label()),
                KeyValue::new("result", result),
            ],
        );
        tracing::trace!(%key, result, "task cache lookup");
        found
    }

    /// Current generation of `key`. Take it before reading the store.
    pub async fn generation(&self, key: CacheKey) -> Generation {
        Generation(self.slots.read().await.generation(&key))
    }

    async fn store(&self, key: CacheKey, generation: Generation, entry: Entry) {
        if !self.enabled {
            return;
        }
        let mut slots = self.slots.write().await;
        if slots.generation(&key) == generation.0 {
            slots.entries.insert(key, entry);
        } else {
            tracing::debug!(%key, "stale task cache fill dropped");
        }
    }

    /// Cached task list for a `UserTasks` or `UserPendingTasks` key.
    pub async fn get_list(&self, key: CacheKey) -> Option<Vec<Task>> {
        match self.lookup(key).await? {
            Entry::List(tasks) => Some(tasks),
            Entry::Task(_) => None,
        }
    }

    pub async fn put_list(&self, key: CacheKey, generation: Generation, tasks: Vec<Task>) {
        self.store(key, generation, Entry::List(tasks)).await;
    }

    pub async fn get_task(&self, id: TaskId) -> Option<Task> {
        match self.lookup(CacheKey::Task(id)).await? {
            Entry::Task(task) => Some(task),
            Entry::List(_) => None,
        }
    }

    pub async fn put_task(&self, generation: Generation, task: Task) {
        self.store(CacheKey::Task(task.id), generation, Entry::Task(task))
            .await;
    }

    pub async fn evict(&self, key: CacheKey) {
        if !self.enabled {
            return;
        }
        let mut slots = self.slots.write().await;
        *slots.generations.entry(key).or_insert(0) += 1;
        if slots.entries.remove(&key).is_some() {
            tracing::debug!(%key, "task cache evicted");
        }
    }

    /// Evict both list entries for a user.
    pub async fn evict_user(&self, user_id: UserId) {
        self.evict(CacheKey::UserTasks(user_id)).await;
        self.evict(CacheKey::UserPendingTasks(user_id)).await;
    }

    /// Drop every entry. Fills already in flight are dropped too.
    pub async fn clear(&self) {
        let mut slots = self.slots.write().await;
        let Slots {
            entries,
            generations,
        } = &mut *slots;
        for key in entries.keys() {
            *generations.entry(*key).or_insert(0) += 1;
        }
        entries.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.slots.read().await.entries.len(),
        }
    }
}

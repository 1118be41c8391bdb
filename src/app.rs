//! Profile wiring: build repositories, cache, publisher and services from a
//! [`Config`], and start the background loops.

use crate::cache::TaskCache;
use crate::config::{Config, Profile};
use crate::consumer::{ConsumerConfig, NotificationConsumer};
use crate::db::Db;
use crate::error::{Error, Result};
use crate::events::{ChannelPublisher, DirectPublisher, EventPublisher, PgmqPublisher};
use crate::model::TaskEvent;
use crate::repo::{
    InMemoryNotificationRepository, InMemoryTaskRepository, InMemoryUserRepository,
    NotificationRepository, TaskRepository, UserRepository,
};
use crate::scheduler::OverdueScheduler;
use crate::service::{NotificationService, TaskService, UserService};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Where the notification consumer reads events from, if anywhere.
enum EventSource {
    Channel(mpsc::UnboundedReceiver<TaskEvent>),
    Pgmq { db: Db, queue: String },
}

/// Fully wired application.
pub struct App {
    pub profile: Profile,
    pub users: UserService,
    pub tasks: TaskService,
    pub notifications: NotificationService,
    pub scheduler: OverdueScheduler,
    pub consumer: NotificationConsumer,
    db: Option<Db>,
    broker: bool,
    event_source: Option<EventSource>,
}

struct Stores {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            notifications: Arc::new(InMemoryNotificationRepository::new()),
        }
    }

    fn postgres(db: &Db) -> Self {
        Self {
            users: Arc::new(db.clone()),
            tasks: Arc::new(db.clone()),
            notifications: Arc::new(db.clone()),
        }
    }
}

impl App {
    /// Build the application for the configured profile. For the `database`
    /// profile this connects, runs migrations, and creates the event queue
    /// when the broker is enabled.
    pub async fn build(config: &Config) -> Result<Self> {
        info!(
            profile = %config.profile,
            broker = config.broker_enabled,
            cache = config.cache_enabled,
            "building application"
        );

        let db = match config.profile {
            Profile::Dev => None,
            Profile::Database => {
                let url = config.database_url.as_ref().ok_or_else(|| {
                    Error::Config("DATABASE_URL is required for the database profile".to_string())
                })?;
                let db = Db::connect(url.expose_secret()).await?;
                db.migrate().await?;
                Some(db)
            }
        };

        let stores = match &db {
            Some(db) => Stores::postgres(db),
            None => Stores::in_memory(),
        };
        let notifications = NotificationService::new(stores.notifications.clone());

        let mut event_source = None;
        let publisher: Arc<dyn EventPublisher> = match (&db, config.broker_enabled) {
            (_, false) => Arc::new(DirectPublisher::new(notifications.clone())),
            (None, true) => {
                let (publisher, rx) = ChannelPublisher::new();
                event_source = Some(EventSource::Channel(rx));
                Arc::new(publisher)
            }
            (Some(db), true) => {
                db.ensure_pgmq_extension().await?;
                db.create_queue(&config.events_queue).await?;
                event_source = Some(EventSource::Pgmq {
                    db: db.clone(),
                    queue: config.events_queue.clone(),
                });
                Arc::new(PgmqPublisher::new(db.clone(), &config.events_queue))
            }
        };

        Ok(Self::assemble(
            config.profile,
            stores,
            TaskCache::new(config.cache_enabled),
            publisher,
            notifications,
            config.overdue_interval,
            db,
            event_source,
        ))
    }

    /// `dev` profile with inline notifications and the cache on.
    pub fn in_memory() -> Self {
        let stores = Stores::in_memory();
        let notifications = NotificationService::new(stores.notifications.clone());
        let publisher = Arc::new(DirectPublisher::new(notifications.clone()));
        Self::assemble(
            Profile::Dev,
            stores,
            TaskCache::default(),
            publisher,
            notifications,
            Config::default().overdue_interval,
            None,
            None,
        )
    }

    /// `dev` profile with the in-process broker. Events only become
    /// notifications once [`App::spawn_consumer`] is running.
    pub fn in_memory_with_broker() -> Self {
        let stores = Stores::in_memory();
        let notifications = NotificationService::new(stores.notifications.clone());
        let (publisher, rx) = ChannelPublisher::new();
        Self::assemble(
            Profile::Dev,
            stores,
            TaskCache::default(),
            Arc::new(publisher),
            notifications,
            Config::default().overdue_interval,
            None,
            Some(EventSource::Channel(rx)),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        profile: Profile,
        stores: Stores,
        cache: TaskCache,
        publisher: Arc<dyn EventPublisher>,
        notifications: NotificationService,
        overdue_interval: Duration,
        db: Option<Db>,
        event_source: Option<EventSource>,
    ) -> Self {
        let tasks = TaskService::new(stores.tasks, Arc::new(cache), publisher);
        Self {
            profile,
            users: UserService::new(stores.users),
            scheduler: OverdueScheduler::new(tasks.clone(), overdue_interval),
            consumer: NotificationConsumer::new(notifications.clone()),
            tasks,
            notifications,
            db,
            broker: event_source.is_some(),
            event_source,
        }
    }

    pub fn db(&self) -> Option<&Db> {
        self.db.as_ref()
    }

    /// Whether events go through a broker that needs a consumer. Stays true
    /// after the consumer is spawned.
    pub fn has_broker(&self) -> bool {
        self.broker
    }

    /// Start the notification consumer for the broker, if there is one.
    /// Only the first call starts anything.
    pub fn spawn_consumer(&mut self) -> Option<JoinHandle<()>> {
        let consumer = self.consumer.clone();
        match self.event_source.take()? {
            EventSource::Channel(rx) => Some(tokio::spawn(async move {
                consumer.run_channel(rx).await;
            })),
            EventSource::Pgmq { db, queue } => Some(tokio::spawn(async move {
                if let Err(e) = consumer
                    .run_pgmq(&db, &queue, ConsumerConfig::default())
                    .await
                {
                    tracing::error!("notification consumer stopped: {e}");
                }
            })),
        }
    }

    /// Start the fixed-rate overdue scheduler.
    pub fn spawn_scheduler(&self) -> JoinHandle<()> {
        let scheduler = self.scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    }

    /// Signal the background loops to stop.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        self.consumer.shutdown();
    }
}

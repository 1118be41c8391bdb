//! Notification consumer: turns queued task events into notifications.
//!
//! Two sources, matching the two broker publishers: an in-process mpsc
//! channel (`dev` profile) and a pgmq queue (`database` profile). Failures
//! are logged and never stop the loop.

use crate::db::Db;
use crate::error::Result;
use crate::model::{Notification, TaskEvent};
use crate::service::NotificationService;
use crate::telemetry::events::start_event_span;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tracing::{Instrument, debug, error, info, warn};

/// Polling settings for the pgmq consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Visibility timeout (seconds) for pgmq reads. An unacknowledged
    /// message reappears after this long.
    pub visibility_timeout: i32,
    /// Sleep between polls when the queue is empty.
    pub poll_interval: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            visibility_timeout: 30,
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Clone)]
pub struct NotificationConsumer {
    notifications: NotificationService,
    shutdown: Arc<Notify>,
}

impl NotificationConsumer {
    pub fn new(notifications: NotificationService) -> Self {
        Self {
            notifications,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Signal a running loop to stop.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Create the notification for one event.
    pub async fn handle(&self, event: TaskEvent) -> Result<Notification> {
        let span = start_event_span("consume", &event);
        async {
            info!("received task event");
            self.notifications.create_from_event(&event).await
        }
        .instrument(span)
        .await
    }

    /// Drain the in-process channel until every sender is dropped or
    /// shutdown is signaled. Events already buffered at shutdown are still
    /// handled.
    pub async fn run_channel(&self, mut rx: mpsc::UnboundedReceiver<TaskEvent>) {
        info!("notification consumer started on in-process channel");
        loop {
            let event = tokio::select! {
                _ = self.shutdown.notified() => {
                    let mut drained = 0;
                    while let Ok(event) = rx.try_recv() {
                        self.handle_logged(event).await;
                        drained += 1;
                    }
                    info!(drained, "notification consumer shutting down");
                    return;
                }
                event = rx.recv() => event,
            };
            let Some(event) = event else {
                info!("event channel closed, notification consumer exiting");
                return;
            };
            self.handle_logged(event).await;
        }
    }

    async fn handle_logged(&self, event: TaskEvent) {
        let task_id = event.task_id;
        if let Err(e) = self.handle(event).await {
            error!(%task_id, "failed to process task event: {e}");
        }
    }

    /// Poll a pgmq queue until shutdown.
    pub async fn run_pgmq(&self, db: &Db, queue: &str, config: ConsumerConfig) -> Result<()> {
        info!(queue, "notification consumer started on pgmq");
        loop {
            let drained = match self.poll_once(db, queue, config.visibility_timeout).await {
                Ok(handled) => !handled,
                Err(e) => {
                    error!(queue, "consumer poll error: {e}");
                    true
                }
            };

            // Keep reading while messages are waiting; sleep once the queue is empty.
            if drained {
                tokio::select! {
                    _ = self.shutdown.notified() => {
                        info!("notification consumer shutting down");
                        return Ok(());
                    }
                    _ = tokio::time::sleep(config.poll_interval) => {}
                }
            }
        }
    }

    /// Read and process at most one message. Returns whether one was read.
    pub async fn poll_once(&self, db: &Db, queue: &str, vt_seconds: i32) -> Result<bool> {
        let Some(msg) = db.read_from_queue(queue, vt_seconds).await? else {
            return Ok(false);
        };

        let event: TaskEvent = match serde_json::from_value(msg.message.clone()) {
            Ok(event) => event,
            Err(e) => {
                // Retrying cannot fix a payload that does not decode.
                warn!(msg_id = msg.msg_id, "undecodable task event, archiving: {e}");
                db.archive_message(queue, msg.msg_id).await?;
                return Ok(true);
            }
        };

        let task_id = event.task_id;
        match self.handle(event).await {
            Ok(_) => {
                db.archive_message(queue, msg.msg_id).await?;
                let lag_ms = (chrono::Utc::now() - msg.enqueued_at).num_milliseconds();
                debug!(msg_id = msg.msg_id, %task_id, lag_ms, "task event handled");
            }
            Err(e) => {
                // Leave the message; it reappears after the visibility timeout.
                error!(
                    msg_id = msg.msg_id,
                    read_ct = msg.read_ct,
                    %task_id,
                    "failed to process task event: {e}"
                );
            }
        }
        Ok(true)
    }
}

//! Task event publishing.
//!
//! The task service and scheduler hand every lifecycle event to an
//! [`EventPublisher`]. Which one depends on the profile: without a broker the
//! notification is written inline; with one, the event goes onto a queue and
//! the [`crate::consumer`] turns it into a notification later.

use crate::db::Db;
use crate::error::{Error, Result};
use crate::model::TaskEvent;
use crate::service::NotificationService;
use crate::telemetry::metrics;
use async_trait::async_trait;
use opentelemetry::KeyValue;
use tokio::sync::mpsc;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &TaskEvent) -> Result<()>;

    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;
}

/// Publish through `publisher`, recording the outcome.
pub(crate) async fn publish_recorded(publisher: &dyn EventPublisher, event: &TaskEvent) -> Result<()> {
    let result = publisher.publish(event).await;
    metrics::events_published().add(
        1,
        &[
            KeyValue::new("event_type", event.event_type.to_string()),
            KeyValue::new("publisher", publisher.name()),
            KeyValue::new("result", if result.is_ok() { "ok" } else { "error" }),
        ],
    );
    result
}

/// No broker: create the notification right away.
pub struct DirectPublisher {
    notifications: NotificationService,
}

impl DirectPublisher {
    pub fn new(notifications: NotificationService) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl EventPublisher for DirectPublisher {
    async fn publish(&self, event: &TaskEvent) -> Result<()> {
        self.notifications.create_from_event(event).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// In-process broker: an unbounded mpsc channel drained by
/// [`crate::consumer::NotificationConsumer::run_channel`].
#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<TaskEvent>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventPublisher for ChannelPublisher {
    async fn publish(&self, event: &TaskEvent) -> Result<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| Error::Broker("event channel closed".to_string()))
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

/// Postgres broker: JSON events on a pgmq queue.
pub struct PgmqPublisher {
    db: Db,
    queue: String,
}

impl PgmqPublisher {
    pub fn new(db: Db, queue: impl Into<String>) -> Self {
        Self {
            db,
            queue: queue.into(),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}

#[async_trait]
impl EventPublisher for PgmqPublisher {
    async fn publish(&self, event: &TaskEvent) -> Result<()> {
        let payload = serde_json::to_value(event)?;
        let msg_id = self
            .db
            .send_to_queue(&self.queue, &payload, 0)
            .await
            .map_err(|e| Error::Broker(format!("send to {}: {e}", self.queue)))?;
        tracing::debug!(msg_id, queue = %self.queue, "task event enqueued");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pgmq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, TaskEventType, UserId};

    #[tokio::test]
    async fn channel_publisher_delivers_events_in_order() {
        let (publisher, mut rx) = ChannelPublisher::new();
        let task = NewTask::new(UserId::new(), "t").into_task();

        publisher.publish(&TaskEvent::created(&task)).await.unwrap();
        publisher.publish(&TaskEvent::deleted(&task)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().event_type, TaskEventType::Created);
        assert_eq!(rx.recv().await.unwrap().event_type, TaskEventType::Deleted);
    }

    #[tokio::test]
    async fn channel_publisher_errors_once_receiver_is_gone() {
        let (publisher, rx) = ChannelPublisher::new();
        drop(rx);
        let task = NewTask::new(UserId::new(), "t").into_task();
        let err = publisher.publish(&TaskEvent::created(&task)).await.unwrap_err();
        assert!(matches!(err, Error::Broker(_)));
    }
}

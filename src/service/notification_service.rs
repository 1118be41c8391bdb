use crate::error::{Error, Result};
use crate::model::{Notification, NotificationId, TaskEvent, UserId};
use crate::repo::NotificationRepository;
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use std::sync::Arc;

#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all_notifications_by_user_id(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>> {
        self.repo.find_by_user_id(user_id).await
    }

    /// Unread notifications only.
    pub async fn get_pending_notifications_by_user_id(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>> {
        self.repo.find_pending_by_user_id(user_id).await
    }

    pub async fn mark_notification_as_read(&self, id: NotificationId) -> Result<()> {
        if self.repo.mark_as_read(id).await? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("notification {id}")))
        }
    }

    pub async fn create_notification(&self, notification: Notification) -> Result<Notification> {
        self.repo.save(notification).await
    }

    /// Materialize exactly one notification for a task event.
    pub async fn create_from_event(&self, event: &TaskEvent) -> Result<Notification> {
        let notification = self.create_notification(Notification::from(event)).await?;
        metrics::notifications_created().add(
            1,
            &[KeyValue::new("event_type", event.event_type.to_string())],
        );
        tracing::debug!(
            notification_id = %notification.id,
            task_id = %event.task_id,
            event_type = %event.event_type,
            "notification created"
        );
        Ok(notification)
    }
}

//! `notifications` table.

use crate::error::Result;
use crate::model::{Notification, NotificationId, UserId};
use crate::repo::NotificationRepository;
use async_trait::async_trait;

const NOTIFICATION_COLUMNS: &str = "id, user_id, task_id, message, created_at, read";

#[async_trait]
impl NotificationRepository for super::Db {
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn find_pending_by_user_id(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = $1 AND read = FALSE ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn mark_as_read(&self, id: NotificationId) -> Result<bool> {
        let rows_affected = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }

    async fn save(&self, notification: Notification) -> Result<Notification> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, task_id, message, created_at, read)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET message = EXCLUDED.message, read = EXCLUDED.read",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.task_id)
        .bind(&notification.message)
        .bind(notification.created_at)
        .bind(notification.read)
        .execute(self.pool())
        .await?;
        Ok(notification)
    }
}

use super::ApiState;
use super::error::ApiResult;
use crate::model::{Notification, NotificationId, UserId};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn list_for_user(
    State(state): State<ApiState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(
        state
            .notifications
            .get_all_notifications_by_user_id(user_id)
            .await?,
    ))
}

pub async fn list_pending_for_user(
    State(state): State<ApiState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(
        state
            .notifications
            .get_pending_notifications_by_user_id(user_id)
            .await?,
    ))
}

pub async fn mark_read(
    State(state): State<ApiState>,
    Path(id): Path<NotificationId>,
) -> ApiResult<StatusCode> {
    state.notifications.mark_notification_as_read(id).await?;
    Ok(StatusCode::OK)
}

use super::ApiState;
use super::error::ApiResult;
use crate::model::{NewTask, Task, TaskId, UserId};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub async fn create(
    State(state): State<ApiState>,
    Json(new): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create_task(new).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_by_id(
    State(state): State<ApiState>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.get_task_by_id(id).await?))
}

pub async fn list_for_user(
    State(state): State<ApiState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.get_all_tasks_by_user_id(user_id).await?))
}

pub async fn list_pending_for_user(
    State(state): State<ApiState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.get_pending_tasks_by_user_id(user_id).await?))
}

pub async fn delete(
    State(state): State<ApiState>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.delete_task(id).await?))
}

pub async fn complete(
    State(state): State<ApiState>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.mark_task_as_completed(id).await?))
}

use super::ApiState;
use super::error::ApiResult;
use crate::model::{Task, TaskId};
use crate::scheduler::SweepReport;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub struct CheckParams {
    /// Run the sweep inline and return its report instead of 202.
    #[serde(default)]
    wait: bool,
}

pub async fn check_overdue(
    State(state): State<ApiState>,
    Query(params): Query<CheckParams>,
) -> ApiResult<Response> {
    if params.wait {
        let report: SweepReport = state.scheduler.check_overdue_tasks().await?;
        return Ok(Json(report).into_response());
    }

    let scheduler = state.scheduler.clone();
    tokio::spawn(async move {
        if let Err(e) = scheduler.check_overdue_tasks().await {
            tracing::error!("manual overdue sweep failed: {e}");
        }
    });
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({"status": "overdue tasks check initiated"})),
    )
        .into_response())
}

pub async fn overdue(State(state): State<ApiState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.get_overdue_tasks(Utc::now()).await?))
}

pub async fn complete_many(
    State(state): State<ApiState>,
    Json(ids): Json<Vec<TaskId>>,
) -> Json<Vec<Task>> {
    Json(state.scheduler.mark_tasks_completed_async(ids).await)
}

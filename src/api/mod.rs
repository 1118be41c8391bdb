//! HTTP API.
//!
//! A thin axum layer over the services; handlers parse, call one service
//! method, and serialize. Errors map to status codes in [`error`].

mod error;
mod notifications;
mod scheduler;
mod tasks;
mod users;

use crate::app::App;
use crate::db::Db;
use crate::scheduler::OverdueScheduler;
use crate::service::{NotificationService, TaskService, UserService};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

/// Shared handler state. Every field is a cheap clone.
#[derive(Clone)]
pub struct ApiState {
    pub users: UserService,
    pub tasks: TaskService,
    pub notifications: NotificationService,
    pub scheduler: OverdueScheduler,
    pub db: Option<Db>,
}

impl From<&App> for ApiState {
    fn from(app: &App) -> Self {
        Self {
            users: app.users.clone(),
            tasks: app.tasks.clone(),
            notifications: app.notifications.clone(),
            scheduler: app.scheduler.clone(),
            db: app.db().cloned(),
        }
    }
}

/// Build the router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        // Users
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", get(users::login))
        // Tasks. `:id` is a user id on the list routes and a task id elsewhere.
        .route("/api/tasks", post(tasks::create))
        .route("/api/tasks/id/:id", get(tasks::get_by_id))
        .route("/api/tasks/:id", get(tasks::list_for_user).delete(tasks::delete))
        .route("/api/tasks/:id/pending", get(tasks::list_pending_for_user))
        .route("/api/tasks/:id/complete", post(tasks::complete))
        // Notifications. Same `:id` convention.
        .route("/api/notifications/:id", get(notifications::list_for_user))
        .route(
            "/api/notifications/:id/pending",
            get(notifications::list_pending_for_user),
        )
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        // Scheduler
        .route("/api/scheduler/check-overdue", post(scheduler::check_overdue))
        .route(
            "/api/scheduler/process-overdue-async",
            post(scheduler::check_overdue),
        )
        .route("/api/scheduler/overdue", get(scheduler::overdue))
        .route("/api/scheduler/complete", post(scheduler::complete_many))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<ApiState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.db {
        Some(ref db) => match db.health_check().await {
            Ok(()) => (StatusCode::OK, Json(json!({"status": "ok", "storage": "database"}))),
            Err(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable", "error": e.to_string()})),
            ),
        },
        None => (StatusCode::OK, Json(json!({"status": "ok", "storage": "memory"}))),
    }
}

/// Serve the API until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    state: ApiState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> crate::error::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

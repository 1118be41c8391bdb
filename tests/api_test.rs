//! HTTP API against the in-memory profile.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tasklab::api::{ApiState, router};
use tasklab::app::App;
use tower::ServiceExt;

fn test_router() -> Router {
    router(ApiState::from(&App::in_memory()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn register_and_login() {
    let app = test_router();

    let (status, user) = send(
        &app,
        Method::POST,
        "/api/users/register",
        Some(json!({"username": "alice", "password": "pw", "email": "a@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "alice");
    assert!(user.get("password").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/register",
        Some(json!({"username": "alice", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, logged_in) = send(
        &app,
        Method::GET,
        "/api/users/login?username=alice&password=pw",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["id"], user["id"]);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/users/login?username=alice&password=wrong",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn task_lifecycle() {
    let app = test_router();
    let user_id = uuid::Uuid::new_v4().to_string();

    let (status, task) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({"user_id": user_id, "title": "write tests", "description": "all of them"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["completed"], false);

    let (status, tasks) = send(&app, Method::GET, &format!("/api/tasks/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let (status, fetched) =
        send(&app, Method::GET, &format!("/api/tasks/id/{task_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "write tests");

    let (status, completed) = send(
        &app,
        Method::POST,
        &format!("/api/tasks/{task_id}/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["completed"], true);

    let (_, pending) = send(
        &app,
        Method::GET,
        &format!("/api/tasks/{user_id}/pending"),
        None,
    )
    .await;
    assert!(pending.as_array().unwrap().is_empty());

    let (status, deleted) =
        send(&app, Method::DELETE, &format!("/api/tasks/{task_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/tasks/{task_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_task_is_404_and_bad_id_is_400() {
    let app = test_router();
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/tasks/id/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let (status, _) = send(&app, Method::GET, "/api/tasks/id/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notifications_and_mark_read() {
    let app = test_router();
    let user_id = uuid::Uuid::new_v4().to_string();

    send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({"user_id": user_id, "title": "t"})),
    )
    .await;

    let (status, pending) = send(
        &app,
        Method::GET,
        &format!("/api/notifications/{user_id}/pending"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    let notification_id = pending[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/notifications/{notification_id}/read"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, pending) = send(
        &app,
        Method::GET,
        &format!("/api/notifications/{user_id}/pending"),
        None,
    )
    .await;
    assert!(pending.as_array().unwrap().is_empty());

    let (_, all) = send(
        &app,
        Method::GET,
        &format!("/api/notifications/{user_id}"),
        None,
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["read"], true);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/notifications/{}/read", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scheduler_endpoints() {
    let app = test_router();
    let user_id = uuid::Uuid::new_v4().to_string();
    let past = (chrono::Utc::now() - chrono::Duration::hours(3)).to_rfc3339();

    let (_, late) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({"user_id": user_id, "title": "late", "target_date": past})),
    )
    .await;

    let (status, overdue) = send(&app, Method::GET, "/api/scheduler/overdue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overdue.as_array().unwrap().len(), 1);

    let (status, report) = send(
        &app,
        Method::POST,
        "/api/scheduler/check-overdue?wait=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["found"], 1);
    assert_eq!(report["published"], 1);

    let (status, _) = send(&app, Method::POST, "/api/scheduler/check-overdue", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, report) = send(
        &app,
        Method::POST,
        "/api/scheduler/process-overdue-async?wait=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["found"], 1);

    let (status, completed) = send(
        &app,
        Method::POST,
        "/api/scheduler/complete",
        Some(json!([late["id"], uuid::Uuid::new_v4().to_string()])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed.as_array().unwrap().len(), 1);

    let (_, overdue) = send(&app, Method::GET, "/api/scheduler/overdue", None).await;
    assert!(overdue.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_memory_storage() {
    let app = test_router();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
}

//! Telemetry initialization and span helpers.

use tasklab::model::{NewTask, TaskEvent, UserId};
use tasklab::telemetry::events::{record_sweep_found, start_event_span, start_sweep_span};

#[test]
fn telemetry_initializes_without_endpoint() {
    // A global subscriber can only be set once per process; a second init
    // returning Err is acceptable.
    let config = tasklab::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "tasklab-test".to_string(),
        default_filter: "debug".to_string(),
    };
    let _guard = tasklab::telemetry::init_telemetry(config);
}

#[test]
fn invalid_filter_is_a_config_error() {
    unsafe { std::env::remove_var("RUST_LOG") };
    let config = tasklab::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "tasklab-test".to_string(),
        default_filter: "tasklab=notalevel".to_string(),
    };
    assert!(matches!(
        tasklab::telemetry::init_telemetry(config),
        Err(tasklab::error::Error::Config(_))
    ));
}

#[test]
fn sweep_span_records_found_count() {
    let span = start_sweep_span();
    record_sweep_found(&span, 3);
}

#[test]
fn event_span_carries_task_ids() {
    let task = NewTask::new(UserId::new(), "t").into_task();
    let event = TaskEvent::overdue(&task);
    let span = start_event_span("publish", &event);
    span.in_scope(|| tracing::info!("inside event span"));
}

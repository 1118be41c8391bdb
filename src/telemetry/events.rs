//! Span helpers for the scheduler sweep and task event handling.

use crate::model::TaskEvent;
use tracing::Span;

/// Start a span for one overdue sweep.
///
/// `sweep.found` is declared empty and filled in via [`record_sweep_found`]
/// once the overdue query returns.
pub fn start_sweep_span() -> Span {
    tracing::info_span!("scheduler.sweep", "sweep.found" = tracing::field::Empty)
}

pub fn record_sweep_found(span: &Span, found: usize) {
    span.record("sweep.found", found);
}

/// Start a span for handling (publishing or consuming) a task event.
pub fn start_event_span(stage: &'static str, event: &TaskEvent) -> Span {
    tracing::info_span!(
        "task_event",
        "event.stage" = stage,
        "event.type" = %event.event_type,
        "task.id" = %event.task_id,
        "user.id" = %event.user_id,
    )
}

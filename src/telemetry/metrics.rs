//! Metric instrument factories for tasklab.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"tasklab"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for tasklab instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("tasklab")
}

/// Counter: task writes.
/// Labels: `operation` ("create" | "delete" | "complete").
pub fn task_writes() -> Counter<u64> {
    meter()
        .u64_counter("tasklab.task.writes")
        .with_description("Number of task writes")
        .build()
}

/// Counter: task events handed to a publisher.
/// Labels: `event_type`, `publisher`, `result` ("ok" | "error").
pub fn events_published() -> Counter<u64> {
    meter()
        .u64_counter("tasklab.events.published")
        .with_description("Number of task events published")
        .build()
}

/// Counter: notifications materialized from events.
/// Labels: `event_type`.
pub fn notifications_created() -> Counter<u64> {
    meter()
        .u64_counter("tasklab.notifications.created")
        .with_description("Number of notifications created")
        .build()
}

/// Counter: queue-level operations (create, send, read, archive, delete).
/// Labels: `queue`, `operation`.
pub fn queue_operations() -> Counter<u64> {
    meter()
        .u64_counter("tasklab.queue.operations")
        .with_description("Number of queue operations")
        .build()
}

/// Counter: task cache lookups.
/// Labels: `key` ("user" | "user_pending" | "task"), `result` ("hit" | "miss").
pub fn cache_lookups() -> Counter<u64> {
    meter()
        .u64_counter("tasklab.cache.lookups")
        .with_description("Number of task cache lookups")
        .build()
}

/// Counter: overdue tasks found by scheduler sweeps.
pub fn overdue_detected() -> Counter<u64> {
    meter()
        .u64_counter("tasklab.scheduler.overdue_detected")
        .with_description("Overdue tasks found by scheduler sweeps")
        .build()
}

/// Histogram: sweep duration in milliseconds.
pub fn sweep_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("tasklab.scheduler.sweep_duration_ms")
        .with_description("Overdue sweep duration in milliseconds")
        .with_unit("ms")
        .build()
}

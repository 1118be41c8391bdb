//! Overdue-task scheduler.
//!
//! A fixed-rate timer. Each tick runs one sweep: query the overdue tasks and
//! publish an `Overdue` event for each, all sends running concurrently. A
//! task that stays overdue is reported again on every sweep.

use crate::error::Result;
use crate::events::publish_recorded;
use crate::model::{Task, TaskEvent, TaskId};
use crate::service::TaskService;
use crate::telemetry::events::{record_sweep_found, start_event_span, start_sweep_span};
use crate::telemetry::metrics;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, warn};

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub found: usize,
    pub published: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct OverdueScheduler {
    tasks: TaskService,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl OverdueScheduler {
    pub fn new(tasks: TaskService, interval: Duration) -> Self {
        Self {
            tasks,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Signal the scheduler loop to stop.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Run sweeps at a fixed rate until shutdown. The first sweep runs
    /// immediately.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "overdue scheduler started");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("overdue scheduler shutting down");
                    return;
                }
                _ = ticker.tick() => {}
            }

            info!("starting scheduled check for overdue tasks");
            if let Err(e) = self.check_overdue_tasks().await {
                error!("overdue sweep failed: {e}");
            }
        }
    }

    /// One sweep. Only the overdue query itself can fail the sweep; per-task
    /// publish failures are logged and counted.
    pub async fn check_overdue_tasks(&self) -> Result<SweepReport> {
        let span = start_sweep_span();
        let sweep_span = span.clone();
        let started = Instant::now();

        let report = async {
            let overdue = self.tasks.get_overdue_tasks(Utc::now()).await?;
            record_sweep_found(&sweep_span, overdue.len());
            info!(count = overdue.len(), "found overdue tasks");
            metrics::overdue_detected().add(overdue.len() as u64, &[]);

            let mut sends = JoinSet::new();
            for task in overdue.iter() {
                let publisher = Arc::clone(self.tasks.publisher());
                let event = TaskEvent::overdue(task);
                let span = start_event_span("publish", &event);
                sends.spawn(
                    async move {
                        let result = publish_recorded(publisher.as_ref(), &event).await;
                        (event.task_id, result)
                    }
                    .instrument(span),
                );
            }

            let mut report = SweepReport {
                found: overdue.len(),
                ..SweepReport::default()
            };
            while let Some(joined) = sends.join_next().await {
                match joined {
                    Ok((task_id, Ok(()))) => {
                        report.published += 1;
                        info!(%task_id, "sent overdue notification");
                    }
                    Ok((task_id, Err(e))) => {
                        report.failed += 1;
                        warn!(%task_id, "failed to send overdue notification: {e}");
                    }
                    Err(e) => {
                        report.failed += 1;
                        error!("overdue send task panicked: {e}");
                    }
                }
            }
            Ok::<_, crate::error::Error>(report)
        }
        .instrument(span)
        .await?;

        metrics::sweep_duration_ms().record(started.elapsed().as_secs_f64() * 1000.0, &[]);
        Ok(report)
    }

    /// Mark many tasks completed concurrently. Unknown ids and failures are
    /// logged and skipped; the completed tasks are returned.
    pub async fn mark_tasks_completed_async(&self, ids: Vec<TaskId>) -> Vec<Task> {
        let mut jobs = JoinSet::new();
        for id in ids {
            let tasks = self.tasks.clone();
            jobs.spawn(async move { (id, tasks.mark_task_as_completed(id).await) });
        }

        let mut completed = Vec::new();
        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok((_, Ok(task))) => completed.push(task),
                Ok((id, Err(e))) => warn!(task_id = %id, "failed to complete task: {e}"),
                Err(e) => error!("complete task job panicked: {e}"),
            }
        }
        completed
    }
}

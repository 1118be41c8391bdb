//! # tasklab
//!
//! Task management backend: users, tasks and notifications over pluggable
//! storage (in-memory maps or Postgres), a per-key task cache, task events
//! delivered inline or through a broker (in-process channel or pgmq), and a
//! fixed-rate scheduler that flags overdue tasks.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod consumer;
pub mod db;
pub mod error;
pub mod events;
pub mod model;
pub mod repo;
pub mod scheduler;
pub mod service;
pub mod telemetry;

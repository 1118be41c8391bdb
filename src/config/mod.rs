//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if a required var is missing or a
//! value does not parse. The database URL is wrapped in `SecretString` so it
//! never shows up in logs.

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Storage profile: which repository adapter backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Map-backed stores, lost on restart.
    Dev,
    /// Postgres via sqlx.
    Database,
}

impl FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "memory" | "in-memory" => Ok(Profile::Dev),
            "database" | "postgres" | "db" => Ok(Profile::Database),
            other => Err(Error::Config(format!("unknown profile: {other}"))),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Dev => write!(f, "dev"),
            Profile::Database => write!(f, "database"),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub profile: Profile,
    /// Required when `profile` is `Database`.
    pub database_url: Option<SecretString>,
    /// Route task events through the broker instead of writing
    /// notifications inline.
    pub broker_enabled: bool,
    pub events_queue: String,
    pub cache_enabled: bool,
    pub overdue_interval: Duration,
    pub http_addr: SocketAddr,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::Dev,
            database_url: None,
            broker_enabled: false,
            events_queue: "task_events".to_string(),
            cache_enabled: true,
            overdue_interval: Duration::from_secs(300),
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            otel_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let profile = match std::env::var("TASKLAB_PROFILE") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.profile,
        };

        let database_url = std::env::var("DATABASE_URL").ok().map(SecretString::from);
        if profile == Profile::Database && database_url.is_none() {
            return Err(Error::Config(
                "required environment variable DATABASE_URL is not set".to_string(),
            ));
        }

        let overdue_interval = match std::env::var("OVERDUE_CHECK_INTERVAL_SECS") {
            Ok(v) => {
                let secs: u64 = parse_var("OVERDUE_CHECK_INTERVAL_SECS", &v)?;
                if secs == 0 {
                    return Err(Error::Config(
                        "OVERDUE_CHECK_INTERVAL_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            Err(_) => defaults.overdue_interval,
        };

        Ok(Self {
            profile,
            database_url,
            broker_enabled: bool_var("TASK_EVENTS_BROKER", defaults.broker_enabled)?,
            events_queue: std::env::var("TASK_EVENTS_QUEUE").unwrap_or(defaults.events_queue),
            cache_enabled: bool_var("TASK_CACHE_ENABLED", defaults.cache_enabled)?,
            overdue_interval,
            http_addr: match std::env::var("HTTP_ADDR") {
                Ok(v) => parse_var("HTTP_ADDR", &v)?,
                Err(_) => defaults.http_addr,
            },
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value for {name}: {value:?}")))
}

fn bool_var(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::Config(format!("invalid value for {name}: {v:?}"))),
        },
        Err(_) => Ok(default),
    }
}

//! tasklab CLI: run the service or drive it from the shell.

use clap::{Parser, Subcommand};
use tasklab::api::{self, ApiState};
use tasklab::app::App;
use tasklab::config::{Config, Profile};
use tasklab::db::Db;
use tasklab::telemetry::{TelemetryConfig, init_telemetry};
use secrecy::ExposeSecret;

#[derive(Parser)]
#[command(name = "tasklab", about = "Task management backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API, overdue scheduler and notification consumer
    Serve {
        /// Override HTTP_ADDR
        #[arg(long)]
        addr: Option<std::net::SocketAddr>,
        /// Don't start the periodic overdue scheduler
        #[arg(long)]
        no_scheduler: bool,
    },
    /// Run one overdue sweep and print the report
    CheckOverdue,
    /// Apply database migrations (database profile only)
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "tasklab".to_string(),
        default_filter: config.log_level.clone(),
    })?;

    match cli.command {
        Command::Serve { addr, no_scheduler } => cmd_serve(config, addr, no_scheduler).await,
        Command::CheckOverdue => cmd_check_overdue(config).await,
        Command::Migrate => cmd_migrate(config).await,
    }
}

async fn cmd_serve(
    config: Config,
    addr: Option<std::net::SocketAddr>,
    no_scheduler: bool,
) -> anyhow::Result<()> {
    let mut app = App::build(&config).await?;
    tracing::info!(profile = %app.profile, "running with {} profile", app.profile);

    let consumer = app.spawn_consumer();
    let scheduler = (!no_scheduler).then(|| app.spawn_scheduler());

    let state = ApiState::from(&app);
    api::serve(addr.unwrap_or(config.http_addr), state, async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    app.shutdown();
    if let Some(handle) = scheduler {
        handle.await.ok();
    }
    if let Some(handle) = consumer {
        handle.await.ok();
    }
    Ok(())
}

async fn cmd_check_overdue(config: Config) -> anyhow::Result<()> {
    let mut app = App::build(&config).await?;
    let consumer = app.spawn_consumer();

    let report = app.scheduler.check_overdue_tasks().await?;
    println!(
        "overdue: {}  published: {}  failed: {}",
        report.found, report.published, report.failed
    );

    app.shutdown();
    if let Some(handle) = consumer {
        handle.await.ok();
    }
    Ok(())
}

async fn cmd_migrate(config: Config) -> anyhow::Result<()> {
    if config.profile != Profile::Database {
        anyhow::bail!("migrate needs TASKLAB_PROFILE=database (current: {})", config.profile);
    }
    let url = config
        .database_url
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let db = Db::connect(url.expose_secret()).await?;
    db.migrate().await?;
    println!("migrations applied");
    Ok(())
}

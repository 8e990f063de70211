//! Demo service: logs a heartbeat until SIGINT/SIGTERM, then releases its
//! resources in reverse order.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::instrument::WithSubscriber;

use service_lifecycle::config::{load_config, AppConfig};
use service_lifecycle::observability::logging;
use service_lifecycle::{closer_fn, Application, BoxError};

#[derive(Parser)]
#[command(name = "lifecycle-demo")]
#[command(about = "Run a heartbeat service until it receives SIGINT or SIGTERM", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the `info` string from the config.
    #[arg(short, long)]
    info: Option<String>,

    /// Seconds between heartbeats.
    #[arg(long, default_value_t = 5)]
    heartbeat_secs: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(info) = cli.info {
        config.info = info;
    }

    logging::init(&config.logging)?;

    tracing::info!(
        info = %config.info,
        interrupt = config.signals.interrupt,
        terminate = config.signals.terminate,
        "Configuration loaded"
    );

    let period = Duration::from_secs(cli.heartbeat_secs.max(1));

    let app = Application::new(config.info.clone())
        .with_signals(config.signals.clone())
        .on_start(move |app| {
            let beats = Arc::new(AtomicU64::new(0));
            let counter = beats.clone();

            let heartbeat = tokio::spawn(
                async move {
                    let mut interval = tokio::time::interval(period);
                    loop {
                        interval.tick().await;
                        let beat = counter.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::info!(beat, "heartbeat");
                    }
                }
                .with_current_subscriber(),
            );

            // Released last: reports what the task did.
            app.add_closer(closer_fn("heartbeat-summary", move || {
                tracing::info!(beats = beats.load(Ordering::Relaxed), "Heartbeat stopped");
                Ok::<(), BoxError>(())
            }));
            // Released first: stops the task.
            app.add_closer(closer_fn("heartbeat-task", move || {
                heartbeat.abort();
                Ok::<(), BoxError>(())
            }));
        });

    let termination = app.run().await;

    tracing::info!(termination = %termination, "Shutdown complete");
    Ok(ExitCode::from(termination.exit_code()))
}

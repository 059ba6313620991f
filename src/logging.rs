use std::path::PathBuf;
use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE: &str = "pai-chat.log";

/// Send `tracing` output to a daily-rolling file. The UI owns the terminal,
/// so nothing is written to stdout or stderr. Keep the guard alive until exit.
pub fn init() -> Result<WorkerGuard> {
    let directory = log_dir()?;
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;

    tracing::info!("logging to {}", directory.join(LOG_FILE).display());

    Ok(guard)
}

fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;

    Ok(data_dir.join("pai-chat").join("logs"))
}

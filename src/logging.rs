use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter used by `--dev`.
pub const DEV_FILTER: &str = "axion_host=debug,axion=debug";

/// Initialize logging to a daily file (never stdout, the terminal belongs
/// to the window). Keep the guard alive for the life of the process.
pub fn init(filter: &str) -> Result<WorkerGuard> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "axion.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_new(filter)?)
        .init();

    Ok(guard)
}

pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "axion")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("axion"))
}

//! File logging. The terminal belongs to the dashboard, so nothing is
//! written to stdout or stderr while it runs.

use crate::error::Result;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to `<data dir>/agribot/logs/agribot.log.<date>`; the level is
/// read from `AGRIBOT_LOG` (e.g. `AGRIBOT_LOG=debug agribot`).
pub fn init() -> Result<()> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "agribot.log");

    let env_filter = EnvFilter::try_from_env("AGRIBOT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("agribot=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("agribot {} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {}", log_dir.display());

    Ok(())
}

pub fn log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("agribot").join("logs")
}

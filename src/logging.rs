//! Logging setup for playlist-sync
//!
//! Events go to a daily rotating file under `.logs/` and, more compactly, to
//! stderr so scheduled runs leave a trace in both places.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "playlist-sync";
const DEFAULT_FILTER: &str = "playlist_sync=debug,rspotify=info,warn";

/// Initialize the logging system.
///
/// Logs are written to `.logs/playlist-sync.YYYY-MM-DD.log` with daily rotation.
/// The log level can be controlled via the `RUST_LOG` environment variable.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// until the process exits.
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let stderr_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}/", LOG_DIR);

    Ok(guard)
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

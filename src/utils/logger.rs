// Logger initialization: stderr plus an optional daily-rolling file

use std::io;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

pub const DEFAULT_FILTER: &str = "patent_scout=debug,tower_http=debug,axum=debug";
const LOG_FILE_PREFIX: &str = "patent-scout.log";

/// Console logs go to stderr; stdout carries the CLI report.
const CONSOLE_WRITER: fn() -> io::Stderr = io::stderr;

/// Install the global subscriber. The returned guard flushes the file writer
/// and must be held for the lifetime of the process.
pub fn init_logger(config: &LoggingConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(fmt::layer().with_writer(CONSOLE_WRITER))
        .with(file_layer)
        .init();

    if let Some(dir) = &config.log_dir {
        info!(log_dir = %dir.display(), "File logging enabled");
    }

    guard
}

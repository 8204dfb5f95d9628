//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG` takes precedence over `log_level`. File output is enabled only
/// when `log_dir` exists; files roll daily as `crab-booking.YYYY-MM-DD`.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("crab_booking={level},tower_http={level},{level}"))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_appender = log_dir
        .map(Path::new)
        .filter(|path| path.exists())
        .and_then(Path::to_str)
        .map(|dir| tracing_appender::rolling::daily(dir, "crab-booking"));

    match (file_appender, json) {
        (Some(appender), true) => builder.json().with_writer(appender).init(),
        (Some(appender), false) => builder.with_ansi(false).with_writer(appender).init(),
        (None, true) => builder.json().init(),
        (None, false) => builder.init(),
    }
}

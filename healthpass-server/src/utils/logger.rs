//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise `level` applies to this crate and to
//! the HTTP trace layer.

use std::path::Path;
use tracing_subscriber::EnvFilter;

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("healthpass_server={level},security={level},http_access={level},tower_http={level}")
            .into()
    })
}

/// Initialize the logger with stdout output
pub fn init_logger(level: &str) {
    init_logger_with_file(level, None);
}

/// Initialize the logger, writing to a daily rolling file when `log_dir` exists
pub fn init_logger_with_file(level: &str, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "healthpass");
            if subscriber.with_writer(file_appender).with_ansi(false).try_init().is_err() {
                eprintln!("logger already initialized");
            }
            return;
        }
        eprintln!("LOG_DIR {dir} is not a directory, logging to stdout");
    }

    if subscriber.try_init().is_err() {
        eprintln!("logger already initialized");
    }
}

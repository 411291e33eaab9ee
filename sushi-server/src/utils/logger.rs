//! Logging Infrastructure
//!
//! `RUST_LOG` wins over the configured level when set. A daily rolling file is
//! written when a log directory is configured.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str = "sushi_server={level},shared={level},tower_http=info,sqlx=warn";

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES.replace("{level}", level)))
}

/// Initialize the logger
///
/// Returns the appender guard when logging to a file; keep it alive for the
/// lifetime of the process or buffered lines are lost.
pub fn init_logger(level: &str, json: bool, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, "sushi-server");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            if json {
                builder.json().init();
            } else {
                builder.init();
            }
            return Some(guard);
        }
        eprintln!("Log directory {dir} is not writable, logging to stdout");
    }

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    None
}

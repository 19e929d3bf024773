use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "cla_backend=info";

/// Initializes logging with a human-readable console layer and a daily rolling
/// JSON file under `log_dir`. The returned guard must be held until exit so
/// buffered lines are flushed.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("unable to create log directory {}: {}", log_dir.display(), e);
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "cla-backend.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    // RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

//! Logging
//!
//! Installs the global `tracing` subscriber:
//! - a human-readable layer on stderr, so stdout stays free for results
//! - a daily-rolling JSON file layer when a log directory is configured
//! - `log` records redirected to `tracing` by `try_init` (the
//!   subscriber's `tracing-log` feature installs the `LogTracer`)

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogConfig;

const LOG_FILE_NAME: &str = "termvec.log";

/// `RUST_LOG` when set, the configured directives otherwise.
fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|e| {
            eprintln!("Invalid log filter '{}': {}", config.filter, e);
            EnvFilter::new("info")
        })
}

/// Initialize the logging system.
///
/// Returns the file writer's `WorkerGuard` when file logging is enabled; it
/// must stay alive until shutdown so buffered records are flushed. Calling
/// this twice leaves the first subscriber in place.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = env_filter(config);

    let (file_layer, guard) = match config.dir.as_deref().and_then(prepare_dir) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_filter(filter.clone());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .compact()
        .with_filter(filter);

    if let Err(e) = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("Logging already initialized: {}", e);
        return guard;
    }

    if let Some(dir) = &config.dir {
        log::info!(
            "Logging initialized. Writing to: {:?} (daily rolling)",
            dir.join(LOG_FILE_NAME)
        );
    }

    guard
}

fn prepare_dir(dir: &Path) -> Option<&Path> {
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create logs directory {}: {}", dir.display(), e);
            return None;
        }
    }
    Some(dir)
}

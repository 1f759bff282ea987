//! Tracing setup for the CLI.
//!
//! Human-facing diagnostics go to stderr, filtered by `RUST_LOG` (default
//! `warn`, or `docforge=debug` with `--verbose`). A session run also writes a
//! debug-level log file next to its artifacts.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILENAME: &str = "docforge.log";

fn stderr_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("docforge=debug,warn")
            } else {
                EnvFilter::try_new("warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber.
///
/// With `log_dir`, the returned guard must be held until exit so buffered
/// file output is flushed.
pub fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_line_number(false)
        .with_file(false)
        .compact()
        .with_filter(stderr_filter(verbose));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILENAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(EnvFilter::new("docforge=debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(guard)
}

// file: src/logging/logger.rs
// version: 1.0.0
// guid: 1dd0db27-2edd-4b8b-a3fa-165b9667488d

//! Logger initialization and configuration.
//!
//! Installs log to a file as well as stdout; the file is the durable record
//! of a run, including the one-time root password line.

use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{InstallError, Result};

/// Default log file for installation runs
pub const DEFAULT_LOG_FILE: &str = "/tmp/debian-install-agent.log";

/// Initialize the logging system.
///
/// `verbose` and `quiet` override the `RUST_LOG` environment; with neither
/// set, `RUST_LOG` applies and defaults to `info`. When `log_file` is given,
/// everything also goes there without ANSI escapes.
pub fn init_logger(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();
    let registry = tracing_subscriber::registry().with(filter).with(stdout_layer);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    InstallError::config(format!(
                        "Failed to open log file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            let file_layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Arc::new(file));
            registry.with(file_layer).try_init()
        }
        None => registry.try_init(),
    }
    .map_err(|e| InstallError::config(format!("Failed to initialize logger: {}", e)))?;

    Ok(())
}

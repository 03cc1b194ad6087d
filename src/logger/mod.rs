//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//!
//! Diagnostics go through `tracing`; access log lines have their own sink
//! so they can be routed to a file.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::catalog::Catalog;
use crate::config::Config;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Initialize diagnostics and the access log sink
///
/// Should be called once at application startup. `RUST_LOG` overrides
/// `logging.level` when set.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()?;

    writer::init(config.logging.access_log_file.as_deref())?;
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("ebooks-api started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
    tracing::info!("Public directory: {}", config.catalog.public_dir.display());
    tracing::info!("======================================");
}

/// Summarize the loaded dataset; the full records only at debug level
pub fn log_dataset_loaded(config: &Config, catalog: &Catalog) {
    tracing::info!(
        "[Catalog] Loaded {} authors / {} works from {}",
        catalog.len(),
        catalog.work_count(),
        config.catalog.data_file.display()
    );
    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string_pretty(catalog.all()) {
            Ok(json) => tracing::debug!("[Catalog] Records:\n{json}"),
            Err(e) => log_warning(&format!("Failed to render catalog: {e}")),
        }
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    writer::write_access(&entry.format(format));
}

pub fn log_shutdown_requested(active: usize) {
    tracing::info!("[Shutdown] Stopped accepting; {active} connection(s) in flight");
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        tracing::info!("[Shutdown] All connections closed");
    } else {
        tracing::warn!("[Shutdown] Grace period elapsed with {remaining} connection(s) open");
    }
}

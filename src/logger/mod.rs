//! Logger module
//!
//! Provides logging utilities for the trivia server:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write through the global writer, or straight to stdout/stderr before `init`
fn write(level: Level, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None if level >= Level::Warn => eprintln!("[{}] {message}", level.label()),
        None if level >= Level::Info => println!("[{}] {message}", level.label()),
        None => {}
    }
}

pub fn log_debug(message: &str) {
    write(Level::Debug, message);
}

pub fn log_info(message: &str) {
    write(Level::Info, message);
}

pub fn log_warning(message: &str) {
    write(Level::Warn, message);
}

pub fn log_error(message: &str) {
    write(Level::Error, message);
}

pub fn log_server_start(
    addr: &SocketAddr,
    config: &Config,
    data_file: Option<&Path>,
    questions: usize,
    categories: usize,
) {
    log_info("======================================");
    log_info("Trivia API started successfully");
    log_info(&format!("Listening on: http://{addr}"));
    log_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    match data_file {
        Some(path) => log_info(&format!(
            "Data file: {} (persist: {})",
            path.display(),
            config.store.persist
        )),
        None => log_info("Data file: none (in-memory only)"),
    }
    log_info(&format!(
        "Loaded {questions} questions in {categories} categories"
    ));
    if let Some(ref path) = config.logging.access_log_file {
        log_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log_info(&format!("Error log: {path}"));
    }
    log_info("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_shutdown_started(active: usize, grace_secs: u64) {
    log_info(&format!(
        "[Shutdown] Stopped accepting connections, {active} active, waiting up to {grace_secs}s"
    ));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        log_info("[Shutdown] All connections closed");
    } else {
        log_warning(&format!(
            "[Shutdown] Grace period elapsed with {remaining} connections still open"
        ));
    }
}

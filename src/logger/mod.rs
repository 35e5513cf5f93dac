//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Startup banner
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
mod writer;

pub use format::{http_version_label, AccessLogEntry};
use writer::Level;

use crate::config::{AppState, Config};
use crate::stats::{format_uptime, TIMESTAMP_FORMAT};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config
        .logging
        .level
        .parse::<Level>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_debug(message: &str) {
    if let Some(w) = writer::get() {
        w.write_debug(message);
    }
}

fn write_warning(message: &str) {
    match writer::get() {
        Some(w) => w.write_warning(message),
        None => eprintln!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    let config = &state.config;
    // 0.0.0.0 is not browsable; show loopback links for wildcard binds
    let host = if addr.ip().is_unspecified() {
        "localhost".to_string()
    } else {
        addr.ip().to_string()
    };
    let base = format!("http://{host}:{}", addr.port());

    write_info("======================================");
    write_info("soundcrate server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Document root: {}", state.root.display()));
    write_info(&format!(
        "Started at: {}",
        state.stats.start_time().format(TIMESTAMP_FORMAT)
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info(&format!("Preview:   {base}/"));
    write_info(&format!("App:       {base}/app"));
    write_info(&format!("Dashboard: {base}/dashboard"));
    write_info("======================================\n");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_warning(&format!("[WARN] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_warning(&format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_api_request(method: &str, path: &str, status: u16) {
    write_debug(&format!("[API] {method} {path} - {status}"));
}

pub fn log_shutdown(state: &AppState) {
    let uptime = (chrono::Local::now() - state.stats.start_time())
        .to_std()
        .unwrap_or_default();
    write_info(&format!(
        "\n[Shutdown] Server stopped after {} ({} requests, {} files served)",
        format_uptime(uptime),
        state.stats.requests_count(),
        state.stats.files_served()
    ));
}

// JSON endpoint handlers

use chrono::{DateTime, Local};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

use super::response::{internal_error, json_response};
use super::types::{extension_of, FileEntry};
use crate::config::AppState;
use crate::logger;
use crate::stats::TIMESTAMP_FORMAT;

/// `GET /api/stats`
pub fn handle_stats(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let snapshot = state.stats.snapshot();
    logger::log_api_request("GET", "/api/stats", 200);
    json_response(StatusCode::OK, &snapshot)
}

/// `GET /api/files`
pub async fn handle_files(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match list_files(&state.root).await {
        Ok(files) => {
            logger::log_api_request("GET", "/api/files", 200);
            json_response(StatusCode::OK, &files)
        }
        Err(e) => {
            logger::log_error(&format!("Failed to list document root: {e}"));
            internal_error()
        }
    }
}

/// Regular files directly inside `dir`, sorted by name
///
/// Entries that vanish or cannot be inspected between the scan and the
/// stat are skipped; only failing to open `dir` itself is an error.
pub async fn list_files(dir: &Path) -> io::Result<Vec<FileEntry>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                logger::log_warning(&format!("Directory scan stopped early: {e}"));
                break;
            }
        };

        let Ok(name) = entry.file_name().into_string() else {
            logger::log_warning("Skipping file with a non UTF-8 name");
            continue;
        };

        // Follows symlinks, so a link to a regular file is listed as a file
        let metadata = match fs::metadata(entry.path()).await {
            Ok(m) => m,
            Err(e) => {
                logger::log_warning(&format!("Skipping {name}: {e}"));
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = match metadata.modified() {
            Ok(t) => DateTime::<Local>::from(t).format(TIMESTAMP_FORMAT).to_string(),
            Err(e) => {
                logger::log_warning(&format!("Skipping {name}: {e}"));
                continue;
            }
        };

        files.push(FileEntry {
            extension: extension_of(&name),
            name,
            size: metadata.len(),
            modified,
            kind: FileEntry::KIND_FILE,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

//! Static file serving module
//!
//! Resolves a request path under the document root, detects its MIME type
//! and builds the response, honouring conditional GETs.

use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// Index files tried, in order, when a directory is requested
const INDEX_FILES: &[&str] = &["index.html", "index.htm"];

/// A file found under the root and read into memory
#[derive(Debug)]
pub struct ResolvedFile {
    pub content: Bytes,
    pub content_type: &'static str,
    pub modified: Option<SystemTime>,
}

/// Serve one file; `Ok` means the resolver succeeded (200 or 304)
pub async fn serve_file(
    ctx: &RequestContext<'_>,
    root: &Path,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let file = resolve(root, ctx.path).await?;

    let etag = cache::generate_etag(&file.content);
    let last_modified = file.modified.map(cache::http_date);

    if cache::is_not_modified(
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
        &etag,
        file.modified,
    ) {
        return Ok(http::build_304_response(&etag, last_modified.as_deref()));
    }

    Ok(http::response::build_file_response(
        file.content,
        file.content_type,
        &etag,
        last_modified.as_deref(),
    ))
}

/// Map a request path to a regular file strictly under `root`
///
/// `root` must already be canonical.
pub async fn resolve(root: &Path, request_path: &str) -> Result<ResolvedFile, ServeError> {
    let relative = sanitize(request_path)?;
    let mut requested = root.join(&relative);
    let mut canonical = contained(root, &requested).await?;

    let metadata = fs::metadata(&canonical).await.map_err(lookup_error)?;
    if metadata.is_dir() {
        (requested, canonical) = find_index(root, &requested).await?;
    }

    let metadata = fs::metadata(&canonical).await.map_err(lookup_error)?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    let content = fs::read(&canonical).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ServeError::NotFound,
        io::ErrorKind::PermissionDenied => ServeError::Forbidden,
        _ => ServeError::Internal(format!("read {}: {e}", canonical.display())),
    })?;

    // Detect from the requested name, not the symlink target
    let content_type = mime::content_type_for(&requested.to_string_lossy());

    Ok(ResolvedFile {
        content: Bytes::from(content),
        content_type,
        modified: metadata.modified().ok(),
    })
}

/// Decode the URL path and reject anything that could climb out of the root
fn sanitize(request_path: &str) -> Result<PathBuf, ServeError> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| ServeError::NotFound)?;

    if decoded.contains('\0') {
        return Err(ServeError::Forbidden);
    }

    let mut relative = PathBuf::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err(ServeError::Forbidden),
            // Drive prefixes and other absolute forms must not replace the root
            s if is_absolute_segment(s) => return Err(ServeError::Forbidden),
            s => relative.push(s),
        }
    }
    Ok(relative)
}

/// A segment that would reset the joined path, e.g. `C:` on Windows.
/// Colons in ordinary Unix file names are fine.
fn is_absolute_segment(segment: &str) -> bool {
    Path::new(segment)
        .components()
        .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
}

/// Canonicalize `path` and require it to stay under `root`
async fn contained(root: &Path, path: &Path) -> Result<PathBuf, ServeError> {
    let canonical = fs::canonicalize(path).await.map_err(lookup_error)?;
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {}",
            path.strip_prefix(root).unwrap_or(path).display()
        ));
        Err(ServeError::Forbidden)
    }
}

/// First index file of a directory, or `Forbidden` when there is none
async fn find_index(root: &Path, dir: &Path) -> Result<(PathBuf, PathBuf), ServeError> {
    for index in INDEX_FILES {
        let candidate = dir.join(index);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            let canonical = contained(root, &candidate).await?;
            return Ok((candidate, canonical));
        }
    }
    Err(ServeError::Forbidden)
}

/// Missing or unreachable paths are 404; permission problems are 403
fn lookup_error(err: io::Error) -> ServeError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => ServeError::Forbidden,
        _ => ServeError::NotFound,
    }
}

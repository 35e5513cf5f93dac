//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: counts the request, validates
//! the method, applies the path rewrite table and dispatches.

use crate::api;
use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::static_files;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, Route, PREVIEW_PAGE};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderName, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, SERVER, USER_AGENT,
};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    // Every request counts, whatever happens next
    state.stats.record_request();

    let mut response = dispatch(&parts, &state).await;

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if state.config.logging.access_log {
        let entry = access_entry(&parts, &response, remote_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch(parts: &Parts, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    if let Err(err) = check_http_method(&parts.method) {
        return err.into_response();
    }

    let path = parts.uri.path();
    let has_preview = tokio::fs::metadata(state.root.join(PREVIEW_PAGE))
        .await
        .is_ok_and(|m| m.is_file());

    match routing::rewrite(path, has_preview) {
        Route::Dashboard => api::dashboard::serve_dashboard(),
        Route::ApiStats => api::handle_stats(state),
        Route::ApiFiles => api::handle_files(state).await,
        Route::Static(target) => {
            let ctx = RequestContext {
                path: &target,
                if_none_match: header_string(parts, IF_NONE_MATCH),
                if_modified_since: header_string(parts, IF_MODIFIED_SINCE),
            };
            match static_files::serve_file(&ctx, &state.root).await {
                Ok(resp) => {
                    state.stats.record_file_served();
                    resp
                }
                Err(err) => {
                    if err.status().is_server_error() {
                        logger::log_error(&format!("Failed to serve {target}: {err}"));
                    }
                    err.into_response()
                }
            }
        }
    }
}

/// Only GET is served
fn check_http_method(method: &Method) -> Result<(), ServeError> {
    if method == Method::GET {
        Ok(())
    } else {
        logger::log_warning(&format!("Method not allowed: {method}"));
        Err(ServeError::MethodNotAllowed)
    }
}

fn header_string(parts: &Parts, name: HeaderName) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry(
    parts: &Parts,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = logger::http_version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_string(parts, REFERER);
    entry.user_agent = header_string(parts, USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TempRoot;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap();
        handle_request(req, Arc::clone(state), peer()).await.unwrap()
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, String, Bytes) {
        let resp = send(state, Method::GET, uri).await;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, body)
    }

    #[tokio::test]
    async fn test_root_follows_preview_presence() {
        let root = TempRoot::new();
        root.write("index.html", "<h1>app</h1>");
        let preview = root.write("preview.html", "<h1>preview</h1>");
        let state = root.state();

        let (status, content_type, body) = get(&state, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert_eq!(&body[..], b"<h1>preview</h1>");

        std::fs::remove_file(preview).unwrap();
        let (_, _, body) = get(&state, "/").await;
        assert_eq!(&body[..], b"<h1>app</h1>");
    }

    #[tokio::test]
    async fn test_app_aliases_match_index() {
        let root = TempRoot::new();
        root.write("index.html", "<h1>app</h1>");
        let state = root.state();

        let (_, _, index) = get(&state, "/index.html").await;
        let (_, _, app) = get(&state, "/app").await;
        let (_, _, app_slash) = get(&state, "/app/").await;
        assert_eq!(app, index);
        assert_eq!(app_slash, index);
    }

    #[tokio::test]
    async fn test_files_served_only_counts_static_hits() {
        let root = TempRoot::new();
        root.write("a.txt", "0123456789");
        let state = root.state();

        get(&state, "/api/stats").await;
        get(&state, "/api/files").await;
        get(&state, "/dashboard").await;
        assert_eq!(state.stats.files_served(), 0);

        get(&state, "/a.txt").await;
        get(&state, "/missing.txt").await;
        assert_eq!(state.stats.files_served(), 1);
        assert_eq!(state.stats.requests_count(), 5);
    }

    #[tokio::test]
    async fn test_conditional_get_still_counts_as_served() {
        let root = TempRoot::new();
        root.write("a.txt", "0123456789");
        let state = root.state();

        let resp = send(&state, Method::GET, "/a.txt").await;
        let etag = resp.headers()["etag"].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/a.txt")
            .header("if-none-match", etag)
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(state.stats.files_served(), 2);
    }

    #[tokio::test]
    async fn test_mp3_content_type() {
        let root = TempRoot::new();
        root.write("track.mp3", "ID3");
        let state = root.state();

        let (status, content_type, _) = get(&state, "/track.mp3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_non_get_is_rejected_but_counted() {
        let root = TempRoot::new();
        let state = root.state();

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let resp = send(&state, method, "/api/stats").await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
        assert_eq!(state.stats.requests_count(), 4);
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let root = TempRoot::new();
        let state = root.state();

        let resp = send(&state, Method::GET, "/%2e%2e/%2e%2e/etc/passwd").await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(state.stats.files_served(), 0);
    }

    #[tokio::test]
    async fn test_query_string_is_ignored_for_routing() {
        let root = TempRoot::new();
        root.write("index.html", "<h1>app</h1>");
        let state = root.state();

        let (status, content_type, _) = get(&state, "/api/stats?cache=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");

        let (status, _, body) = get(&state, "/app?x=1#frag").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"<h1>app</h1>");
    }

    #[tokio::test]
    async fn test_missing_file_is_404_with_server_header() {
        let root = TempRoot::new();
        let state = root.state();

        let resp = send(&state, Method::GET, "/nothing.here").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["server"], "soundcrate-test");
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_all_counted() {
        let root = TempRoot::new();
        root.write("a.txt", "0123456789");
        let state = root.state();

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let uri = match i % 4 {
                        0 => "/a.txt",
                        1 => "/api/stats",
                        2 => "/api/files",
                        _ => "/missing",
                    };
                    send(&state, Method::GET, uri).await.status()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(state.stats.requests_count(), 64);
        assert_eq!(state.stats.files_served(), 16);
    }
}

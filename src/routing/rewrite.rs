//! Path rewrite table
//!
//! Evaluated top to bottom, first match wins. Only the path component is
//! matched; callers strip the query before calling in.

/// Page served at `/` when it exists in the document root
pub const PREVIEW_PAGE: &str = "preview.html";

/// Page behind `/app` and the fallback for `/`
pub const APP_PAGE: &str = "index.html";

/// Routing decision for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    ApiStats,
    ApiFiles,
    /// Hand the (possibly rewritten) path to the static file resolver
    Static(String),
}

/// Decide where a request path goes
///
/// `has_preview` reports whether `preview.html` currently exists in the
/// root; it is checked per request so the decision follows the filesystem.
pub fn rewrite(path: &str, has_preview: bool) -> Route {
    match path {
        "/dashboard" | "/dashboard/" => Route::Dashboard,
        "/api/stats" => Route::ApiStats,
        "/api/files" => Route::ApiFiles,
        "/" if has_preview => Route::Static(format!("/{PREVIEW_PAGE}")),
        "/" | "/app" | "/app/" => Route::Static(format!("/{APP_PAGE}")),
        other => Route::Static(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_routes() {
        assert_eq!(rewrite("/dashboard", false), Route::Dashboard);
        assert_eq!(rewrite("/dashboard/", true), Route::Dashboard);
        assert_eq!(rewrite("/api/stats", false), Route::ApiStats);
        assert_eq!(rewrite("/api/files", false), Route::ApiFiles);
    }

    #[test]
    fn test_root_prefers_preview() {
        assert_eq!(rewrite("/", true), Route::Static("/preview.html".into()));
        assert_eq!(rewrite("/", false), Route::Static("/index.html".into()));
    }

    #[test]
    fn test_app_alias() {
        assert_eq!(rewrite("/app", true), Route::Static("/index.html".into()));
        assert_eq!(rewrite("/app/", false), Route::Static("/index.html".into()));
    }

    #[test]
    fn test_no_prefix_matching() {
        assert_eq!(
            rewrite("/api/stats/extra", false),
            Route::Static("/api/stats/extra".into())
        );
        assert_eq!(
            rewrite("/dashboards", false),
            Route::Static("/dashboards".into())
        );
        assert_eq!(rewrite("/app/x.js", false), Route::Static("/app/x.js".into()));
        assert_eq!(rewrite("/track.mp3", true), Route::Static("/track.mp3".into()));
    }
}

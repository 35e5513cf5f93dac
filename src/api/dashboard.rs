// Dashboard - static page that polls /api/stats and /api/files

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::http::response::build_html_response;

/// Bundled at compile time and served byte-for-byte
pub const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Serve the dashboard HTML page
pub fn serve_dashboard() -> Response<Full<Bytes>> {
    build_html_response(DASHBOARD_HTML)
}

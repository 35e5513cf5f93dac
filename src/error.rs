//! Request-level error kinds
//!
//! Every failure a request can hit maps to one HTTP status. Bodies never
//! carry filesystem paths.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::http;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServeError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error page; internal details stay in the error log
    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::NotFound => http::build_404_response(),
            Self::Forbidden => http::build_403_response(),
            Self::MethodNotAllowed => http::build_405_response(),
            Self::Internal(_) => http::build_500_response(),
        }
    }
}

impl From<std::io::Error> for ServeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::Internal(err.to_string()),
        }
    }
}

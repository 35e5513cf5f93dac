//! Routing module
//!
//! Maps a request path to a routing decision before any file is touched.

mod rewrite;

pub use rewrite::{rewrite, Route, PREVIEW_PAGE};

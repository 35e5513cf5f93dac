// API module entry
// JSON endpoints polled by the dashboard, plus the dashboard page itself

pub mod dashboard;
mod handlers;
mod response;
mod types;

pub use handlers::{handle_files, handle_stats};

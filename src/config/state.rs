// Application state module
// Shared handle threaded through the listener into every request

use std::io;
use std::path::PathBuf;

use super::types::Config;
use crate::stats::ServerStats;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical document root
    pub root: PathBuf,
    pub stats: ServerStats,
}

impl AppState {
    /// Resolve the configured root and start the stats clock
    pub fn new(config: &Config) -> io::Result<Self> {
        let root = PathBuf::from(&config.server.root).canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Document root is not a directory: {}", root.display()),
            ));
        }

        Ok(Self {
            config: config.clone(),
            root,
            stats: ServerStats::new(),
        })
    }
}

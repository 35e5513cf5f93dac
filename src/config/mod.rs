// Configuration module entry point
// Loads layered configuration and owns the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `SOUNDCRATE_SERVER__PORT=8080`
const ENV_PREFIX: &str = "SOUNDCRATE";

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// The file is optional; defaults and environment fill the rest
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.root", ".")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "console")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default(
                "http.server_name",
                concat!("soundcrate/", env!("CARGO_PKG_VERSION")),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Configuration with built-in defaults only, used by tests
    #[cfg(test)]
    pub fn for_root(root: &std::path::Path) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                root: root.display().to_string(),
                workers: None,
            },
            logging: LoggingConfig {
                level: "error".to_string(),
                access_log: false,
                access_log_format: "console".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
            http: HttpConfig {
                server_name: "soundcrate-test".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_FILE: &str = "definitely-missing-soundcrate-config";

    // Environment variables are process-wide, so the default port and the
    // override are checked in one test rather than two racing ones
    #[test]
    fn test_port_default_and_env_override() {
        std::env::remove_var("SOUNDCRATE_SERVER__PORT");
        let cfg = Config::load_from(MISSING_FILE).unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 5000);

        std::env::set_var("SOUNDCRATE_SERVER__PORT", "8081");
        let overridden = Config::load_from(MISSING_FILE);
        std::env::remove_var("SOUNDCRATE_SERVER__PORT");

        let overridden = overridden.unwrap();
        assert_eq!(overridden.server.port, 8081);
        assert_eq!(overridden.get_socket_addr().unwrap().port(), 8081);
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from(MISSING_FILE).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.root, ".");
        assert!(cfg.server.workers.is_none());
        assert_eq!(cfg.logging.access_log_format, "console");
        assert!(cfg.http.server_name.starts_with("soundcrate/"));
    }

    #[test]
    fn test_invalid_host_is_error() {
        let mut cfg = Config::load_from(MISSING_FILE).unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}

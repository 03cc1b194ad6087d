// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    CatalogConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Environment variable that supplies the listening port
pub const PORT_ENV: &str = "PORT";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// `.env` in the working directory is applied to the process environment
    /// first. The port always comes from `PORT`, which must be set.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        // A missing .env is normal in production
        let _ = dotenvy::dotenv();

        let port = std::env::var(PORT_ENV)
            .map_err(|_| config::ConfigError::NotFound(PORT_ENV.to_string()))?;
        Self::build(config_path, &port)
    }

    /// Build configuration from a file plus an explicit port value
    pub fn build(config_path: &str, port: &str) -> Result<Self, config::ConfigError> {
        let port: u16 = port.trim().parse().map_err(|e| {
            config::ConfigError::Message(format!("Invalid {PORT_ENV} value '{port}': {e}"))
        })?;

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("EBOOKS").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace_period", 10)?
            .set_default("http.server_name", "ebooks-api")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("catalog.data_file", "data/ebooks.json")?
            .set_default("catalog.public_dir", "public")?
            .set_default("catalog.index_file", "index.html")?
            .set_default("catalog.not_found_image", "img/error-404.svg")?
            .set_default("catalog.language", "es")?
            .set_override("server.port", i64::from(port))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Language;

    #[test]
    fn test_defaults_with_port() {
        let cfg = Config::build("no-such-config-file", "3000").unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.catalog.index_file, "index.html");
        assert_eq!(cfg.catalog.language, Language::Es);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.performance.max_connections.is_none());
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Config::build("no-such-config-file", "http").is_err());
        assert!(Config::build("no-such-config-file", "70000").is_err());
    }
}

//! Configuration module for StatusDeck.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Path to the SQLite database file (default: "statusdeck.db")
    pub db_path: String,
    /// Public origin used when building badge and status URLs (default: "http://localhost:8080")
    pub public_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            db_path: "statusdeck.db".to_string(),
            public_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STATUSDECK_HTTP_PORT`: HTTP port (default: 8080)
    /// - `STATUSDECK_DB_PATH`: Database file path (default: "statusdeck.db")
    /// - `STATUSDECK_PUBLIC_ORIGIN`: Origin for badge/status URLs
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("STATUSDECK_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Ok(db_path) = env::var("STATUSDECK_DB_PATH") {
            cfg.db_path = db_path;
        }

        if let Ok(origin) = env::var("STATUSDECK_PUBLIC_ORIGIN") {
            cfg.public_origin = origin.trim_end_matches('/').to_string();
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.db_path, "statusdeck.db");
        assert_eq!(cfg.public_origin, "http://localhost:8080");
    }
}

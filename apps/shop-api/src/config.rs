//! Shop API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first if present.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use merch_db::DbConfig;
use merch_engine::EngineConfig;

/// Used when `JWT_SECRET_KEY` is unset. Never acceptable in production.
const DEV_JWT_SECRET: &str = "merch-shop-dev-secret-change-in-production";

/// Shop API configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface to bind
    pub server_host: String,

    /// HTTP port
    pub server_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub database_max_connections: u32,

    /// Pool acquire timeout in seconds
    pub database_connect_timeout_secs: u64,

    /// HS256 signing secret
    pub jwt_secret: String,

    /// Token lifetime in seconds (default: 72 hours)
    pub jwt_lifetime_secs: i64,

    /// Deadline for one transfer or purchase, in milliseconds
    pub operation_timeout_ms: u64,

    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal; only the process environment is used then.
        let _ = dotenvy::dotenv();

        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = match lookup("JWT_SECRET_KEY") {
            Some(secret) if secret.is_empty() => {
                return Err(ConfigError::InvalidValue("JWT_SECRET_KEY".to_string()))
            }
            Some(secret) => secret,
            None => DEV_JWT_SECRET.to_string(),
        };

        let config = AppConfig {
            server_host: get("SERVER_HOST", "0.0.0.0"),

            server_port: get("SERVER_PORT", "8080")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,

            database_path: PathBuf::from(get("DATABASE_PATH", "./merch.db")),

            database_max_connections: get("DATABASE_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,

            database_connect_timeout_secs: get("DATABASE_CONNECT_TIMEOUT_SECS", "30")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_CONNECT_TIMEOUT_SECS".to_string()))?,

            jwt_secret,

            jwt_lifetime_secs: get("JWT_LIFETIME_SECS", "259200") // 72 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            operation_timeout_ms: get("OPERATION_TIMEOUT_MS", "5000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("OPERATION_TIMEOUT_MS".to_string()))?,

            log_level: get("LOG_LEVEL", "info"),
        };

        if config.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if config.operation_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("OPERATION_TIMEOUT_MS".to_string()));
        }

        Ok(config)
    }

    /// True when no signing secret was configured.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Socket address to listen on.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SERVER_HOST".to_string()))
    }

    /// Pool settings for the ledger database.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.database_max_connections)
            .connect_timeout(Duration::from_secs(self.database_connect_timeout_secs))
    }

    /// Deadline settings for the engines.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().with_operation_timeout(Duration::from_millis(self.operation_timeout_ms))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.database_path, PathBuf::from("./merch.db"));
        assert_eq!(config.jwt_lifetime_secs, 72 * 3600);
        assert!(config.uses_dev_secret());
        assert_eq!(config.engine_config().operation_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_address().unwrap().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SERVER_PORT", "9000"),
            ("DATABASE_PATH", "/tmp/shop.db"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("JWT_SECRET_KEY", "s3cret"),
            ("OPERATION_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.server_port, 9000);
        assert_eq!(config.db_config().max_connections, 12);
        assert_eq!(config.jwt_secret, "s3cret");
        assert!(!config.uses_dev_secret());
        assert_eq!(config.engine_config().operation_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("SERVER_PORT", "http")]),
            Err(ConfigError::InvalidValue(ref k)) if k == "SERVER_PORT"
        ));
        assert!(load(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("JWT_SECRET_KEY", "")]).is_err());
        assert!(load(&[("OPERATION_TIMEOUT_MS", "-1")]).is_err());
    }
}

//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Store configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Default snapshot cadence: snapshot after this many events
    pub snapshot_after_events: i64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let snapshot_after_events: i64 = env::var("SNAPSHOT_AFTER_EVENTS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SNAPSHOT_AFTER_EVENTS"))?;

        if snapshot_after_events <= 0 {
            return Err(ConfigError::InvalidValue("SNAPSHOT_AFTER_EVENTS"));
        }

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            snapshot_after_events,
            environment,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Build a connection pool from this configuration
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.database_max_connections)
            .connect(&self.database_url)
            .await
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Config tests mutate the process environment; keep them serialized.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_missing_database_url_errors() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("DATABASE_URL");

        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::MissingEnv("DATABASE_URL"))));
    }

    #[test]
    fn test_defaults_applied() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("DATABASE_URL", "postgres://localhost/aggregate_store");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
        env::remove_var("SNAPSHOT_AFTER_EVENTS");
        env::remove_var("ENVIRONMENT");

        let config = Config::from_env().unwrap();
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.snapshot_after_events, 100);
        assert_eq!(config.environment, "development");
        assert!(!config.is_production());

        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn test_non_positive_cadence_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("DATABASE_URL", "postgres://localhost/aggregate_store");
        env::set_var("SNAPSHOT_AFTER_EVENTS", "0");

        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue("SNAPSHOT_AFTER_EVENTS"))
        ));

        env::remove_var("SNAPSHOT_AFTER_EVENTS");
        env::remove_var("DATABASE_URL");
    }
}

//! Application configuration loaded from environment variables.
//!
//! The database connection string is optional: without it the service starts
//! in degraded mode and every repository call fails at query time.

use std::env;

/// Default MongoDB database name.
pub const DEFAULT_DATABASE_NAME: &str = "threads";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection string (`MONGODB_URL`). `None` means degraded mode.
    pub mongodb_url: Option<String>,
    /// Database holding the `users` and `threads` collections
    pub database_name: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Session token signing key (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            mongodb_url: env::var("MONGODB_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            database_name: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| DEFAULT_DATABASE_NAME.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Config for tests: no database, fixed signing key.
    pub fn test_default() -> Self {
        Self {
            mongodb_url: None,
            database_name: "threads_test".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// How the remote generation call carries its credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStyle {
    /// `?key=...` query parameter (the Google convention).
    QueryKey,
    /// `Authorization: Bearer ...` header.
    Bearer,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    pub gemini_auth_style: AuthStyle,
    pub gemini_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5001".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:docsmith.db".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Generation Settings ---
        // The API key is optional: without it every generation falls back to
        // the local substitutes and the service stays up.
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        let gemini_model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| "models/gemini-2.5-flash".to_string());

        let gemini_endpoint = std::env::var("GEMINI_ENDPOINT")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1".to_string());

        let auth_style_str =
            std::env::var("GEMINI_AUTH_STYLE").unwrap_or_else(|_| "key".to_string());
        let gemini_auth_style = match auth_style_str.to_lowercase().as_str() {
            "key" => AuthStyle::QueryKey,
            "bearer" => AuthStyle::Bearer,
            other => {
                return Err(ConfigError::InvalidValue(
                    "GEMINI_AUTH_STYLE".to_string(),
                    format!("'{}' is not one of 'key' or 'bearer'", other),
                ))
            }
        };

        let timeout_str =
            std::env::var("GEMINI_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let gemini_timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("GEMINI_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            gemini_api_key,
            gemini_model,
            gemini_endpoint,
            gemini_auth_style,
            gemini_timeout_secs,
        })
    }
}

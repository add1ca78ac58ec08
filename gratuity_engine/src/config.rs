//! Runtime configuration read from the environment.
//!
//! Values may also come from a `.env` file in the working directory.

use std::env;
use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_UPLOAD_MB: usize = 10;

/// Top-level configuration for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw_addr =
            env::var("GRATUITY_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let max_upload_mb = match env::var("GRATUITY_MAX_UPLOAD_MB") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|mb| *mb > 0)
                .ok_or(ConfigError::InvalidUploadLimit(raw))?,
            Err(_) => DEFAULT_MAX_UPLOAD_MB,
        };

        let log_level =
            env::var("GRATUITY_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            server: ServerConfig {
                bind_addr,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Largest request body accepted, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GRATUITY_BIND_ADDR '{value}' must be a socket address such as 127.0.0.1:3000")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("GRATUITY_MAX_UPLOAD_MB '{0}' must be a positive whole number of megabytes")]
    InvalidUploadLimit(String),
}

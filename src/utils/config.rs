//! # Runtime Configuration
//!
//! All settings come from environment variables (a `.env` file is loaded in
//! development). Optional settings fall back to their defaults with an error log.

use std::env;
use std::net::SocketAddr;

use secrecy::SecretSlice;
use thiserror::Error;
use tracing::error;

use crate::utils::constant::DEFAULT_PREFERRED_BUDGET;
use crate::utils::secret::load_secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env variable `{0}`")]
    Missing(&'static str),
    #[error("invalid value for env variable `{0}`")]
    Invalid(&'static str),
}

/// Deployment stage, used to pick the log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

/// Which persistence backend serves the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

pub struct AppConfig {
    pub environment: AppEnvironment,
    pub listen_addr: SocketAddr,
    pub store_backend: StoreBackend,
    /// Only required for [`StoreBackend::Postgres`].
    pub database_url: Option<String>,
    pub jwt_secret: SecretSlice<u8>,
    /// Preferred budget (minor units) assumed when the budget label is unrecognized.
    pub default_preferred_budget: i64,
    /// Optional JSON file overriding the built-in taxonomy.
    pub taxonomy_path: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => AppEnvironment::Production,
            _ => AppEnvironment::Development,
        };

        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("APP_PORT").unwrap_or_else(|_| "8090".to_string());
        let listen_addr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::Invalid("APP_HOST/APP_PORT"))?;

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt_secret = load_secret("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let default_preferred_budget = env::var("DEFAULT_PREFERRED_BUDGET")
            .ok()
            .and_then(|val| val.parse::<i64>().ok())
            .filter(|val| *val >= 0)
            .unwrap_or_else(|| {
                error!(
                    "Invalid or missing DEFAULT_PREFERRED_BUDGET env var, using fallback {DEFAULT_PREFERRED_BUDGET}"
                );
                DEFAULT_PREFERRED_BUDGET
            });

        Ok(Self {
            environment,
            listen_addr,
            store_backend,
            database_url,
            jwt_secret,
            default_preferred_budget,
            taxonomy_path: env::var("TAXONOMY_PATH").ok(),
        })
    }
}

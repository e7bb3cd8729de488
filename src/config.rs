use std::{env, net::SocketAddr, str::FromStr, time::Duration};
use thiserror::Error;

pub const DEFAULT_GIPHY_API_URL: &str = "https://api.giphy.com/v1/gifs/search";
const DEFAULT_DATABASE_URL: &str = "sqlite://gif_collector.db?mode=rwc";
const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub giphy_api_key: String,
    pub giphy_api_url: String,
    pub session_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let giphy_api_key = lookup("GIPHY_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("GIPHY_API_KEY".into()))?;

        let giphy_api_url = lookup("GIPHY_API_URL").unwrap_or_else(|| DEFAULT_GIPHY_API_URL.to_string());

        let session_ttl = match lookup("SESSION_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidVar("SESSION_TTL_SECS".into(), e.to_string()))?,
            None => Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        };

        Ok(Config {
            bind_address,
            database_url,
            giphy_api_key,
            giphy_api_url,
            session_ttl,
        })
    }
}

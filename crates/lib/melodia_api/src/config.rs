//! API server configuration.

use thiserror::Error;

/// Configuration errors abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for environment variable {0}")]
    Invalid(&'static str),
}

/// Configuration for the API server, read once at process start.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:4443").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Signing secret for access tokens.
    pub access_secret: String,
    /// Signing secret for CSRF tokens.
    pub csrf_secret: String,
    /// Request body cap in bytes.
    pub max_body_bytes: usize,
    /// Upper bound on the PostgreSQL connection pool.
    pub db_max_connections: u32,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `BIND_ADDR` | `127.0.0.1:4443` |
    /// | `DATABASE_URL` | composed from `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`/`DB_SSLMODE` |
    /// | `ACCESS_TOKEN_SECRET` | required |
    /// | `CSRF_TOKEN_SECRET` | required |
    /// | `MAX_BODY_BYTES` | 5 MiB |
    /// | `DB_MAX_CONNECTIONS` | 10 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:4443"),
            database_url: database_url_from_env()?,
            access_secret: require("ACCESS_TOKEN_SECRET")?,
            csrf_secret: require("CSRF_TOKEN_SECRET")?,
            max_body_bytes: parse_or("MAX_BODY_BYTES", 5 * 1024 * 1024)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
        })
    }
}

fn env_or(name: &'static str, default: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => v.parse().map_err(|_| ConfigError::Invalid(name)),
        _ => Ok(default),
    }
}

/// `DATABASE_URL` wins; otherwise the URL is composed from the
/// individual `DB_*` variables. Shared with the RPC daemons.
pub fn database_url_from_env() -> Result<String, ConfigError> {
    if let Ok(url) = std::env::var("DATABASE_URL")
        && !url.is_empty()
    {
        return Ok(url);
    }
    let host = require("DB_HOST")?;
    let port = env_or("DB_PORT", "5432");
    let user = require("DB_USER")?;
    let password = require("DB_PASSWORD")?;
    let name = require("DB_NAME")?;
    let sslmode = env_or("DB_SSLMODE", "disable");
    Ok(format!(
        "postgres://{user}:{password}@{host}:{port}/{name}?sslmode={sslmode}"
    ))
}

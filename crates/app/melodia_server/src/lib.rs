//! Shared bootstrap for the Melodia server binaries.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use melodia_api::config::{ConfigError, database_url_from_env};
use melodia_rpc::Method;

/// Initialize stdout tracing, `RUST_LOG` aware.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

/// Configuration for one RPC daemon.
#[derive(Clone, Debug)]
pub struct DaemonConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
}

impl DaemonConfig {
    /// Read the daemon configuration; the bind address variable is
    /// required, the database settings are shared with the gateway.
    pub fn from_env(addr_var: &'static str) -> Result<Self, ConfigError> {
        let bind_addr = match std::env::var(addr_var) {
            Ok(v) if !v.is_empty() => v,
            _ => return Err(ConfigError::Missing(addr_var)),
        };
        let db_max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(v) if !v.is_empty() => v
                .parse()
                .map_err(|_| ConfigError::Invalid("DB_MAX_CONNECTIONS"))?,
            _ => 10,
        };
        Ok(Self {
            bind_addr,
            database_url: database_url_from_env()?,
            db_max_connections,
        })
    }
}

/// Connect the pool and run migrations.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run one RPC daemon to completion.
pub async fn run_rpc_daemon(
    addr_var: &'static str,
    methods: &'static [Method],
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = DaemonConfig::from_env(addr_var)?;
    let pool = connect_pool(&config.database_url, config.db_max_connections).await?;
    melodia_core::migrate::migrate(&pool).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "rpc daemon starting");
    melodia_rpc::server::serve(listener, pool, methods).await?;
    Ok(())
}

//! Melodia HTTP gateway.

use std::net::SocketAddr;

use tracing::info;

use melodia_api::{AppState, config::ApiConfig};
use melodia_server::{connect_pool, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env()?;
    let pool = connect_pool(&config.database_url, config.db_max_connections).await?;
    melodia_api::migrate(&pool).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "http gateway listening");

    let app = melodia_api::router(AppState { pool, config });
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

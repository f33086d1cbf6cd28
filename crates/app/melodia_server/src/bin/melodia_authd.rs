//! Melodia auth RPC daemon: sign-up, credential checks, version
//! bumps and password changes.

use melodia_rpc::AUTH_SERVICE_METHODS;
use melodia_server::run_rpc_daemon;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_rpc_daemon("AUTH_RPC_ADDR", AUTH_SERVICE_METHODS).await
}

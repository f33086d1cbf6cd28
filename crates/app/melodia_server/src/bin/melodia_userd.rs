//! Melodia user RPC daemon: auth-data lookups.

use melodia_rpc::USER_SERVICE_METHODS;
use melodia_server::run_rpc_daemon;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_rpc_daemon("USER_RPC_ADDR", USER_SERVICE_METHODS).await
}

use std::path::PathBuf;

use revoice::config::RelayConfig;
use revoice::logging::init_logging;
use revoice::relay::RelayServer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = RelayConfig::from_env_or_default()?;
    let log_dir = PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
    let (_logging_config, _guard) = init_logging(&log_dir, "revoice-relay.log")?;

    let server = RelayServer::new(config);
    let token = server.cancel_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        token.cancel();
    });

    server.run().await?;
    Ok(())
}

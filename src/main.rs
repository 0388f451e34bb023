//! Fileshare Server
//!
//! A minimal HTTPS file store: list, download, upload and delete files kept
//! in a single flat directory.

use fileshare_server::config::Config;
use fileshare_server::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, defaulting to info when RUST_LOG is unset
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = server::run(config).await {
        tracing::error!("{}", e);
        return Err(e.into());
    }

    Ok(())
}

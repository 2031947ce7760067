//! MemChain node binary
//!
//! Runs one validator: the block producer loop, the JSON-RPC server and,
//! when configured, the precision time-service clock.

mod cli;
mod config;
mod node;
mod producer;
mod time_service;
mod transport;

use anyhow::Result;
use cli::Cli;
use config::NodeConfig;
use node::Node;
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("MemChain node starting...");

    let config = NodeConfig::from_cli(&cli)?;
    let node = Node::new(config).await?;

    // Handle Ctrl+C for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        shutdown_tx.send(true).ok();
    });

    node.run(shutdown_rx).await?;

    Ok(())
}

//! Node orchestration for memchain-node

use std::sync::Arc;

use memchain_core::{ChainError, MemoryChain, SharedChain};
use memchain_primitives::{SharedClock, SystemClock};
use memchain_rpc::{RpcContext, RpcError, RpcHandler, RpcServer, ServerConfig};
use thiserror::Error;
use tokio::sync::watch;

use crate::config::NodeConfig;
use crate::producer::BlockProducer;
use crate::time_service::{TimeServiceClock, TimeServiceError, REFRESH_INTERVAL};
use crate::transport::{BlockTransport, LoggingTransport};

/// Node error types
#[derive(Debug, Error)]
pub enum NodeError {
    /// Ledger, consensus or contract error
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
    /// RPC server error
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),
    /// Time service client could not be built
    #[error("time service error: {0}")]
    TimeService(#[from] TimeServiceError),
    /// Validator file could not be parsed
    #[error("invalid validator file: {0}")]
    ValidatorFile(#[from] serde_json::Error),
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for node operations
pub type NodeResult<T> = Result<T, NodeError>;

/// MemChain node
pub struct Node {
    config: NodeConfig,
    chain: SharedChain,
    time_clock: Option<Arc<TimeServiceClock>>,
    transport: Arc<dyn BlockTransport>,
}

impl Node {
    /// Open the chain from the data directory, or start from genesis
    pub async fn new(config: NodeConfig) -> NodeResult<Self> {
        std::fs::create_dir_all(&config.datadir)?;

        let mut time_clock = None;
        let clock: SharedClock = match &config.time_service_url {
            Some(url) => {
                let remote = Arc::new(TimeServiceClock::new(url.as_str())?);
                remote.refresh().await;
                time_clock = Some(remote.clone());
                remote
            }
            None => SystemClock::shared(),
        };

        let chain = MemoryChain::open(config.chain.clone(), clock, &config.snapshot_path())?;
        let info = chain.chain_info();
        tracing::info!(
            "Node {} opened chain with {} blocks ({} transactions)",
            info.instance_id,
            info.chain_length,
            info.total_transactions
        );

        Ok(Self {
            config,
            chain: chain.into_shared(),
            time_clock,
            transport: Arc::new(LoggingTransport),
        })
    }

    /// Shared chain handle
    pub fn chain(&self) -> &SharedChain {
        &self.chain
    }

    /// Run producer, RPC server and time refresh until shutdown
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> NodeResult<()> {
        tracing::info!("Starting MemChain node {}", self.config.instance_id());
        tracing::info!("Data directory: {:?}", self.config.datadir);

        if let Some(time_clock) = &self.time_clock {
            tokio::spawn(time_clock.clone().run_refresh(REFRESH_INTERVAL, shutdown.clone()));
        }

        let rpc_task = if self.config.rpc.enabled {
            let handler = RpcHandler::new(Arc::new(RpcContext::new(self.chain().clone())));
            let server = RpcServer::new(ServerConfig::new(self.config.rpc.listen_addr), handler);
            Some(tokio::spawn(server.run(wait_for_shutdown(shutdown.clone()))))
        } else {
            tracing::info!("RPC server disabled");
            None
        };

        let producer = BlockProducer::new(
            self.chain.clone(),
            self.config.producer.clone(),
            self.transport.clone(),
            self.config.snapshot_path(),
        );
        producer.run(shutdown).await;

        if let Some(task) = rpc_task {
            match task.await {
                Ok(result) => result?,
                Err(e) => tracing::error!("RPC server task failed: {}", e),
            }
        }

        tracing::info!("MemChain node stopped");
        Ok(())
    }
}

/// Resolves once the shutdown flag is set or its sender is gone
pub async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    loop {
        let stop = *shutdown.borrow();
        if stop {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

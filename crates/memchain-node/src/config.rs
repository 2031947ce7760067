//! Configuration types for memchain-node

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use memchain_core::{ChainConfig, ConsensusConfig, LedgerConfig, Validator, SNAPSHOT_FILE};

use crate::cli::Cli;
use crate::node::{NodeError, NodeResult};

/// Node configuration
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory
    pub datadir: PathBuf,
    /// RPC configuration
    pub rpc: RpcConfig,
    /// Block producer configuration
    pub producer: ProducerConfig,
    /// Ledger, consensus and validator set
    pub chain: ChainConfig,
    /// Precision time service base URL
    pub time_service_url: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            datadir: PathBuf::from("./data"),
            rpc: RpcConfig::default(),
            producer: ProducerConfig::default(),
            chain: ChainConfig::for_instance("NAS-001"),
            time_service_url: None,
        }
    }
}

impl NodeConfig {
    /// Build from parsed CLI arguments, loading the validator file if given
    pub fn from_cli(cli: &Cli) -> NodeResult<Self> {
        if cli.poll_interval_ms == 0 {
            return Err(NodeError::Config("poll interval must be at least 1 ms".to_string()));
        }

        let mut chain = ChainConfig {
            ledger: LedgerConfig {
                genesis_validator: cli.genesis_validator.clone(),
                ..LedgerConfig::for_instance(cli.instance_id.clone())
            },
            consensus: ConsensusConfig {
                block_time_ms: cli.block_time_ms,
            },
            ..ChainConfig::default()
        };
        if let Some(path) = &cli.validators {
            chain.validators = load_validators(path)?;
        }

        Ok(Self {
            datadir: cli.datadir.clone(),
            rpc: RpcConfig {
                enabled: cli.rpc_enabled(),
                listen_addr: cli.rpc_addr,
            },
            producer: ProducerConfig {
                poll_interval: Duration::from_millis(cli.poll_interval_ms),
                error_backoff: Duration::from_millis(cli.error_backoff_ms),
                snapshot_every: cli.snapshot_every,
            },
            chain,
            time_service_url: cli.time_service_url.clone(),
        })
    }

    /// Where the chain snapshot lives
    pub fn snapshot_path(&self) -> PathBuf {
        self.datadir.join(SNAPSHOT_FILE)
    }

    /// This node's id
    pub fn instance_id(&self) -> &str {
        &self.chain.ledger.instance_id
    }
}

/// RPC server configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Whether RPC is enabled
    pub enabled: bool,
    /// Listen address
    pub listen_addr: SocketAddr,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8545)),
        }
    }
}

/// Block producer loop configuration
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Interval between sealing attempts
    pub poll_interval: Duration,
    /// Sleep after a failed attempt
    pub error_backoff: Duration,
    /// Save the snapshot when `index % snapshot_every == 0`; 0 disables
    pub snapshot_every: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            error_backoff: Duration::from_secs(5),
            snapshot_every: 10,
        }
    }
}

/// Load a validator set from a JSON array file
pub fn load_validators(path: &Path) -> NodeResult<Vec<Validator>> {
    tracing::info!("Loading validators from {:?}", path);
    let content = std::fs::read_to_string(path)?;
    let validators: Vec<Validator> = serde_json::from_str(&content)?;
    if validators.is_empty() {
        return Err(NodeError::Config(format!("no validators in {:?}", path)));
    }
    Ok(validators)
}

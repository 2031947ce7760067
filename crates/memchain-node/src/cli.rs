//! CLI argument parsing for memchain-node

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// MemChain audit-ledger node
#[derive(Parser, Debug, Clone)]
#[command(name = "memchain-node")]
#[command(about = "MemChain audit-ledger node")]
#[command(version)]
pub struct Cli {
    /// This node's validator id
    #[arg(long, env = "INSTANCE_ID", default_value = "NAS-001")]
    pub instance_id: String,

    /// Data directory for the chain snapshot
    #[arg(long, env = "BLOCKCHAIN_DATA_DIR", default_value = "./data")]
    pub datadir: PathBuf,

    /// RPC server listen address
    #[arg(long, env = "RPC_ADDR", default_value = "0.0.0.0:8545")]
    pub rpc_addr: SocketAddr,

    /// Enable RPC server
    #[arg(long, default_value_t = true)]
    pub rpc: bool,

    /// Disable RPC server
    #[arg(long = "no-rpc")]
    pub no_rpc: bool,

    /// Precision time service base URL (local clock if unset)
    #[arg(long, env = "TIME_PRECISION_URL")]
    pub time_service_url: Option<String>,

    /// Minimum interval between blocks, milliseconds
    #[arg(long, default_value = "1000")]
    pub block_time_ms: u64,

    /// Producer poll interval, milliseconds
    #[arg(long, default_value = "500")]
    pub poll_interval_ms: u64,

    /// Sleep after a failed producer tick, milliseconds
    #[arg(long, default_value = "5000")]
    pub error_backoff_ms: u64,

    /// Save the snapshot every N blocks
    #[arg(long, default_value = "10")]
    pub snapshot_every: u64,

    /// Validator set file (JSON array); the MAGI defaults if not specified
    #[arg(long)]
    pub validators: Option<PathBuf>,

    /// Validator id recorded on a fresh genesis block
    #[arg(long, default_value = "GENESIS")]
    pub genesis_validator: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the RPC server should start
    pub fn rpc_enabled(&self) -> bool {
        self.rpc && !self.no_rpc
    }
}

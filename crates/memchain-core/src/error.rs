//! Orchestration error types

use memchain_consensus::ConsensusError;
use memchain_contracts::ContractError;
use memchain_ledger::LedgerError;
use thiserror::Error;

/// Errors surfaced by [`crate::MemoryChain`]
#[derive(Debug, Error)]
pub enum ChainError {
    /// Ledger error
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Consensus error
    #[error("consensus error: {0}")]
    Consensus(#[from] ConsensusError),

    /// Contract error
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),
}

/// Result type for orchestration calls
pub type ChainResult<T> = Result<T, ChainError>;

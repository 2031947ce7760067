//! Consensus error types

use memchain_ledger::LedgerError;
use thiserror::Error;

/// Consensus errors
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// Not a registered validator
    #[error("not a validator: {0}")]
    NotValidator(String),

    /// Registered but deactivated
    #[error("validator is inactive: {0}")]
    InactiveValidator(String),

    /// Ledger refused to build a block
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;

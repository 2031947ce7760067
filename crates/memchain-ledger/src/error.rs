//! Ledger error types

use thiserror::Error;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No transactions available to seal
    #[error("no transactions available for block")]
    EmptyBlock,

    /// Transaction payload could not be serialized
    #[error("malformed transaction data: {0}")]
    MalformedData(String),

    /// Snapshot contents failed validation
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] IntegrityError),

    /// Snapshot file could not be read or written
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file is not a JSON array of blocks
    #[error("snapshot decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// A specific chain-integrity violation.
///
/// Never escapes `add_block` or `verify_integrity`; those log it and
/// return `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// Block index does not follow the head
    #[error("invalid block index: expected {expected}, got {got}")]
    BadIndex {
        /// Expected index
        expected: u64,
        /// Actual index
        got: u64,
    },

    /// `previous_hash` does not link to the predecessor
    #[error("invalid previous hash at block {index}")]
    BadPreviousHash {
        /// Offending block
        index: u64,
    },

    /// Stored block hash differs from the recomputed one
    #[error("block hash mismatch at block {index}")]
    BlockHashMismatch {
        /// Offending block
        index: u64,
    },

    /// Stored merkle root differs from the recomputed one
    #[error("merkle root mismatch at block {index}")]
    MerkleMismatch {
        /// Offending block
        index: u64,
    },

    /// A transaction's stored data hash differs from the recomputed one
    #[error("transaction {tx_id} data hash mismatch in block {index}")]
    TxHashMismatch {
        /// Offending block
        index: u64,
        /// Offending transaction
        tx_id: String,
    },

    /// Genesis block is malformed
    #[error("invalid genesis block: {0}")]
    BadGenesis(String),

    /// Snapshot contained no blocks
    #[error("chain is empty")]
    EmptyChain,
}

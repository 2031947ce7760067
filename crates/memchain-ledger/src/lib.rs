//! # memchain-ledger
//!
//! Append-only hash-linked chain for MemChain.
//!
//! This crate provides:
//! - Transaction creation and the FIFO pending pool
//! - Block sealing with a batch cap and validated appends
//! - Transaction lookup and audit-trail queries
//! - Whole-chain integrity verification
//! - JSON snapshot persistence
//!
//! ## Architecture
//!
//! ```text
//! create_transaction ──> PendingPool ──drain──> create_block
//!                                                   │
//!                        chain: Vec<Block> <──add_block (validated)
//! ```
//!
//! Integrity failures never propagate out of `add_block` or
//! `verify_integrity`: they are logged and reported as `false`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod audit;
mod error;
mod ledger;
mod pool;
mod snapshot;

pub use audit::AuditQuery;
pub use error::{IntegrityError, LedgerError, LedgerResult};
pub use ledger::{ChainInfo, Ledger, LedgerConfig, DEFAULT_MAX_BLOCK_TRANSACTIONS};
pub use pool::PendingPool;
pub use snapshot::{load_snapshot, save_snapshot, SNAPSHOT_FILE};

//! # memchain-types
//!
//! Core types for MemChain: signed knowledge-graph transactions and the
//! hash-linked blocks that carry them.
//!
//! Every derived field (`tx_id`, `data_hash`, `merkle_root`, `block_hash`) is a
//! pure function of the stored fields and can be recomputed for verification.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod block;
mod merkle;
mod transaction;

pub use block::{Block, GENESIS_MESSAGE, GENESIS_OPERATION, GENESIS_VALIDATOR};
pub use merkle::{merkle_root, EMPTY_MERKLE_SEED};
pub use memchain_primitives::DataMap;
pub use transaction::Transaction;

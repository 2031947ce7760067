//! # memchain-consensus
//!
//! Proof-of-Authority consensus for MemChain.
//!
//! This crate provides:
//! - Validator records and an insertion-ordered registry
//! - Round-robin leader selection over active validators
//! - Block sealing gated by turn, block interval and pending work
//! - Authority checks and pointer resync for externally received blocks

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod poa;
mod types;

pub use error::{ConsensusError, ConsensusResult};
pub use poa::{
    ConsensusConfig, ConsensusInfo, ProofOfAuthority, ValidatorStatus, DEFAULT_BLOCK_TIME_MS, MECHANISM,
};
pub use types::{default_validators, Validator, ValidatorRegistry};

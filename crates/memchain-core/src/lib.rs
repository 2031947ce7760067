//! # memchain-core
//!
//! Core orchestration for MemChain.
//!
//! [`MemoryChain`] ties together the ledger, the Proof-of-Authority
//! scheduler and the contract engine for a single node:
//! - Transaction submission
//! - Contract calls, each recorded as an `execute_contract` transaction
//! - The block sealing step run by the producer loop
//! - Ingress for blocks arriving from a transport
//! - Read-side queries (chain info, audit trail, integrity)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod chain;
mod error;

pub use chain::{ChainConfig, MemoryChain, SealOutcome, SharedChain, EXECUTE_CONTRACT_OPERATION};
pub use error::{ChainError, ChainResult};

pub use memchain_consensus::{default_validators, ConsensusConfig, ConsensusInfo, Validator};
pub use memchain_contracts::{ContractError, ContractState};
pub use memchain_ledger::{AuditQuery, ChainInfo, LedgerConfig, LedgerError, SNAPSHOT_FILE};
pub use memchain_types::{Block, Transaction};

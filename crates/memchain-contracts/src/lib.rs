//! # memchain-contracts
//!
//! Small state-machine contracts for MemChain.
//!
//! This crate provides:
//! - [`MemoryLockContract`]: exclusive, expiring per-entity locks
//! - [`ResourceAllocationContract`]: capacity pools with replace-on-request allocations
//! - [`WorkflowAutomationContract`]: workflow registry and execution intent records
//! - [`ContractEngine`]: contracts registered by name
//!
//! Every call returns a result map with a `success` flag. Business failures
//! (lock conflicts, exhausted capacity, missing records) are `success: false`
//! maps; an unknown function or undecodable params is a [`ContractError`].
//!
//! ## Usage
//!
//! ```ignore
//! use memchain_contracts::ContractEngine;
//!
//! let mut engine = ContractEngine::with_defaults("NAS-001", clock);
//! let result = engine.execute("memory-lock", "acquire_lock", &params, "NAS-001")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod contract;
mod engine;
mod error;
mod lock;
mod params;
mod resource;
mod workflow;

pub use contract::{Contract, ContractKind, ContractState, SmartContract};
pub use engine::ContractEngine;
pub use error::{ContractError, ContractFailure, ContractResult};
pub use lock::{LockRecord, MemoryLockContract, DEFAULT_LOCK_DURATION_MS, LOCK_DURATION_RANGE_MS};
pub use resource::{Allocation, ResourceAllocationContract, ResourceLimits, Resources};
pub use workflow::{Execution, ExecutionStatus, WorkflowAutomationContract, WorkflowDefinition};

//! The contract capability set and the closed set of contract kinds

use memchain_primitives::{DataMap, SharedClock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContractResult;
use crate::lock::MemoryLockContract;
use crate::resource::ResourceAllocationContract;
use crate::workflow::WorkflowAutomationContract;

/// Snapshot view of a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractState {
    /// Contract id (`memory-lock-v1`, ...)
    pub contract_id: String,
    /// Implementation name (`MemoryLockContract`, ...)
    pub contract_type: String,
    /// Node that deployed the contract
    pub owner: String,
    /// Deployment time, epoch micros
    pub created_at: i64,
    /// Copy of the contract's live state
    pub state: Value,
    /// Whether the contract accepts calls
    pub is_active: bool,
}

/// Operations every contract supports
pub trait SmartContract {
    /// Which variant this is
    fn kind(&self) -> ContractKind;

    /// Run `function` on behalf of `caller`.
    ///
    /// Business failures come back as `Ok` maps with `success: false`;
    /// unknown functions and undecodable params are `Err`.
    fn execute(&mut self, function: &str, params: &DataMap, caller: &str) -> ContractResult<DataMap>;

    /// Check proposed configuration params
    fn validate(&self, params: &DataMap) -> bool;

    /// Snapshot of the current state
    fn state(&self) -> ContractState;
}

/// Contract variants selectable at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractKind {
    /// Per-entity exclusive locks
    MemoryLock,
    /// Shared capacity pools
    ResourceAllocation,
    /// Workflow registry and execution records
    WorkflowAutomation,
}

impl ContractKind {
    /// Registration name used by the default engine
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemoryLock => "memory-lock",
            Self::ResourceAllocation => "resource-allocation",
            Self::WorkflowAutomation => "workflow-automation",
        }
    }

    /// Implementation name reported in [`ContractState`]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MemoryLock => "MemoryLockContract",
            Self::ResourceAllocation => "ResourceAllocationContract",
            Self::WorkflowAutomation => "WorkflowAutomationContract",
        }
    }
}

impl std::fmt::Display for ContractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity shared by every contract instance
#[derive(Debug, Clone)]
pub(crate) struct ContractMeta {
    pub contract_id: String,
    pub owner: String,
    pub created_at: i64,
    pub clock: SharedClock,
}

impl ContractMeta {
    pub fn new(contract_id: impl Into<String>, owner: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            contract_id: contract_id.into(),
            owner: owner.into(),
            created_at: clock.now_micros(),
            clock,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now_micros()
    }

    pub fn snapshot(&self, kind: ContractKind, state: Value) -> ContractState {
        ContractState {
            contract_id: self.contract_id.clone(),
            contract_type: kind.type_name().to_string(),
            owner: self.owner.clone(),
            created_at: self.created_at,
            state,
            is_active: true,
        }
    }
}

/// A registered contract
#[derive(Debug)]
pub enum Contract {
    /// See [`MemoryLockContract`]
    MemoryLock(MemoryLockContract),
    /// See [`ResourceAllocationContract`]
    ResourceAllocation(ResourceAllocationContract),
    /// See [`WorkflowAutomationContract`]
    WorkflowAutomation(WorkflowAutomationContract),
}

impl Contract {
    /// Instantiate a contract of the given kind
    pub fn new(kind: ContractKind, contract_id: impl Into<String>, owner: impl Into<String>, clock: SharedClock) -> Self {
        match kind {
            ContractKind::MemoryLock => Self::MemoryLock(MemoryLockContract::new(contract_id, owner, clock)),
            ContractKind::ResourceAllocation => {
                Self::ResourceAllocation(ResourceAllocationContract::new(contract_id, owner, clock))
            }
            ContractKind::WorkflowAutomation => {
                Self::WorkflowAutomation(WorkflowAutomationContract::new(contract_id, owner, clock))
            }
        }
    }

    /// Workflow contract, for external step runners
    pub fn as_workflow_mut(&mut self) -> Option<&mut WorkflowAutomationContract> {
        match self {
            Self::WorkflowAutomation(w) => Some(w),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn SmartContract {
        match self {
            Self::MemoryLock(c) => c,
            Self::ResourceAllocation(c) => c,
            Self::WorkflowAutomation(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SmartContract {
        match self {
            Self::MemoryLock(c) => c,
            Self::ResourceAllocation(c) => c,
            Self::WorkflowAutomation(c) => c,
        }
    }
}

impl SmartContract for Contract {
    fn kind(&self) -> ContractKind {
        self.inner().kind()
    }

    fn execute(&mut self, function: &str, params: &DataMap, caller: &str) -> ContractResult<DataMap> {
        self.inner_mut().execute(function, params, caller)
    }

    fn validate(&self, params: &DataMap) -> bool {
        self.inner().validate(params)
    }

    fn state(&self) -> ContractState {
        self.inner().state()
    }
}

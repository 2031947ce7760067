//! Named contract registry

use memchain_primitives::{DataMap, SharedClock};
use std::collections::HashMap;

use crate::contract::{Contract, ContractKind, ContractState, SmartContract};
use crate::error::{ContractError, ContractResult};

/// Contracts registered by name.
///
/// Not internally synchronized; the owner serializes `execute` calls.
#[derive(Debug)]
pub struct ContractEngine {
    clock: SharedClock,
    contracts: HashMap<String, Contract>,
    order: Vec<String>,
}

impl ContractEngine {
    /// Create an empty engine
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            contracts: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Engine with the lock, resource and workflow contracts deployed by `owner`
    pub fn with_defaults(owner: &str, clock: SharedClock) -> Self {
        let mut engine = Self::new(clock);
        for kind in [
            ContractKind::MemoryLock,
            ContractKind::ResourceAllocation,
            ContractKind::WorkflowAutomation,
        ] {
            let name = kind.as_str();
            engine.register(name, kind, format!("{}-v1", name), owner);
        }
        tracing::info!("Smart contracts initialized");
        engine
    }

    /// Deploy a contract under `name`. Returns `false` if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: ContractKind,
        contract_id: impl Into<String>,
        owner: impl Into<String>,
    ) -> bool {
        let name = name.into();
        if self.contracts.contains_key(&name) {
            tracing::warn!("Contract {} already registered", name);
            return false;
        }
        let contract = Contract::new(kind, contract_id, owner, self.clock.clone());
        tracing::info!("Registered contract {} ({})", name, kind);
        self.order.push(name.clone());
        self.contracts.insert(name, contract);
        true
    }

    /// Run `function` on the named contract
    pub fn execute(&mut self, name: &str, function: &str, params: &DataMap, caller: &str) -> ContractResult<DataMap> {
        let contract = self
            .contracts
            .get_mut(name)
            .ok_or_else(|| ContractError::UnknownContract(name.to_string()))?;
        tracing::debug!("Executing {}.{} for {}", name, function, caller);
        contract.execute(function, params, caller)
    }

    /// Validate params against the named contract
    pub fn validate(&self, name: &str, params: &DataMap) -> ContractResult<bool> {
        Ok(self.get(name)?.validate(params))
    }

    /// State snapshot of the named contract
    pub fn state(&self, name: &str) -> ContractResult<ContractState> {
        Ok(self.get(name)?.state())
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Mutable access to a contract, for external runners
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Contract> {
        self.contracts.get_mut(name)
    }

    fn get(&self, name: &str) -> ContractResult<&Contract> {
        self.contracts
            .get(name)
            .ok_or_else(|| ContractError::UnknownContract(name.to_string()))
    }
}

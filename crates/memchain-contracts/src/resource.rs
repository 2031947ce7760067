//! Shared capacity pools with per-instance allocations

use memchain_primitives::{DataMap, SharedClock};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::contract::{ContractKind, ContractMeta, ContractState, SmartContract};
use crate::error::{ContractError, ContractFailure, ContractResult};
use crate::params::{into_result, object, parse, required, Outcome};

/// A quantity in each resource dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// CPU percent (100 per core)
    pub cpu: i64,
    /// Memory in MB
    pub memory: i64,
    /// Storage in MB
    pub storage: i64,
}

impl Resources {
    fn checked_plus(self, other: Resources) -> Option<Resources> {
        Some(Resources {
            cpu: self.cpu.checked_add(other.cpu)?,
            memory: self.memory.checked_add(other.memory)?,
            storage: self.storage.checked_add(other.storage)?,
        })
    }

    fn minus(self, other: Resources) -> Resources {
        Resources {
            cpu: self.cpu.saturating_sub(other.cpu),
            memory: self.memory.saturating_sub(other.memory),
            storage: self.storage.saturating_sub(other.storage),
        }
    }

    fn fits_within(&self, limit: &Resources) -> bool {
        self.cpu <= limit.cpu && self.memory <= limit.memory && self.storage <= limit.storage
    }

    fn is_non_negative(&self) -> bool {
        self.cpu >= 0 && self.memory >= 0 && self.storage >= 0
    }
}

/// Total capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// CPU percent
    pub total_cpu: i64,
    /// Memory in MB
    pub total_memory: i64,
    /// Storage in MB
    pub total_storage: i64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            total_cpu: 400,
            total_memory: 16_384,
            total_storage: 102_400,
        }
    }
}

impl ResourceLimits {
    fn as_resources(&self) -> Resources {
        Resources {
            cpu: self.total_cpu,
            memory: self.total_memory,
            storage: self.total_storage,
        }
    }
}

/// One instance's current allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// CPU percent
    pub cpu: i64,
    /// Memory in MB
    pub memory: i64,
    /// Storage in MB
    pub storage: i64,
    /// Allocation time, epoch micros
    pub allocated_at: i64,
}

impl Allocation {
    fn amount(&self) -> Resources {
        Resources {
            cpu: self.cpu,
            memory: self.memory,
            storage: self.storage,
        }
    }
}

#[derive(Deserialize)]
struct RequestParams {
    #[serde(default)]
    cpu: i64,
    #[serde(default)]
    memory: i64,
    #[serde(default)]
    storage: i64,
}

impl RequestParams {
    fn amount(&self) -> Resources {
        Resources {
            cpu: self.cpu,
            memory: self.memory,
            storage: self.storage,
        }
    }
}

#[derive(Deserialize)]
struct AllocationParams {
    #[serde(default)]
    instance_id: Option<String>,
}

/// Capacity pools shared by all instances.
///
/// Functions: `request_resources`, `release_resources`, `get_allocation`,
/// `get_usage`. A new request replaces the caller's previous allocation.
#[derive(Debug)]
pub struct ResourceAllocationContract {
    meta: ContractMeta,
    limits: ResourceLimits,
    used: Resources,
    allocations: BTreeMap<String, Allocation>,
}

impl ResourceAllocationContract {
    /// Create a contract with the default limits
    pub fn new(contract_id: impl Into<String>, owner: impl Into<String>, clock: SharedClock) -> Self {
        Self::with_limits(contract_id, owner, clock, ResourceLimits::default())
    }

    /// Create a contract with custom limits
    pub fn with_limits(
        contract_id: impl Into<String>,
        owner: impl Into<String>,
        clock: SharedClock,
        limits: ResourceLimits,
    ) -> Self {
        Self {
            meta: ContractMeta::new(contract_id, owner, clock),
            limits,
            used: Resources::default(),
            allocations: BTreeMap::new(),
        }
    }

    /// Sum of all allocations
    pub fn used(&self) -> Resources {
        self.used
    }

    /// Remaining capacity
    pub fn available(&self) -> Resources {
        self.limits.as_resources().minus(self.used)
    }

    fn request(&mut self, params: RequestParams, caller: &str) -> Outcome {
        let requested = params.amount();
        if !requested.is_non_negative() {
            return Err(ContractFailure::Validation(
                "resource quantities must be non-negative".to_string(),
            ));
        }

        let prior = self
            .allocations
            .get(caller)
            .map(Allocation::amount)
            .unwrap_or_default();
        let used_without_caller = self.used.minus(prior);
        let limit = self.limits.as_resources();
        // an overflowing sum cannot fit either
        let total = match used_without_caller.checked_plus(requested) {
            Some(total) if total.fits_within(&limit) => total,
            _ => {
                return Err(ContractFailure::ResourceExhausted {
                    available: limit.minus(used_without_caller),
                })
            }
        };

        let allocation = Allocation {
            cpu: requested.cpu,
            memory: requested.memory,
            storage: requested.storage,
            allocated_at: self.meta.now(),
        };
        self.used = total;
        self.allocations.insert(caller.to_string(), allocation.clone());
        tracing::info!(
            "Resources allocated to {}: CPU={}%, Memory={}MB, Storage={}MB",
            caller,
            requested.cpu,
            requested.memory,
            requested.storage
        );
        Ok(object(json!({ "allocation": allocation })))
    }

    fn release(&mut self, caller: &str) -> Outcome {
        let allocation = self
            .allocations
            .remove(caller)
            .ok_or(ContractFailure::NotFound("No allocation found"))?;
        self.used = self.used.minus(allocation.amount());
        tracing::info!("Resources released by {}", caller);
        Ok(DataMap::new())
    }

    fn get_allocation(&self, params: AllocationParams) -> Outcome {
        let instance_id = required(params.instance_id, "instance_id required")?;
        let allocation = self.allocations.get(&instance_id);
        Ok(object(json!({ "allocation": allocation })))
    }

    fn get_usage(&self) -> Outcome {
        Ok(object(json!({
            "limits": self.limits,
            "used": self.used,
            "available": self.available(),
        })))
    }
}

impl SmartContract for ResourceAllocationContract {
    fn kind(&self) -> ContractKind {
        ContractKind::ResourceAllocation
    }

    fn execute(&mut self, function: &str, params: &DataMap, caller: &str) -> ContractResult<DataMap> {
        let outcome = match function {
            "request_resources" => self.request(parse(function, params)?, caller),
            "release_resources" => self.release(caller),
            "get_allocation" => self.get_allocation(parse(function, params)?),
            "get_usage" => self.get_usage(),
            _ => {
                return Err(ContractError::UnknownFunction {
                    contract: self.meta.contract_id.clone(),
                    function: function.to_string(),
                })
            }
        };
        Ok(into_result(outcome))
    }

    fn validate(&self, params: &DataMap) -> bool {
        match parse::<RequestParams>("validate", params) {
            Ok(p) => p.amount().is_non_negative(),
            Err(_) => false,
        }
    }

    fn state(&self) -> ContractState {
        let state: Value = json!({
            "allocations": self.allocations,
            "limits": self.limits,
            "used": self.used,
        });
        self.meta.snapshot(self.kind(), state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memchain_primitives::ManualClock;
    use std::sync::Arc;

    fn contract() -> ResourceAllocationContract {
        let clock = Arc::new(ManualClock::new(1_000));
        ResourceAllocationContract::new("resource-allocation-v1", "NAS-001", clock)
    }

    fn call(c: &mut ResourceAllocationContract, f: &str, p: Value, caller: &str) -> DataMap {
        c.execute(f, &object(p), caller).unwrap()
    }

    #[test]
    fn test_request_and_usage() {
        let mut c = contract();
        let r = call(&mut c, "request_resources", json!({"cpu": 50, "memory": 1024}), "A");
        assert_eq!(r["success"], json!(true));
        assert_eq!(r["allocation"]["cpu"], json!(50));
        assert_eq!(r["allocation"]["storage"], json!(0));
        assert_eq!(r["allocation"]["allocated_at"], json!(1_000));

        let u = call(&mut c, "get_usage", json!({}), "X");
        assert_eq!(u["used"]["cpu"], json!(50));
        assert_eq!(u["available"]["memory"], json!(16_384 - 1024));
        assert_eq!(u["limits"]["total_storage"], json!(102_400));
    }

    #[test]
    fn test_insufficient_reports_headroom() {
        let mut c = contract();
        call(&mut c, "request_resources", json!({"cpu": 50}), "A");
        call(&mut c, "request_resources", json!({"cpu": 100}), "B");
        let r = call(&mut c, "request_resources", json!({"cpu": 300}), "C");
        assert_eq!(r["success"], json!(false));
        assert_eq!(r["error"], json!("Insufficient resources"));
        assert_eq!(r["available"]["cpu"], json!(250));
        assert_eq!(c.used().cpu, 150);
    }

    #[test]
    fn test_replacement_subtracts_prior_first() {
        let mut c = contract();
        call(&mut c, "request_resources", json!({"cpu": 300}), "A");
        // 300 already held by A; replacing with 400 must fit
        let r = call(&mut c, "request_resources", json!({"cpu": 400}), "A");
        assert_eq!(r["success"], json!(true));
        assert_eq!(c.used().cpu, 400);

        // shrinking releases the difference
        call(&mut c, "request_resources", json!({"cpu": 10}), "A");
        assert_eq!(c.used().cpu, 10);
    }

    #[test]
    fn test_failed_replacement_keeps_old_allocation() {
        let mut c = contract();
        call(&mut c, "request_resources", json!({"cpu": 100}), "A");
        let r = call(&mut c, "request_resources", json!({"cpu": 500}), "A");
        assert_eq!(r["available"]["cpu"], json!(400));
        assert_eq!(c.used().cpu, 100);
    }

    #[test]
    fn test_release() {
        let mut c = contract();
        let r = call(&mut c, "release_resources", json!({}), "A");
        assert_eq!(r["error"], json!("No allocation found"));

        call(&mut c, "request_resources", json!({"cpu": 50}), "A");
        call(&mut c, "request_resources", json!({"cpu": 100}), "B");
        let r = call(&mut c, "release_resources", json!({}), "A");
        assert_eq!(r["success"], json!(true));
        assert_eq!(c.used().cpu, 100);
    }

    #[test]
    fn test_get_allocation() {
        let mut c = contract();
        call(&mut c, "request_resources", json!({"memory": 64}), "A");
        let r = call(&mut c, "get_allocation", json!({"instance_id": "A"}), "X");
        assert_eq!(r["allocation"]["memory"], json!(64));
        let r = call(&mut c, "get_allocation", json!({"instance_id": "B"}), "X");
        assert_eq!(r["success"], json!(true));
        assert!(r["allocation"].is_null());
        let r = call(&mut c, "get_allocation", json!({}), "X");
        assert_eq!(r["error"], json!("instance_id required"));
    }

    #[test]
    fn test_negative_request_rejected() {
        let mut c = contract();
        let r = call(&mut c, "request_resources", json!({"cpu": -5}), "A");
        assert_eq!(r["success"], json!(false));
        assert_eq!(c.used(), Resources::default());
        assert!(!c.validate(&object(json!({"cpu": -1}))));
        assert!(c.validate(&object(json!({"cpu": 0, "memory": 5}))));
    }

    #[test]
    fn test_huge_request_cannot_overflow_usage() {
        let mut c = contract();
        call(&mut c, "request_resources", json!({"cpu": 50}), "A");

        let r = call(&mut c, "request_resources", json!({"cpu": i64::MAX}), "B");
        assert_eq!(r["success"], json!(false));
        assert_eq!(r["error"], json!("Insufficient resources"));
        assert_eq!(r["available"]["cpu"], json!(350));

        let r = call(
            &mut c,
            "request_resources",
            json!({"cpu": 1, "memory": i64::MAX, "storage": i64::MAX}),
            "A",
        );
        assert_eq!(r["success"], json!(false));
        assert_eq!(c.used().cpu, 50);
        let r = call(&mut c, "get_allocation", json!({"instance_id": "B"}), "X");
        assert!(r["allocation"].is_null());

        let u = call(&mut c, "get_usage", json!({}), "X");
        assert_eq!(u["used"]["cpu"], json!(50));
        assert_eq!(u["available"]["cpu"], json!(350));
    }

    #[test]
    fn test_unknown_function() {
        let mut c = contract();
        assert!(c.execute("mint", &DataMap::new(), "A").is_err());
    }
}

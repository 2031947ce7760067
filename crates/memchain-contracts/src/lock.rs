//! Per-entity exclusive locks with expiry

use memchain_primitives::{DataMap, SharedClock, MICROS_PER_MILLI};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::contract::{ContractKind, ContractMeta, ContractState, SmartContract};
use crate::error::{ContractError, ContractFailure, ContractResult};
use crate::params::{into_result, object, parse, required, Outcome};

/// Default lock lifetime and extension (ms)
pub const DEFAULT_LOCK_DURATION_MS: i64 = 30_000;

/// Accepted range for a configured `lock_duration_ms`
pub const LOCK_DURATION_RANGE_MS: std::ops::RangeInclusive<i64> = 1_000..=300_000;

/// A held lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Instance holding the lock
    pub holder: String,
    /// Acquisition time, epoch micros
    pub acquired_at: i64,
    /// Expiry, epoch micros
    pub expires_at: i64,
}

#[derive(Deserialize)]
struct AcquireParams {
    #[serde(default)]
    entity_name: Option<String>,
    #[serde(default)]
    duration_ms: Option<i64>,
}

#[derive(Deserialize)]
struct EntityParams {
    #[serde(default)]
    entity_name: Option<String>,
}

#[derive(Deserialize)]
struct ExtendParams {
    #[serde(default)]
    entity_name: Option<String>,
    #[serde(default)]
    extension_ms: Option<i64>,
}

#[derive(Deserialize)]
struct ConfigParams {
    #[serde(default)]
    lock_duration_ms: Option<i64>,
}

/// Exclusive entity locks.
///
/// Functions: `acquire_lock`, `release_lock`, `check_lock`, `extend_lock`.
#[derive(Debug)]
pub struct MemoryLockContract {
    meta: ContractMeta,
    locks: BTreeMap<String, LockRecord>,
    lock_duration_ms: i64,
}

impl MemoryLockContract {
    /// Create a contract with no locks
    pub fn new(contract_id: impl Into<String>, owner: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            meta: ContractMeta::new(contract_id, owner, clock),
            locks: BTreeMap::new(),
            lock_duration_ms: DEFAULT_LOCK_DURATION_MS,
        }
    }

    /// Current lock on `entity_name`, expired or not
    pub fn lock(&self, entity_name: &str) -> Option<&LockRecord> {
        self.locks.get(entity_name)
    }

    fn acquire(&mut self, params: AcquireParams, caller: &str) -> Outcome {
        let entity = required(params.entity_name, "entity_name required")?;
        let duration_ms = params.duration_ms.unwrap_or(self.lock_duration_ms);
        let now = self.meta.now();

        if let Some(lock) = self.locks.get(&entity) {
            if lock.expires_at > now {
                return Err(ContractFailure::LockConflict {
                    holder: lock.holder.clone(),
                    expires: lock.expires_at,
                });
            }
        }

        let record = LockRecord {
            holder: caller.to_string(),
            acquired_at: now,
            expires_at: now.saturating_add(duration_ms.saturating_mul(MICROS_PER_MILLI)),
        };
        let expires = record.expires_at;
        self.locks.insert(entity.clone(), record);
        tracing::info!("Lock acquired on {} by {}", entity, caller);

        Ok(object(json!({
            "entity_name": entity,
            "holder": caller,
            "expires": expires,
        })))
    }

    fn release(&mut self, params: EntityParams, caller: &str) -> Outcome {
        let entity = required(params.entity_name, "entity_name required")?;
        let lock = self.locks.get(&entity).ok_or(ContractFailure::NotFound("No lock found"))?;
        if lock.holder != caller {
            return Err(ContractFailure::NotLockHolder { action: "release" });
        }
        self.locks.remove(&entity);
        tracing::info!("Lock released on {} by {}", entity, caller);
        Ok(object(json!({ "entity_name": entity })))
    }

    fn check(&mut self, params: EntityParams) -> Outcome {
        let entity = required(params.entity_name, "entity_name required")?;
        let now = self.meta.now();

        match self.locks.get(&entity) {
            None => return Ok(object(json!({ "locked": false }))),
            Some(lock) if lock.expires_at > now => {
                return Ok(object(json!({
                    "locked": true,
                    "holder": lock.holder,
                    "expires": lock.expires_at,
                })))
            }
            Some(_) => {}
        }
        self.locks.remove(&entity);
        tracing::debug!("Evicted expired lock on {}", entity);
        Ok(object(json!({ "locked": false })))
    }

    fn extend(&mut self, params: ExtendParams, caller: &str) -> Outcome {
        let entity = required(params.entity_name, "entity_name required")?;
        let extension_ms = params.extension_ms.unwrap_or(self.lock_duration_ms);
        let lock = self
            .locks
            .get_mut(&entity)
            .ok_or(ContractFailure::NotFound("No lock found"))?;
        if lock.holder != caller {
            return Err(ContractFailure::NotLockHolder { action: "extend" });
        }
        lock.expires_at = lock
            .expires_at
            .saturating_add(extension_ms.saturating_mul(MICROS_PER_MILLI));
        let new_expires = lock.expires_at;
        tracing::info!("Lock extended on {} by {}", entity, caller);
        Ok(object(json!({
            "entity_name": entity,
            "new_expires": new_expires,
        })))
    }
}

impl SmartContract for MemoryLockContract {
    fn kind(&self) -> ContractKind {
        ContractKind::MemoryLock
    }

    fn execute(&mut self, function: &str, params: &DataMap, caller: &str) -> ContractResult<DataMap> {
        let outcome = match function {
            "acquire_lock" => self.acquire(parse(function, params)?, caller),
            "release_lock" => self.release(parse(function, params)?, caller),
            "check_lock" => self.check(parse(function, params)?),
            "extend_lock" => self.extend(parse(function, params)?, caller),
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
        match parse::<ConfigParams>("validate", params) {
            Ok(p) => LOCK_DURATION_RANGE_MS.contains(&p.lock_duration_ms.unwrap_or(DEFAULT_LOCK_DURATION_MS)),
            Err(_) => false,
        }
    }

    fn state(&self) -> ContractState {
        self.meta.snapshot(
            self.kind(),
            json!({
                "locks": self.locks,
                "lock_duration_ms": self.lock_duration_ms,
            }),
        )
    }
}

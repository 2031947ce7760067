//! Contract error types

use serde_json::{json, Value};
use thiserror::Error;

use crate::resource::Resources;
use memchain_primitives::DataMap;

/// Hard failures of a contract call.
///
/// These indicate a caller bug and are returned as `Err`. Expected business
/// failures are [`ContractFailure`] values folded into the result map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Function name not supported by the contract
    #[error("unknown function {function} on contract {contract}")]
    UnknownFunction {
        /// Contract id
        contract: String,
        /// Requested function
        function: String,
    },

    /// No contract registered under that name
    #[error("unknown contract: {0}")]
    UnknownContract(String),

    /// Params could not be decoded into the expected shape
    #[error("malformed params: {0}")]
    MalformedParams(String),
}

/// Result type for contract calls
pub type ContractResult<T> = Result<T, ContractError>;

/// Expected business-rule failures, reported as `{success: false, error, ...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractFailure {
    /// Missing or invalid parameter
    Validation(String),
    /// Entity is locked by someone else
    LockConflict {
        /// Current holder
        holder: String,
        /// Expiry, epoch micros
        expires: i64,
    },
    /// Caller does not hold the lock
    NotLockHolder {
        /// Attempted action (`release`, `extend`)
        action: &'static str,
    },
    /// Request exceeds remaining capacity
    ResourceExhausted {
        /// Remaining headroom
        available: Resources,
    },
    /// Lock, allocation, workflow or execution missing
    NotFound(&'static str),
}

impl ContractFailure {
    /// Human-readable error string
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::LockConflict { .. } => "Entity already locked".to_string(),
            Self::NotLockHolder { action } => format!("Only lock holder can {}", action),
            Self::ResourceExhausted { .. } => "Insufficient resources".to_string(),
            Self::NotFound(what) => (*what).to_string(),
        }
    }

    /// Result map for this failure
    pub fn into_result(self) -> DataMap {
        let mut map = DataMap::new();
        map.insert("success".into(), Value::Bool(false));
        map.insert("error".into(), Value::String(self.message()));
        match self {
            Self::LockConflict { holder, expires } => {
                map.insert("holder".into(), json!(holder));
                map.insert("expires".into(), json!(expires));
            }
            Self::ResourceExhausted { available } => {
                map.insert("available".into(), json!(available));
            }
            _ => {}
        }
        map
    }
}

//! Param decoding helpers shared by the contracts

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ContractError, ContractFailure, ContractResult};
use memchain_primitives::DataMap;

/// Outcome of a single contract function
pub(crate) type Outcome = Result<DataMap, ContractFailure>;

/// Decode `params` into a typed struct; wrong types are malformed params
pub(crate) fn parse<T: DeserializeOwned>(function: &str, params: &DataMap) -> ContractResult<T> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| ContractError::MalformedParams(format!("{}: {}", function, e)))
}

/// Treat absent and empty strings alike
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, ContractFailure> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ContractFailure::Validation(message.to_string())),
    }
}

/// Unwrap a `json!` object literal
pub(crate) fn object(value: Value) -> DataMap {
    match value {
        Value::Object(map) => map,
        _ => DataMap::new(),
    }
}

/// Fold an outcome into the `{success, ...}` result map
pub(crate) fn into_result(outcome: Outcome) -> DataMap {
    match outcome {
        Ok(mut body) => {
            let mut map = DataMap::new();
            map.insert("success".into(), Value::Bool(true));
            map.append(&mut body);
            map
        }
        Err(failure) => failure.into_result(),
    }
}

//! RPC request and response types

use memchain_primitives::DataMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcError;

/// JSON-RPC request ID (can be number, string, or null)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// Numeric ID (any JSON number, echoed as received)
    Number(serde_json::Number),
    /// String ID
    String(String),
    /// Null ID
    #[default]
    Null,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID
    #[serde(default)]
    pub id: JsonRpcId,
    /// Method name
    pub method: String,
    /// Positional parameters
    #[serde(default)]
    pub params: Vec<Value>,
}

impl JsonRpcRequest {
    /// Build a 2.0 request
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: JsonRpcId::Number(id.into()),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Request ID
    pub id: JsonRpcId,
    /// Result (on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create success response
    pub fn success(id: JsonRpcId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create error response
    pub fn error(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// `blockchain_submitTransaction` parameter object
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTransactionRequest {
    /// Operation name
    pub operation: String,
    /// Payload object
    #[serde(default = "empty_object")]
    pub data: Value,
    /// Optional placeholder signing key
    #[serde(default)]
    pub sign_key: Option<String>,
}

/// `contract_execute` parameter object
#[derive(Debug, Clone, Deserialize)]
pub struct ContractCallRequest {
    /// Registered contract name
    pub contract: String,
    /// Function name
    pub function: String,
    /// Function params
    #[serde(default)]
    pub params: DataMap,
}

fn empty_object() -> Value {
    Value::Object(DataMap::new())
}

/// Decode the required positional parameter at `index`
pub fn parse_param<T: DeserializeOwned>(params: &[Value], index: usize, name: &str) -> Result<T, JsonRpcError> {
    let value = params
        .get(index)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("missing {} parameter", name)))?;
    serde_json::from_value(value.clone())
        .map_err(|e| JsonRpcError::invalid_params(format!("invalid {}: {}", name, e)))
}

/// Decode an optional positional parameter; absent or null yields `None`
pub fn parse_optional_param<T: DeserializeOwned>(
    params: &[Value],
    index: usize,
    name: &str,
) -> Result<Option<T>, JsonRpcError> {
    match params.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => parse_param(params, index, name).map(Some),
    }
}

/// Serialize a result value
pub fn to_result<T: Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

//! Contract namespace RPC methods (contract_*)

use std::sync::Arc;

use memchain_core::{ChainError, ContractError};
use serde_json::Value;

use crate::error::JsonRpcError;
use crate::handler::RpcContext;
use crate::types::{parse_param, to_result, ContractCallRequest};

/// contract_execute - Run a contract function as this node and record it
pub async fn contract_execute(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let call: ContractCallRequest = parse_param(&params, 0, "call")?;
    let result = ctx
        .chain
        .write()
        .execute_contract(&call.contract, &call.function, &call.params)?;
    Ok(Value::Object(result))
}

/// contract_getState - State snapshot of a registered contract
pub async fn contract_get_state(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let name: String = parse_param(&params, 0, "contract")?;
    let state = ctx.chain.read().contract_state(&name).map_err(|e| match e {
        ChainError::Contract(ContractError::UnknownContract(name)) => {
            JsonRpcError::resource_not_found(format!("unknown contract: {}", name))
        }
        other => other.into(),
    })?;
    to_result(&state)
}

//! Consensus namespace RPC methods (consensus_*)

use std::sync::Arc;

use serde_json::Value;

use crate::error::JsonRpcError;
use crate::handler::RpcContext;
use crate::types::to_result;

/// consensus_getStatus - Validator set and current turn
pub async fn consensus_get_status(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let info = ctx.chain.read().consensus_info();
    to_result(&info)
}

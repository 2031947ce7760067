//! Ledger namespace RPC methods (blockchain_*)

use std::sync::Arc;

use memchain_core::AuditQuery;
use serde_json::{json, Value};

use crate::error::JsonRpcError;
use crate::handler::RpcContext;
use crate::types::{parse_optional_param, parse_param, to_result, SubmitTransactionRequest};

/// blockchain_getInfo - Chain length, transaction counts and head block
pub async fn blockchain_get_info(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let info = ctx.chain.read().chain_info();
    to_result(&info)
}

/// blockchain_getBlock - Block by index, or null
pub async fn blockchain_get_block(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let index: u64 = parse_param(&params, 0, "index")?;
    let block = ctx.chain.read().block(index);
    to_result(&block)
}

/// blockchain_getTransaction - Transaction by id (pending or sealed), or null
pub async fn blockchain_get_transaction(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let tx_id: String = parse_param(&params, 0, "tx_id")?;
    let tx = ctx.chain.read().transaction(&tx_id);
    to_result(&tx)
}

/// blockchain_submitTransaction - Queue an operation
pub async fn blockchain_submit_transaction(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let request: SubmitTransactionRequest = parse_param(&params, 0, "transaction")?;
    let tx = ctx
        .chain
        .write()
        .submit_transaction(&request.operation, request.data, request.sign_key.as_deref())?;
    Ok(json!({
        "tx_id": tx.tx_id,
        "status": "pending",
    }))
}

/// blockchain_getAuditTrail - Filtered sealed transactions, oldest first
pub async fn blockchain_get_audit_trail(
    ctx: Arc<RpcContext>,
    params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let query: AuditQuery = parse_optional_param(&params, 0, "query")?.unwrap_or_default();
    let trail = ctx.chain.read().audit_trail(&query);
    Ok(json!({
        "total_transactions": trail.len(),
        "audit_trail": trail,
    }))
}

/// blockchain_verifyIntegrity - Full chain walk
pub async fn blockchain_verify_integrity(
    ctx: Arc<RpcContext>,
    _params: Vec<Value>,
) -> Result<Value, JsonRpcError> {
    let (valid, chain_length) = {
        let chain = ctx.chain.read();
        (chain.verify_integrity(), chain.ledger().len())
    };
    Ok(json!({
        "valid": valid,
        "chain_length": chain_length,
    }))
}

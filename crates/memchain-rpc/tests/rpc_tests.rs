//! JSON-RPC round trips through the axum router

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use memchain_core::{ChainConfig, MemoryChain, SealOutcome, SharedChain};
use memchain_primitives::ManualClock;
use memchain_rpc::{error_code, RpcContext, RpcHandler, RpcServer, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const T0: i64 = 1_750_400_000_000_000;

struct TestNode {
    chain: SharedChain,
    clock: Arc<ManualClock>,
    router: Router,
}

fn test_node(instance: &str) -> TestNode {
    let clock = Arc::new(ManualClock::new(T0));
    let chain = MemoryChain::from_config(ChainConfig::for_instance(instance), clock.clone()).into_shared();
    let handler = RpcHandler::new(Arc::new(RpcContext::new(chain.clone())));
    let router = RpcServer::new(ServerConfig::default(), handler).router();
    TestNode { chain, clock, router }
}

async fn post_raw(router: &Router, body: String) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn call(router: &Router, method: &str, params: Value) -> Value {
    let body = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
    post_raw(router, body.to_string()).await
}

fn seal(node: &TestNode) {
    node.clock.advance_millis(1000);
    match node.chain.write().try_seal_block().unwrap() {
        SealOutcome::Sealed(_) => {}
        other => panic!("expected sealed block, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_info_on_fresh_chain() {
    let node = test_node("NAS-001");
    let resp = call(&node.router, "blockchain_getInfo", json!([])).await;

    assert_eq!(resp["jsonrpc"], "2.0");
    assert_eq!(resp["id"], 1);
    let info = &resp["result"];
    assert_eq!(info["instance_id"], "NAS-001");
    assert_eq!(info["chain_length"], 1);
    assert_eq!(info["total_transactions"], 1);
    assert_eq!(info["pending_transactions"], 0);
    assert_eq!(info["latest_block"]["index"], 0);
}

#[tokio::test]
async fn test_submit_then_lookup_transaction() {
    let node = test_node("Melchior-001");
    let resp = call(
        &node.router,
        "blockchain_submitTransaction",
        json!([{"operation": "create_entity", "data": {"name": "Alice"}}]),
    )
    .await;

    let result = &resp["result"];
    assert_eq!(result["status"], "pending");
    let tx_id = result["tx_id"].as_str().unwrap().to_string();
    assert!(tx_id.contains("Melchior-001"));

    let resp = call(&node.router, "blockchain_getTransaction", json!([tx_id])).await;
    assert_eq!(resp["result"]["operation"], "create_entity");
    assert_eq!(resp["result"]["data"]["name"], "Alice");

    seal(&node);
    let resp = call(&node.router, "blockchain_getBlock", json!([1])).await;
    assert_eq!(resp["result"]["transactions"][0]["tx_id"], tx_id.as_str());
}

#[tokio::test]
async fn test_missing_block_and_transaction_are_null() {
    let node = test_node("NAS-001");
    let resp = call(&node.router, "blockchain_getBlock", json!([42])).await;
    assert_eq!(resp["result"], Value::Null);
    assert!(resp.get("error").is_none());

    let resp = call(&node.router, "blockchain_getTransaction", json!(["nope"])).await;
    assert_eq!(resp["result"], Value::Null);
}

#[tokio::test]
async fn test_audit_trail_filters() {
    let node = test_node("Melchior-001");
    for (op, name) in [("create_entity", "Alice"), ("create_entity", "Bob"), ("add_observation", "Alice")] {
        call(
            &node.router,
            "blockchain_submitTransaction",
            json!([{"operation": op, "data": {"entity": name}}]),
        )
        .await;
    }
    seal(&node);

    let resp = call(&node.router, "blockchain_getAuditTrail", json!([{"entity_name": "Alice"}])).await;
    assert_eq!(resp["result"]["total_transactions"], 2);

    let resp = call(
        &node.router,
        "blockchain_getAuditTrail",
        json!([{"entity_name": "Alice", "operation": "add_observation"}]),
    )
    .await;
    assert_eq!(resp["result"]["total_transactions"], 1);
    assert_eq!(resp["result"]["audit_trail"][0]["operation"], "add_observation");

    // no filter: genesis plus the three submissions
    let resp = call(&node.router, "blockchain_getAuditTrail", json!([])).await;
    assert_eq!(resp["result"]["total_transactions"], 4);
}

#[tokio::test]
async fn test_verify_integrity() {
    let node = test_node("Melchior-001");
    call(
        &node.router,
        "blockchain_submitTransaction",
        json!([{"operation": "op", "data": {}}]),
    )
    .await;
    seal(&node);

    let resp = call(&node.router, "blockchain_verifyIntegrity", json!([])).await;
    assert_eq!(resp["result"]["valid"], true);
    assert_eq!(resp["result"]["chain_length"], 2);
}

#[tokio::test]
async fn test_consensus_status() {
    let node = test_node("NAS-001");
    let resp = call(&node.router, "consensus_getStatus", json!([])).await;
    let status = &resp["result"];
    assert_eq!(status["mechanism"], "Proof of Authority");
    assert_eq!(status["block_time_ms"], 1000);
    assert_eq!(status["total_validators"], 4);
    assert_eq!(status["active_validators"], 4);
    assert_eq!(status["current_validator"], "Melchior-001");
}

#[tokio::test]
async fn test_contract_execute_is_recorded() {
    let node = test_node("NAS-001");
    let resp = call(
        &node.router,
        "contract_execute",
        json!([{"contract": "memory-lock", "function": "acquire_lock", "params": {"entity_name": "Alice"}}]),
    )
    .await;

    let result = &resp["result"];
    assert_eq!(result["success"], true);
    assert_eq!(result["holder"], "NAS-001");
    let tx_id = result["tx_id"].as_str().unwrap().to_string();

    let resp = call(&node.router, "blockchain_getTransaction", json!([tx_id])).await;
    assert_eq!(resp["result"]["operation"], "execute_contract");
    assert_eq!(resp["result"]["data"]["function"], "acquire_lock");

    let resp = call(&node.router, "contract_getState", json!(["memory-lock"])).await;
    assert_eq!(resp["result"]["contract_id"], "memory-lock-v1");
    assert_eq!(resp["result"]["is_active"], true);
}

#[tokio::test]
async fn test_contract_business_failure_is_a_result() {
    let node = test_node("NAS-001");
    let resp = call(
        &node.router,
        "contract_execute",
        json!([{"contract": "resource-allocation", "function": "request_resources", "params": {"cpu": 10_000}}]),
    )
    .await;

    assert!(resp.get("error").is_none());
    assert_eq!(resp["result"]["success"], false);
    assert!(resp["result"]["tx_id"].is_string());
}

#[tokio::test]
async fn test_contract_errors() {
    let node = test_node("NAS-001");

    let resp = call(
        &node.router,
        "contract_execute",
        json!([{"contract": "memory-lock", "function": "self_destruct", "params": {}}]),
    )
    .await;
    assert_eq!(resp["error"]["code"], error_code::INVALID_PARAMS);

    let resp = call(
        &node.router,
        "contract_execute",
        json!([{"contract": "escrow", "function": "deposit", "params": {}}]),
    )
    .await;
    assert_eq!(resp["error"]["code"], error_code::INVALID_PARAMS);

    let resp = call(&node.router, "contract_getState", json!(["escrow"])).await;
    assert_eq!(resp["error"]["code"], error_code::RESOURCE_NOT_FOUND);

    // nothing recorded for hard failures
    assert_eq!(node.chain.read().chain_info().pending_transactions, 0);
}

#[tokio::test]
async fn test_protocol_errors() {
    let node = test_node("NAS-001");

    let resp = post_raw(&node.router, "{not json".to_string()).await;
    assert_eq!(resp["error"]["code"], error_code::PARSE_ERROR);
    assert_eq!(resp["id"], Value::Null);

    let resp = post_raw(&node.router, json!({"jsonrpc": "2.0", "id": 9}).to_string()).await;
    assert_eq!(resp["error"]["code"], error_code::INVALID_REQUEST);
    assert_eq!(resp["id"], 9);

    let resp = post_raw(
        &node.router,
        json!({"jsonrpc": "1.0", "id": 3, "method": "blockchain_getInfo"}).to_string(),
    )
    .await;
    assert_eq!(resp["error"]["code"], error_code::INVALID_REQUEST);

    let resp = call(&node.router, "eth_chainId", json!([])).await;
    assert_eq!(resp["error"]["code"], error_code::METHOD_NOT_FOUND);

    let resp = call(&node.router, "blockchain_getBlock", json!(["one"])).await;
    assert_eq!(resp["error"]["code"], error_code::INVALID_PARAMS);

    let resp = call(&node.router, "blockchain_submitTransaction", json!([])).await;
    assert_eq!(resp["error"]["code"], error_code::INVALID_PARAMS);
}

#[tokio::test]
async fn test_negative_and_fractional_ids_are_echoed() {
    let node = test_node("NAS-001");
    for id in [json!(-1), json!(2.5)] {
        let body = json!({"jsonrpc": "2.0", "id": id.clone(), "method": "consensus_getStatus"});
        let resp = post_raw(&node.router, body.to_string()).await;
        assert_eq!(resp["id"], id);
        assert!(resp.get("error").is_none());
    }
}

#[tokio::test]
async fn test_string_ids_are_echoed() {
    let node = test_node("NAS-001");
    let body = json!({"jsonrpc": "2.0", "id": "req-7", "method": "consensus_getStatus"});
    let resp = post_raw(&node.router, body.to_string()).await;
    assert_eq!(resp["id"], "req-7");
    assert!(resp["result"].is_object());
}

//! Contract behaviour through the engine

use memchain_contracts::{ContractEngine, ContractError};
use memchain_primitives::{DataMap, ManualClock};
use serde_json::{json, Value};
use std::sync::Arc;

const T0: i64 = 1_750_400_000_000_000;

fn params(v: Value) -> DataMap {
    match v {
        Value::Object(m) => m,
        other => panic!("expected object, got {}", other),
    }
}

fn setup() -> (ContractEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    (ContractEngine::with_defaults("NAS-001", clock.clone()), clock)
}

#[test]
fn test_lock_handoff() {
    let (mut engine, clock) = setup();
    let acquire = params(json!({"entity_name": "E", "duration_ms": 5000}));

    let r = engine.execute("memory-lock", "acquire_lock", &acquire, "A").unwrap();
    assert_eq!(r["success"], json!(true));

    clock.advance_millis(100);
    let r = engine
        .execute("memory-lock", "acquire_lock", &params(json!({"entity_name": "E"})), "B")
        .unwrap();
    assert_eq!(r["success"], json!(false));
    assert_eq!(r["holder"], json!("A"));

    let r = engine
        .execute("memory-lock", "release_lock", &params(json!({"entity_name": "E"})), "A")
        .unwrap();
    assert_eq!(r["success"], json!(true));

    let r = engine
        .execute("memory-lock", "acquire_lock", &params(json!({"entity_name": "E"})), "B")
        .unwrap();
    assert_eq!(r["success"], json!(true));
    assert_eq!(r["holder"], json!("B"));
}

#[test]
fn test_short_lock_expires() {
    let (mut engine, clock) = setup();
    engine
        .execute(
            "memory-lock",
            "acquire_lock",
            &params(json!({"entity_name": "E", "duration_ms": 1})),
            "A",
        )
        .unwrap();
    clock.advance_millis(2);
    let r = engine
        .execute("memory-lock", "check_lock", &params(json!({"entity_name": "E"})), "A")
        .unwrap();
    assert_eq!(r["locked"], json!(false));
}

#[test]
fn test_resource_capacity() {
    let (mut engine, _) = setup();
    engine
        .execute("resource-allocation", "request_resources", &params(json!({"cpu": 50})), "A")
        .unwrap();
    engine
        .execute("resource-allocation", "request_resources", &params(json!({"cpu": 100})), "B")
        .unwrap();

    let r = engine
        .execute("resource-allocation", "request_resources", &params(json!({"cpu": 300})), "C")
        .unwrap();
    assert_eq!(r["success"], json!(false));
    assert_eq!(r["error"], json!("Insufficient resources"));
    assert_eq!(r["available"]["cpu"], json!(250));

    engine
        .execute("resource-allocation", "release_resources", &DataMap::new(), "A")
        .unwrap();
    let usage = engine
        .execute("resource-allocation", "get_usage", &DataMap::new(), "X")
        .unwrap();
    assert_eq!(usage["used"]["cpu"], json!(100));
}

#[test]
fn test_workflow_trigger() {
    let (mut engine, _) = setup();
    let r = engine
        .execute(
            "workflow-automation",
            "trigger_workflow",
            &params(json!({"workflow_id": "ghost"})),
            "A",
        )
        .unwrap();
    assert_eq!(r["success"], json!(false));
    assert_eq!(r["error"], json!("Workflow not found"));

    engine
        .execute(
            "workflow-automation",
            "register_workflow",
            &params(json!({"workflow_id": "sync", "steps": ["export", "import"]})),
            "A",
        )
        .unwrap();
    let r = engine
        .execute(
            "workflow-automation",
            "trigger_workflow",
            &params(json!({"workflow_id": "sync"})),
            "A",
        )
        .unwrap();
    let execution_id = r["execution_id"].as_str().unwrap();
    assert!(execution_id.starts_with("sync-"));

    let status = engine
        .execute(
            "workflow-automation",
            "get_execution_status",
            &params(json!({"execution_id": execution_id})),
            "A",
        )
        .unwrap();
    assert_eq!(status["execution"]["status"], json!("running"));
}

#[test]
fn test_unknown_function_is_hard_error() {
    let (mut engine, _) = setup();
    let names: Vec<String> = engine.names().into_iter().map(String::from).collect();
    for name in names {
        let err = engine.execute(&name, "self_destruct", &DataMap::new(), "A").unwrap_err();
        assert!(matches!(err, ContractError::UnknownFunction { .. }), "{}", name);
    }
}

#[test]
fn test_state_reflects_calls() {
    let (mut engine, _) = setup();
    engine
        .execute("resource-allocation", "request_resources", &params(json!({"memory": 512})), "A")
        .unwrap();
    let state = engine.state("resource-allocation").unwrap();
    assert_eq!(state.contract_type, "ResourceAllocationContract");
    assert_eq!(state.state["allocations"]["A"]["memory"], json!(512));
    assert_eq!(state.state["used"]["memory"], json!(512));
}

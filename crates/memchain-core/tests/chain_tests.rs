//! End-to-end tests for the node aggregate

use memchain_core::{AuditQuery, ChainConfig, MemoryChain, SealOutcome, SNAPSHOT_FILE};
use memchain_primitives::{DataMap, ManualClock};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const T0: i64 = 1_750_400_000_000_000;

fn node(instance: &str, clock: &Arc<ManualClock>) -> MemoryChain {
    MemoryChain::from_config(ChainConfig::for_instance(instance), clock.clone())
}

fn params(v: Value) -> DataMap {
    match v {
        Value::Object(m) => m,
        other => panic!("expected object, got {}", other),
    }
}

fn seal(chain: &mut MemoryChain, clock: &ManualClock) -> u64 {
    clock.advance_millis(1000);
    match chain.try_seal_block().unwrap() {
        SealOutcome::Sealed(block) => block.index,
        other => panic!("expected sealed block, got {:?}", other),
    }
}

#[test]
fn test_submit_seal_and_audit() {
    let clock = Arc::new(ManualClock::new(T0));
    let mut chain = node("Melchior-001", &clock);

    let tx = chain
        .submit_transaction("create_entity", json!({"name": "Alice", "type": "Person"}), Some("key"))
        .unwrap();
    assert_eq!(chain.chain_info().pending_transactions, 1);
    assert_eq!(seal(&mut chain, &clock), 1);

    let stored = chain.transaction(&tx.tx_id).unwrap();
    assert!(stored.verify_signature("key"));
    assert_eq!(chain.block(1).unwrap().transactions[0].tx_id, tx.tx_id);

    let trail = chain.audit_trail(&AuditQuery::all().entity("Alice"));
    assert_eq!(trail.len(), 1);
    assert!(chain.verify_integrity());
}

#[test]
fn test_batches_are_capped() {
    let clock = Arc::new(ManualClock::new(T0));
    let mut chain = node("Melchior-001", &clock);
    for i in 0..25 {
        chain.submit_transaction("op", json!({"i": i}), None).unwrap();
    }
    seal(&mut chain, &clock);
    let info = chain.chain_info();
    assert_eq!(info.latest_block.unwrap().transactions.len(), 10);
    assert_eq!(info.pending_transactions, 15);
}

#[test]
fn test_contract_calls_are_audited() {
    let clock = Arc::new(ManualClock::new(T0));
    let mut chain = node("Melchior-001", &clock);

    chain
        .execute_contract("resource-allocation", "request_resources", &params(json!({"cpu": 500})))
        .unwrap();
    seal(&mut chain, &clock);

    let trail = chain.audit_trail(&AuditQuery::all().operation("execute_contract"));
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].data["result"]["error"], json!("Insufficient resources"));
}

#[test]
fn test_block_propagation_between_nodes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SNAPSHOT_FILE);
    let clock = Arc::new(ManualClock::new(T0));

    let mut melchior = node("Melchior-001", &clock);
    melchior.save_snapshot(&path).unwrap();
    let mut balthasar =
        MemoryChain::open(ChainConfig::for_instance("Balthasar-001"), clock.clone(), &path).unwrap();
    assert_eq!(balthasar.chain_info().chain_length, 1);

    melchior.submit_transaction("op", json!({"from": "m"}), None).unwrap();
    clock.advance_millis(1000);
    let block = match melchior.try_seal_block().unwrap() {
        SealOutcome::Sealed(block) => block,
        other => panic!("expected sealed block, got {:?}", other),
    };

    assert!(balthasar.handle_new_block(block.clone()));
    assert_eq!(balthasar.chain_info().chain_length, 2);
    assert_eq!(
        balthasar.consensus_info().current_validator.as_deref(),
        Some("Balthasar-001")
    );
    // duplicate delivery is refused
    assert!(!balthasar.handle_new_block(block));

    balthasar.submit_transaction("op", json!({"from": "b"}), None).unwrap();
    assert_eq!(seal(&mut balthasar, &clock), 2);
    assert!(balthasar.verify_integrity());
}

#[test]
fn test_open_rejects_tampered_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SNAPSHOT_FILE);
    let clock = Arc::new(ManualClock::new(T0));

    let mut chain = node("Melchior-001", &clock);
    chain.submit_transaction("op", json!({"v": 1}), None).unwrap();
    seal(&mut chain, &clock);
    chain.save_snapshot(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, text.replace("\"v\": 1", "\"v\": 2")).unwrap();
    assert!(MemoryChain::open(ChainConfig::for_instance("Melchior-001"), clock.clone(), &path).is_err());
}

#[test]
fn test_shared_handle_serializes_writers() {
    let clock = Arc::new(ManualClock::new(T0));
    let shared = node("Melchior-001", &clock).into_shared();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for i in 0..5 {
                    shared
                        .write()
                        .submit_transaction("op", json!({"t": t, "i": i}), None)
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(shared.read().chain_info().pending_transactions, 20);
}

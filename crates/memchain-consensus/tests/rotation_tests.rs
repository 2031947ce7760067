//! Round-robin rotation tests

use memchain_consensus::{ConsensusConfig, ProofOfAuthority};
use memchain_ledger::{Ledger, LedgerConfig};
use memchain_primitives::{Clock, ManualClock};
use serde_json::json;
use std::sync::Arc;

const T0: i64 = 1_750_400_000_000_000;

fn setup() -> (ProofOfAuthority, Ledger, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let poa = ProofOfAuthority::with_default_validators(ConsensusConfig::default(), clock.clone());
    let ledger = Ledger::new(LedgerConfig::default(), clock.clone());
    (poa, ledger, clock)
}

/// Seal one block as whoever holds the turn and return their id
fn seal_next(poa: &mut ProofOfAuthority, ledger: &mut Ledger, clock: &ManualClock) -> String {
    ledger.create_transaction("op", json!({"t": clock.now_micros()}), None).unwrap();
    clock.advance_millis(1000);
    let id = poa.current_validator().unwrap().instance_id.clone();
    let block = poa.create_block(ledger, &id).unwrap().unwrap();
    assert!(ledger.add_block(block));
    id
}

#[test]
fn test_four_advances_return_to_start() {
    let (mut poa, mut ledger, clock) = setup();
    let start = poa.current_validator().unwrap().instance_id.clone();

    let producers: Vec<String> = (0..4).map(|_| seal_next(&mut poa, &mut ledger, &clock)).collect();
    assert_eq!(producers, ["Melchior-001", "Balthasar-001", "Caspar-001", "NAS-001"]);
    assert_eq!(poa.current_validator().unwrap().instance_id, start);
    assert!(ledger.verify_integrity());
}

#[test]
fn test_deactivate_and_reactivate_rotation() {
    let (mut poa, mut ledger, clock) = setup();

    assert!(poa.remove_validator("Balthasar-001"));
    assert_eq!(poa.registry().len(), 4);
    assert_eq!(poa.registry().active_len(), 3);

    let producers: Vec<String> = (0..3).map(|_| seal_next(&mut poa, &mut ledger, &clock)).collect();
    assert!(!producers.iter().any(|p| p == "Balthasar-001"));
    assert_eq!(producers, ["Melchior-001", "Caspar-001", "NAS-001"]);

    assert!(poa.reactivate_validator("Balthasar-001"));
    assert_eq!(poa.registry().active_len(), 4);
    let producers: Vec<String> = (0..4).map(|_| seal_next(&mut poa, &mut ledger, &clock)).collect();
    assert!(producers.iter().any(|p| p == "Balthasar-001"));
}

#[test]
fn test_consensus_info_shape() {
    let (poa, _, _) = setup();
    let value = serde_json::to_value(poa.consensus_info()).unwrap();
    assert_eq!(value["mechanism"], "Proof of Authority");
    assert_eq!(value["block_time_ms"], 1000);
    assert_eq!(value["total_validators"], 4);
    assert_eq!(value["current_validator"], "Melchior-001");
    assert!(value["validators"][0]["last_block_time"].is_null());
}

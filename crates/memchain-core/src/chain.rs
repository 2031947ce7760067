//! The per-node aggregate of ledger, scheduler and contracts

use memchain_consensus::{default_validators, ConsensusConfig, ConsensusInfo, ProofOfAuthority, Validator};
use memchain_contracts::{ContractEngine, ContractState};
use memchain_ledger::{load_snapshot, save_snapshot, AuditQuery, ChainInfo, Ledger, LedgerConfig};
use memchain_primitives::{DataMap, SharedClock};
use memchain_types::{Block, Transaction};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

use crate::error::ChainResult;

/// Operation name recorded for contract calls
pub const EXECUTE_CONTRACT_OPERATION: &str = "execute_contract";

/// Shared handle; the write lock is the single-writer discipline
pub type SharedChain = Arc<RwLock<MemoryChain>>;

/// Chain configuration
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Ledger settings, including this node's id
    pub ledger: LedgerConfig,
    /// Scheduler settings
    pub consensus: ConsensusConfig,
    /// Validator set in rotation order
    pub validators: Vec<Validator>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            consensus: ConsensusConfig::default(),
            validators: default_validators(),
        }
    }
}

impl ChainConfig {
    /// Default config for the given node id
    pub fn for_instance(instance_id: impl Into<String>) -> Self {
        Self {
            ledger: LedgerConfig::for_instance(instance_id),
            ..Self::default()
        }
    }
}

/// Result of one sealing attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SealOutcome {
    /// Another validator holds the turn
    NotMyTurn,
    /// Our turn, but the interval has not elapsed or nothing is pending
    Idle,
    /// Block sealed and appended
    Sealed(Block),
    /// Block sealed but refused by the ledger; its batch was requeued
    Rejected(Block),
}

/// Ledger, consensus and contracts for one node.
///
/// Mutating calls take `&mut self`; share it as [`SharedChain`] so every
/// mutation runs under the write lock.
#[derive(Debug)]
pub struct MemoryChain {
    instance_id: String,
    ledger: Ledger,
    consensus: ProofOfAuthority,
    contracts: ContractEngine,
}

impl MemoryChain {
    /// Assemble from already built components
    pub fn new(ledger: Ledger, consensus: ProofOfAuthority, contracts: ContractEngine) -> Self {
        let instance_id = ledger.config().instance_id.clone();
        Self {
            instance_id,
            ledger,
            consensus,
            contracts,
        }
    }

    /// Fresh chain with a new genesis block
    pub fn from_config(config: ChainConfig, clock: SharedClock) -> Self {
        let instance_id = config.ledger.instance_id.clone();
        let ledger = Ledger::new(config.ledger, clock.clone());
        let consensus = ProofOfAuthority::new(config.consensus, config.validators, clock.clone());
        let contracts = ContractEngine::with_defaults(&instance_id, clock);
        Self::new(ledger, consensus, contracts)
    }

    /// Restore from a snapshot file if present, otherwise start fresh
    pub fn open(config: ChainConfig, clock: SharedClock, snapshot: &Path) -> ChainResult<Self> {
        let blocks = match load_snapshot(snapshot)? {
            Some(blocks) => blocks,
            None => {
                tracing::info!("No snapshot at {:?}, starting from genesis", snapshot);
                return Ok(Self::from_config(config, clock));
            }
        };
        let instance_id = config.ledger.instance_id.clone();
        let ledger = Ledger::from_blocks(config.ledger, clock.clone(), blocks)?;
        let consensus = ProofOfAuthority::new(config.consensus, config.validators, clock.clone());
        let contracts = ContractEngine::with_defaults(&instance_id, clock);
        Ok(Self::new(ledger, consensus, contracts))
    }

    /// Wrap in a shared handle
    pub fn into_shared(self) -> SharedChain {
        Arc::new(RwLock::new(self))
    }

    /// This node's id
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// The ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The scheduler
    pub fn consensus(&self) -> &ProofOfAuthority {
        &self.consensus
    }

    /// Mutable scheduler, for validator management
    pub fn consensus_mut(&mut self) -> &mut ProofOfAuthority {
        &mut self.consensus
    }

    /// The contract registry
    pub fn contracts(&self) -> &ContractEngine {
        &self.contracts
    }

    /// Mutable contract registry, for external workflow runners
    pub fn contracts_mut(&mut self) -> &mut ContractEngine {
        &mut self.contracts
    }

    /// Queue a graph operation as a pending transaction
    pub fn submit_transaction(&mut self, operation: &str, data: Value, sign_key: Option<&str>) -> ChainResult<Transaction> {
        Ok(self.ledger.create_transaction(operation, data, sign_key)?)
    }

    /// Run a contract function as this node and record the call.
    ///
    /// The returned map is the contract's result plus the `tx_id` of the
    /// `execute_contract` transaction. Failed business calls are recorded too.
    pub fn execute_contract(&mut self, name: &str, function: &str, params: &DataMap) -> ChainResult<DataMap> {
        let mut result = self.contracts.execute(name, function, params, &self.instance_id)?;
        let data = json!({
            "contract": name,
            "function": function,
            "params": params,
            "result": result,
        });
        let tx = self
            .ledger
            .create_transaction(EXECUTE_CONTRACT_OPERATION, data, None)?;
        result.insert("tx_id".into(), Value::String(tx.tx_id));
        Ok(result)
    }

    /// One scheduler tick: seal and append a block if this node may
    pub fn try_seal_block(&mut self) -> ChainResult<SealOutcome> {
        if !self.consensus.is_my_turn(&self.instance_id) {
            return Ok(SealOutcome::NotMyTurn);
        }
        let block = match self.consensus.create_block(&mut self.ledger, &self.instance_id)? {
            Some(block) => block,
            None => return Ok(SealOutcome::Idle),
        };
        if self.ledger.add_block(block.clone()) {
            Ok(SealOutcome::Sealed(block))
        } else {
            self.ledger.requeue(&block);
            Ok(SealOutcome::Rejected(block))
        }
    }

    /// Accept a block from the transport
    pub fn handle_new_block(&mut self, block: Block) -> bool {
        self.consensus.handle_new_block(&mut self.ledger, block)
    }

    /// Chain summary
    pub fn chain_info(&self) -> ChainInfo {
        self.ledger.chain_info()
    }

    /// Scheduler summary
    pub fn consensus_info(&self) -> ConsensusInfo {
        self.consensus.consensus_info()
    }

    /// Matching chain transactions, oldest first
    pub fn audit_trail(&self, query: &AuditQuery) -> Vec<Transaction> {
        self.ledger.get_audit_trail(query)
    }

    /// Full chain integrity walk
    pub fn verify_integrity(&self) -> bool {
        self.ledger.verify_integrity()
    }

    /// Transaction by id, pending or sealed
    pub fn transaction(&self, tx_id: &str) -> Option<Transaction> {
        self.ledger.get_transaction(tx_id).cloned()
    }

    /// Block by index
    pub fn block(&self, index: u64) -> Option<Block> {
        self.ledger.block(index).cloned()
    }

    /// Contract state snapshot
    pub fn contract_state(&self, name: &str) -> ChainResult<ContractState> {
        Ok(self.contracts.state(name)?)
    }

    /// Persist the whole chain
    pub fn save_snapshot(&self, path: &Path) -> ChainResult<()> {
        Ok(save_snapshot(path, self.ledger.chain())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memchain_primitives::ManualClock;

    const T0: i64 = 1_750_400_000_000_000;

    fn chain(instance: &str) -> (MemoryChain, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        (MemoryChain::from_config(ChainConfig::for_instance(instance), clock.clone()), clock)
    }

    #[test]
    fn test_not_my_turn() {
        let (mut chain, _) = chain("NAS-001");
        chain.submit_transaction("op", json!({}), None).unwrap();
        assert_eq!(chain.try_seal_block().unwrap(), SealOutcome::NotMyTurn);
    }

    #[test]
    fn test_idle_until_interval() {
        let (mut chain, clock) = chain("Melchior-001");
        assert_eq!(chain.try_seal_block().unwrap(), SealOutcome::Idle);
        chain.submit_transaction("op", json!({}), None).unwrap();
        assert_eq!(chain.try_seal_block().unwrap(), SealOutcome::Idle);
        clock.advance_millis(1000);
        match chain.try_seal_block().unwrap() {
            SealOutcome::Sealed(block) => assert_eq!(block.index, 1),
            other => panic!("expected sealed, got {:?}", other),
        }
        assert_eq!(chain.chain_info().chain_length, 2);
        assert_eq!(chain.chain_info().pending_transactions, 0);
    }

    #[test]
    fn test_execute_contract_records_transaction() {
        let (mut chain, _) = chain("NAS-001");
        let params = match json!({"entity_name": "E"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let result = chain.execute_contract("memory-lock", "acquire_lock", &params).unwrap();
        assert_eq!(result["success"], json!(true));
        assert_eq!(result["holder"], json!("NAS-001"));

        let tx_id = result["tx_id"].as_str().unwrap();
        let tx = chain.transaction(tx_id).unwrap();
        assert_eq!(tx.operation, EXECUTE_CONTRACT_OPERATION);
        assert_eq!(tx.data["contract"], json!("memory-lock"));
        assert_eq!(tx.data["function"], json!("acquire_lock"));
        assert_eq!(tx.data["params"]["entity_name"], json!("E"));
        assert_eq!(tx.data["result"]["success"], json!(true));
    }

    #[test]
    fn test_execute_contract_hard_errors_not_recorded() {
        let (mut chain, _) = chain("NAS-001");
        assert!(chain.execute_contract("nope", "f", &DataMap::new()).is_err());
        assert!(chain
            .execute_contract("memory-lock", "explode", &DataMap::new())
            .is_err());
        assert_eq!(chain.chain_info().pending_transactions, 0);
    }
}

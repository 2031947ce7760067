//! The hash-linked chain and its pending pool

use memchain_crypto::ZERO_HASH_HEX;
use memchain_primitives::SharedClock;
use memchain_types::{Block, Transaction, GENESIS_VALIDATOR};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit::AuditQuery;
use crate::error::{IntegrityError, LedgerError, LedgerResult};
use crate::pool::PendingPool;

/// Default cap on transactions sealed into one block
pub const DEFAULT_MAX_BLOCK_TRANSACTIONS: usize = 10;

/// Ledger configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// This node's id, stamped on created transactions
    pub instance_id: String,
    /// Validator id recorded on a freshly created genesis block
    pub genesis_validator: String,
    /// Batch cap for `create_block`
    pub max_block_transactions: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            instance_id: "NAS-001".to_string(),
            genesis_validator: GENESIS_VALIDATOR.to_string(),
            max_block_transactions: DEFAULT_MAX_BLOCK_TRANSACTIONS,
        }
    }
}

impl LedgerConfig {
    /// Config for the given node id with defaults for the rest
    pub fn for_instance(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            ..Self::default()
        }
    }
}

/// Summary returned by `blockchain_getInfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// This node's id
    pub instance_id: String,
    /// Number of blocks, genesis included
    pub chain_length: usize,
    /// Transactions across all blocks
    pub total_transactions: usize,
    /// Transactions waiting to be sealed
    pub pending_transactions: usize,
    /// Current head
    pub latest_block: Option<Block>,
}

/// Append-only chain of blocks plus the pending pool.
///
/// Not internally synchronized: callers serialize mutations.
#[derive(Debug)]
pub struct Ledger {
    config: LedgerConfig,
    clock: SharedClock,
    chain: Vec<Block>,
    pool: PendingPool,
}

impl Ledger {
    /// Create a ledger holding only a fresh genesis block
    pub fn new(config: LedgerConfig, clock: SharedClock) -> Self {
        let genesis = Block::genesis(clock.now_micros(), &config.genesis_validator);
        tracing::info!("Created genesis block {}", genesis.block_hash);
        Self {
            config,
            clock,
            chain: vec![genesis],
            pool: PendingPool::new(),
        }
    }

    /// Rebuild a ledger from a persisted chain, validating every block
    pub fn from_blocks(config: LedgerConfig, clock: SharedClock, blocks: Vec<Block>) -> LedgerResult<Self> {
        if blocks.is_empty() {
            return Err(IntegrityError::EmptyChain.into());
        }
        let mut ledger = Self {
            config,
            clock,
            chain: Vec::with_capacity(blocks.len()),
            pool: PendingPool::new(),
        };
        for block in blocks {
            ledger.validate_block(&block)?;
            ledger.chain.push(block);
        }
        tracing::info!("Loaded chain with {} blocks", ledger.chain.len());
        Ok(ledger)
    }

    /// Ledger configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Clock used for timestamps
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Build, hash and queue a transaction.
    ///
    /// `data` must be a JSON object. With `sign_key` the placeholder
    /// signature is attached.
    pub fn create_transaction(
        &mut self,
        operation: &str,
        data: Value,
        sign_key: Option<&str>,
    ) -> LedgerResult<Transaction> {
        if operation.is_empty() {
            return Err(LedgerError::MalformedData("operation must not be empty".into()));
        }
        let data = match data {
            Value::Object(map) => map,
            other => {
                return Err(LedgerError::MalformedData(format!(
                    "data must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut tx = Transaction::new(operation, data, self.clock.now_micros(), &self.config.instance_id);
        if let Some(key) = sign_key {
            tx = tx.with_signature(key);
        }
        tracing::info!("Created transaction {} ({})", tx.tx_id, tx.operation);
        self.pool.push(tx.clone());
        Ok(tx)
    }

    /// Seal a block on top of the current head.
    ///
    /// Without explicit `transactions` up to `max_block_transactions` oldest
    /// pending transactions are drained. They stay indexed until
    /// `add_block` accepts the block, or return to the queue via `requeue`.
    pub fn create_block(
        &mut self,
        transactions: Option<Vec<Transaction>>,
        validator: Option<&str>,
    ) -> LedgerResult<Block> {
        let transactions = match transactions {
            Some(txs) => txs,
            None => self.pool.drain(self.config.max_block_transactions),
        };
        if transactions.is_empty() {
            return Err(LedgerError::EmptyBlock);
        }

        let (index, previous_hash) = match self.chain.last() {
            Some(head) => (head.index + 1, head.block_hash.clone()),
            None => (0, ZERO_HASH_HEX.to_string()),
        };
        let validator = validator.unwrap_or(&self.config.instance_id);
        let block = Block::new(index, self.clock.now_micros(), previous_hash, validator, transactions);
        tracing::debug!("Created block {} with {} transactions", block.index, block.tx_count());
        Ok(block)
    }

    /// Validate and append a block.
    ///
    /// Returns `false` and logs the reason on any integrity failure; the
    /// chain is untouched in that case.
    pub fn add_block(&mut self, block: Block) -> bool {
        if let Err(e) = self.validate_block(&block) {
            tracing::warn!("Rejected block {}: {}", block.index, e);
            return false;
        }

        self.pool
            .remove_included(block.transactions.iter().map(|tx| tx.tx_id.as_str()));
        tracing::info!(
            "Added block {} with {} transactions",
            block.index,
            block.tx_count()
        );
        self.chain.push(block);
        true
    }

    /// Check a candidate against the current head
    pub fn validate_block(&self, block: &Block) -> Result<(), IntegrityError> {
        check_block(block, self.chain.last())
    }

    /// Return a rejected block's batch to the front of the pending queue
    pub fn requeue(&mut self, block: &Block) -> usize {
        let restored = self.pool.requeue(&block.transactions);
        if restored > 0 {
            tracing::info!("Requeued {} transactions from block {}", restored, block.index);
        }
        restored
    }

    /// Look up a transaction, pool first, then the chain
    pub fn get_transaction(&self, tx_id: &str) -> Option<&Transaction> {
        self.pool
            .get(tx_id)
            .or_else(|| self.chain.iter().find_map(|block| block.transaction(tx_id)))
    }

    /// Chain transactions matching every set filter, oldest first
    pub fn get_audit_trail(&self, query: &AuditQuery) -> Vec<Transaction> {
        let mut trail: Vec<Transaction> = self
            .chain
            .iter()
            .flat_map(|block| block.transactions.iter())
            .filter(|tx| query.matches(tx))
            .cloned()
            .collect();
        trail.sort_by_key(|tx| tx.timestamp_micros);
        trail
    }

    /// Walk the whole chain and report the first violation
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let mut previous: Option<&Block> = None;
        for block in &self.chain {
            check_block(block, previous)?;
            previous = Some(block);
        }
        Ok(())
    }

    /// True if every block links to its predecessor and all hashes recompute
    pub fn verify_integrity(&self) -> bool {
        match self.check_integrity() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Chain integrity check failed: {}", e);
                false
            }
        }
    }

    /// Summary of chain and pool sizes
    pub fn chain_info(&self) -> ChainInfo {
        ChainInfo {
            instance_id: self.config.instance_id.clone(),
            chain_length: self.chain.len(),
            total_transactions: self.chain.iter().map(Block::tx_count).sum(),
            pending_transactions: self.pool.len(),
            latest_block: self.chain.last().cloned(),
        }
    }

    /// Block at `index`
    pub fn block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.chain.get(i))
    }

    /// Current head
    pub fn head(&self) -> Option<&Block> {
        self.chain.last()
    }

    /// Whole chain, genesis first
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Check if the chain has no blocks
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Number of queued transactions
    pub fn pending_len(&self) -> usize {
        self.pool.len()
    }

    /// Mutable access to stored blocks, for integrity tests
    #[cfg(test)]
    pub(crate) fn chain_mut(&mut self) -> &mut Vec<Block> {
        &mut self.chain
    }
}

/// Validate `block` as the successor of `previous` (or as genesis when `None`)
fn check_block(block: &Block, previous: Option<&Block>) -> Result<(), IntegrityError> {
    match previous {
        Some(prev) => {
            let expected = prev.index + 1;
            if block.index != expected {
                return Err(IntegrityError::BadIndex {
                    expected,
                    got: block.index,
                });
            }
            if block.previous_hash != prev.block_hash {
                return Err(IntegrityError::BadPreviousHash { index: block.index });
            }
        }
        None => {
            if block.index != 0 {
                return Err(IntegrityError::BadIndex {
                    expected: 0,
                    got: block.index,
                });
            }
            if block.previous_hash != ZERO_HASH_HEX {
                return Err(IntegrityError::BadGenesis("previous hash must be zero".into()));
            }
        }
    }

    if block.compute_hash() != block.block_hash {
        return Err(IntegrityError::BlockHashMismatch { index: block.index });
    }
    if block.compute_merkle_root() != block.merkle_root {
        return Err(IntegrityError::MerkleMismatch { index: block.index });
    }
    if let Some(tx) = block.transactions.iter().find(|tx| !tx.verify_data_hash()) {
        return Err(IntegrityError::TxHashMismatch {
            index: block.index,
            tx_id: tx.tx_id.clone(),
        });
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

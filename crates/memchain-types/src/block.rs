//! Block types for MemChain

use memchain_crypto::{sha256_hex, ZERO_HASH_HEX};
use memchain_primitives::{to_canonical_json, DataMap};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::merkle::merkle_root;
use crate::transaction::Transaction;

/// Validator id recorded on the genesis block
pub const GENESIS_VALIDATOR: &str = "GENESIS";

/// Operation name of the single genesis transaction
pub const GENESIS_OPERATION: &str = "genesis";

/// Message carried by the genesis transaction
pub const GENESIS_MESSAGE: &str = "MAGI Memory Blockchain Genesis";

/// A sealed batch of transactions linked to its predecessor by hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Height; genesis is 0
    pub index: u64,
    /// Seal time in epoch microseconds
    pub timestamp_micros: i64,
    /// `block_hash` of the predecessor, 64 zeros for genesis
    pub previous_hash: String,
    /// Id of the validator that sealed the block
    pub validator: String,
    /// Ordered transactions
    pub transactions: Vec<Transaction>,
    /// Merkle fold of the transaction data hashes
    pub merkle_root: String,
    /// Hash over the header fields
    pub block_hash: String,
    /// Always 0 under proof of authority
    #[serde(default)]
    pub nonce: u64,
}

impl Block {
    /// Assemble a block and derive its merkle root and hash
    pub fn new(
        index: u64,
        timestamp_micros: i64,
        previous_hash: impl Into<String>,
        validator: impl Into<String>,
        transactions: Vec<Transaction>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp_micros,
            previous_hash: previous_hash.into(),
            validator: validator.into(),
            transactions,
            merkle_root: String::new(),
            block_hash: String::new(),
            nonce: 0,
        };
        block.merkle_root = block.compute_merkle_root();
        block.block_hash = block.compute_hash();
        block
    }

    /// Build the genesis block.
    ///
    /// The single genesis transaction is attributed to `genesis_validator`,
    /// which is also recorded as the block's validator.
    pub fn genesis(timestamp_micros: i64, genesis_validator: &str) -> Self {
        let mut data = DataMap::new();
        data.insert("message".into(), json!(GENESIS_MESSAGE));
        let tx = Transaction::new(GENESIS_OPERATION, data, timestamp_micros, genesis_validator);
        Self::new(0, timestamp_micros, ZERO_HASH_HEX, genesis_validator, vec![tx])
    }

    /// Check if this is a genesis block
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Recompute the merkle root from the transactions' data hashes
    pub fn compute_merkle_root(&self) -> String {
        let hashes: Vec<&str> = self.transactions.iter().map(|tx| tx.data_hash.as_str()).collect();
        merkle_root(&hashes)
    }

    /// Recompute the block hash from the stored header fields
    pub fn compute_hash(&self) -> String {
        let header = json!({
            "index": self.index,
            "timestamp_micros": self.timestamp_micros,
            "previous_hash": self.previous_hash,
            "merkle_root": self.merkle_root,
            "validator": self.validator,
            "nonce": self.nonce,
        });
        sha256_hex(to_canonical_json(&header).as_bytes())
    }

    /// Number of transactions in the block
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Find a transaction by id
    pub fn transaction(&self, tx_id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.tx_id == tx_id)
    }
}

//! Knowledge-graph mutation transactions

use memchain_crypto::{sha256_hex, short_hash};
use memchain_primitives::{to_canonical_json, DataMap};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Number of hex characters of the operation hash embedded in a tx id
const TX_ID_HASH_LEN: usize = 8;

/// A recorded graph operation.
///
/// `tx_id` is `{timestamp_micros}-{instance_id}-{first 8 hex of
/// sha256(operation || canonical(data))}` and `data_hash` is the SHA-256 of
/// the canonical JSON of `{operation, data, timestamp_micros, instance_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction id
    pub tx_id: String,
    /// Operation name (`create_entity`, `add_observation`, ...)
    pub operation: String,
    /// Operation payload
    pub data: DataMap,
    /// Creation time in epoch microseconds
    pub timestamp_micros: i64,
    /// Node that created the transaction
    pub instance_id: String,
    /// Integrity hash over the four payload fields
    pub data_hash: String,
    /// Optional placeholder signature over `data_hash`
    #[serde(default)]
    pub signature: Option<String>,
}

impl Transaction {
    /// Build a transaction and derive its id and data hash
    pub fn new(
        operation: impl Into<String>,
        data: DataMap,
        timestamp_micros: i64,
        instance_id: impl Into<String>,
    ) -> Self {
        let operation = operation.into();
        let instance_id = instance_id.into();
        let tx_id = compute_tx_id(&operation, &data, timestamp_micros, &instance_id);
        let data_hash = compute_data_hash(&operation, &data, timestamp_micros, &instance_id);
        Self {
            tx_id,
            operation,
            data,
            timestamp_micros,
            instance_id,
            data_hash,
            signature: None,
        }
    }

    /// Attach a placeholder signature made with `key`
    pub fn with_signature(mut self, key: &str) -> Self {
        self.signature = Some(memchain_crypto::sign(&self.data_hash, key));
        self
    }

    /// Recompute the data hash from the payload fields
    pub fn compute_data_hash(&self) -> String {
        compute_data_hash(
            &self.operation,
            &self.data,
            self.timestamp_micros,
            &self.instance_id,
        )
    }

    /// Recompute the transaction id from the payload fields
    pub fn compute_tx_id(&self) -> String {
        compute_tx_id(
            &self.operation,
            &self.data,
            self.timestamp_micros,
            &self.instance_id,
        )
    }

    /// True if the stored data hash matches the payload
    pub fn verify_data_hash(&self) -> bool {
        self.data_hash == self.compute_data_hash()
    }

    /// True if the transaction carries a signature made with `key`
    pub fn verify_signature(&self, key: &str) -> bool {
        self.signature
            .as_deref()
            .map(|sig| memchain_crypto::verify_signature(&self.data_hash, key, sig))
            .unwrap_or(false)
    }

    /// Canonical text of the payload, used for substring search
    pub fn data_text(&self) -> String {
        to_canonical_json(&Value::Object(self.data.clone()))
    }
}

fn compute_tx_id(operation: &str, data: &DataMap, timestamp_micros: i64, instance_id: &str) -> String {
    let mut preimage = String::from(operation);
    preimage.push_str(&to_canonical_json(&Value::Object(data.clone())));
    let op_hash = short_hash(preimage.as_bytes(), TX_ID_HASH_LEN);
    format!("{}-{}-{}", timestamp_micros, instance_id, op_hash)
}

fn compute_data_hash(operation: &str, data: &DataMap, timestamp_micros: i64, instance_id: &str) -> String {
    let content = json!({
        "operation": operation,
        "data": data,
        "timestamp_micros": timestamp_micros,
        "instance_id": instance_id,
    });
    sha256_hex(to_canonical_json(&content).as_bytes())
}

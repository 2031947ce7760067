//! Validator records and the ordered registry

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_active() -> bool {
    true
}

/// An authorized block signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Unique node id
    pub instance_id: String,
    /// Display name
    pub name: String,
    /// Network address (`host:port`)
    pub address: String,
    /// Public key text (placeholder)
    pub public_key: String,
    /// Whether the validator takes part in the rotation
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Timestamp (epoch micros) of the last block it sealed
    #[serde(default)]
    pub last_block_time: Option<i64>,
}

impl Validator {
    /// Create an active validator
    pub fn new(
        instance_id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            name: name.into(),
            address: address.into(),
            public_key: public_key.into(),
            is_active: true,
            last_block_time: None,
        }
    }
}

/// The four MAGI nodes, in rotation order
pub fn default_validators() -> Vec<Validator> {
    [
        ("Melchior-001", "Melchior", "192.168.50.100:8545"),
        ("Balthasar-001", "Balthasar", "192.168.50.101:8545"),
        ("Caspar-001", "Caspar", "192.168.50.102:8545"),
        ("NAS-001", "NAS", "192.168.50.78:8545"),
    ]
    .into_iter()
    .map(|(id, name, addr)| Validator::new(id, name, addr, format!("{}_pubkey_placeholder", name.to_lowercase())))
    .collect()
}

/// Validators keyed by id plus their insertion order.
///
/// Removal only deactivates; ids are never forgotten.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    by_id: HashMap<String, Validator>,
    order: Vec<String>,
}

impl ValidatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list; later duplicates are ignored
    pub fn from_validators(validators: Vec<Validator>) -> Self {
        let mut registry = Self::new();
        for v in validators {
            registry.add(v);
        }
        registry
    }

    /// Append a validator. Returns `false` if the id is already registered.
    pub fn add(&mut self, validator: Validator) -> bool {
        if self.by_id.contains_key(&validator.instance_id) {
            return false;
        }
        self.order.push(validator.instance_id.clone());
        self.by_id.insert(validator.instance_id.clone(), validator);
        true
    }

    /// Get a validator by id
    pub fn get(&self, instance_id: &str) -> Option<&Validator> {
        self.by_id.get(instance_id)
    }

    /// Get a mutable validator by id
    pub fn get_mut(&mut self, instance_id: &str) -> Option<&mut Validator> {
        self.by_id.get_mut(instance_id)
    }

    /// Check if the id is registered
    pub fn contains(&self, instance_id: &str) -> bool {
        self.by_id.contains_key(instance_id)
    }

    /// Set the active flag. Returns `false` for unknown ids.
    pub fn set_active(&mut self, instance_id: &str, active: bool) -> bool {
        match self.by_id.get_mut(instance_id) {
            Some(v) => {
                v.is_active = active;
                true
            }
            None => false,
        }
    }

    /// All validators in insertion order
    pub fn all(&self) -> Vec<&Validator> {
        self.order.iter().filter_map(|id| self.by_id.get(id)).collect()
    }

    /// Active validators in insertion order
    pub fn active(&self) -> Vec<&Validator> {
        self.all().into_iter().filter(|v| v.is_active).collect()
    }

    /// Position of `instance_id` within the active list
    pub fn active_position(&self, instance_id: &str) -> Option<usize> {
        self.active().iter().position(|v| v.instance_id == instance_id)
    }

    /// Number of registered validators
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of active validators
    pub fn active_len(&self) -> usize {
        self.by_id.values().filter(|v| v.is_active).count()
    }
}

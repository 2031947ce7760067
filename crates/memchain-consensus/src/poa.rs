//! Proof-of-Authority round-robin scheduler

use memchain_ledger::Ledger;
use memchain_primitives::{SharedClock, MICROS_PER_MILLI};
use memchain_types::Block;
use serde::{Deserialize, Serialize};

use crate::error::{ConsensusError, ConsensusResult};
use crate::types::{default_validators, Validator, ValidatorRegistry};

/// Name reported in `consensus_getStatus`
pub const MECHANISM: &str = "Proof of Authority";

/// Default minimum interval between blocks (ms)
pub const DEFAULT_BLOCK_TIME_MS: u64 = 1000;

/// Consensus configuration
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Minimum time between the head block and the next one (ms)
    pub block_time_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            block_time_ms: DEFAULT_BLOCK_TIME_MS,
        }
    }
}

/// Per-validator line of [`ConsensusInfo`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorStatus {
    /// Validator id
    pub instance_id: String,
    /// Display name
    pub name: String,
    /// Whether it is in the rotation
    pub is_active: bool,
    /// Last sealed block time, epoch micros
    pub last_block_time: Option<i64>,
}

/// Snapshot of scheduler state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusInfo {
    /// Always "Proof of Authority"
    pub mechanism: String,
    /// Minimum inter-block interval
    pub block_time_ms: u64,
    /// Registered validators
    pub total_validators: usize,
    /// Validators in the rotation
    pub active_validators: usize,
    /// Validator holding the current turn
    pub current_validator: Option<String>,
    /// Every validator in registration order
    pub validators: Vec<ValidatorStatus>,
}

/// Round-robin leader schedule over the active validators.
///
/// `pointer` indexes the active list modulo its length. It advances by one
/// after every locally sealed block and is resynchronized to the producer's
/// successor when a block arrives from elsewhere.
#[derive(Debug)]
pub struct ProofOfAuthority {
    config: ConsensusConfig,
    registry: ValidatorRegistry,
    pointer: usize,
    clock: SharedClock,
}

impl ProofOfAuthority {
    /// Create a scheduler over the given validators
    pub fn new(config: ConsensusConfig, validators: Vec<Validator>, clock: SharedClock) -> Self {
        let registry = ValidatorRegistry::from_validators(validators);
        tracing::info!("PoA consensus initialized with {} validators", registry.len());
        Self {
            config,
            registry,
            pointer: 0,
            clock,
        }
    }

    /// Create a scheduler over the four MAGI validators
    pub fn with_default_validators(config: ConsensusConfig, clock: SharedClock) -> Self {
        Self::new(config, default_validators(), clock)
    }

    /// Scheduler configuration
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// The validator registry
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Raw rotation pointer
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Validator holding the current turn
    pub fn current_validator(&self) -> Option<&Validator> {
        let active = self.registry.active();
        if active.is_empty() {
            tracing::error!("No active validators available");
            return None;
        }
        Some(active[self.pointer % active.len()])
    }

    /// Check if `instance_id` holds the current turn
    pub fn is_my_turn(&self, instance_id: &str) -> bool {
        self.current_validator()
            .map(|v| v.instance_id == instance_id)
            .unwrap_or(false)
    }

    /// Turn held, block interval elapsed and work pending
    pub fn can_create_block(&self, ledger: &Ledger, instance_id: &str) -> bool {
        if !self.is_my_turn(instance_id) {
            return false;
        }
        if let Some(head) = ledger.head() {
            let elapsed = self.clock.now_micros() - head.timestamp_micros;
            let interval = i64::try_from(self.config.block_time_ms)
                .unwrap_or(i64::MAX)
                .saturating_mul(MICROS_PER_MILLI);
            if elapsed < interval {
                return false;
            }
        }
        ledger.pending_len() > 0
    }

    /// Seal a block as `instance_id` if it may do so now.
    ///
    /// Returns `Ok(None)` when not authorized yet. The block is not appended
    /// here; the caller passes it to `Ledger::add_block`.
    pub fn create_block(&mut self, ledger: &mut Ledger, instance_id: &str) -> ConsensusResult<Option<Block>> {
        if !self.can_create_block(ledger, instance_id) {
            return Ok(None);
        }

        let block = ledger.create_block(None, Some(instance_id))?;
        let validator = self
            .registry
            .get_mut(instance_id)
            .ok_or_else(|| ConsensusError::NotValidator(instance_id.to_string()))?;
        validator.last_block_time = Some(block.timestamp_micros);
        self.pointer = self.pointer.wrapping_add(1);

        tracing::info!("Validator {} created block {}", instance_id, block.index);
        Ok(Some(block))
    }

    /// Check that the block's validator is registered and active
    pub fn check_block_authority(&self, block: &Block) -> ConsensusResult<()> {
        match self.registry.get(&block.validator) {
            None => Err(ConsensusError::NotValidator(block.validator.clone())),
            Some(v) if !v.is_active => Err(ConsensusError::InactiveValidator(block.validator.clone())),
            Some(_) => Ok(()),
        }
    }

    /// True if the block was sealed by an active validator
    pub fn validate_block_authority(&self, block: &Block) -> bool {
        match self.check_block_authority(block) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Block {} authority check failed: {}", block.index, e);
                false
            }
        }
    }

    /// Accept a block produced elsewhere.
    ///
    /// On success the producer's `last_block_time` is updated and the pointer
    /// moves to the producer's successor in the active list.
    pub fn handle_new_block(&mut self, ledger: &mut Ledger, block: Block) -> bool {
        if !self.validate_block_authority(&block) {
            return false;
        }

        let producer = block.validator.clone();
        let timestamp = block.timestamp_micros;
        if !ledger.add_block(block) {
            return false;
        }

        if let Some(v) = self.registry.get_mut(&producer) {
            v.last_block_time = Some(timestamp);
        }
        match self.registry.active_position(&producer) {
            Some(pos) => {
                self.pointer = pos + 1;
                tracing::debug!("Synced validator pointer to {} after block from {}", self.pointer, producer);
            }
            None => tracing::warn!("Could not sync validator pointer for {}", producer),
        }
        true
    }

    /// Register a validator. Returns `false` if the id exists.
    pub fn add_validator(&mut self, validator: Validator) -> bool {
        let id = validator.instance_id.clone();
        let name = validator.name.clone();
        if !self.registry.add(validator) {
            tracing::warn!("Validator {} already exists", id);
            return false;
        }
        tracing::info!("Added validator {} ({})", id, name);
        true
    }

    /// Take a validator out of the rotation. Returns `false` if unknown.
    pub fn remove_validator(&mut self, instance_id: &str) -> bool {
        if !self.registry.set_active(instance_id, false) {
            tracing::warn!("Validator {} not found", instance_id);
            return false;
        }
        tracing::info!("Deactivated validator {}", instance_id);
        true
    }

    /// Put a deactivated validator back into the rotation
    pub fn reactivate_validator(&mut self, instance_id: &str) -> bool {
        if !self.registry.set_active(instance_id, true) {
            tracing::warn!("Validator {} not found", instance_id);
            return false;
        }
        tracing::info!("Reactivated validator {}", instance_id);
        true
    }

    /// Snapshot for status queries
    pub fn consensus_info(&self) -> ConsensusInfo {
        ConsensusInfo {
            mechanism: MECHANISM.to_string(),
            block_time_ms: self.config.block_time_ms,
            total_validators: self.registry.len(),
            active_validators: self.registry.active_len(),
            current_validator: self.current_validator().map(|v| v.instance_id.clone()),
            validators: self
                .registry
                .all()
                .into_iter()
                .map(|v| ValidatorStatus {
                    instance_id: v.instance_id.clone(),
                    name: v.name.clone(),
                    is_active: v.is_active,
                    last_block_time: v.last_block_time,
                })
                .collect(),
        }
    }
}

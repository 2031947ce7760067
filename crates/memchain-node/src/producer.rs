//! Block producer: the periodic consensus tick.
//!
//! Every poll interval the producer asks the chain to seal a block. A sealed
//! block is handed to the transport and periodically snapshotted. Errors are
//! logged and followed by a back-off; the loop only ends on shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use memchain_core::{Block, SealOutcome, SharedChain};
use tokio::sync::watch;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::config::ProducerConfig;
use crate::node::{wait_for_shutdown, NodeResult};
use crate::transport::BlockTransport;

/// Drives `try_seal_block` on a timer
pub struct BlockProducer {
    chain: SharedChain,
    config: ProducerConfig,
    transport: Arc<dyn BlockTransport>,
    snapshot_path: PathBuf,
}

impl BlockProducer {
    /// Create a producer for `chain`
    pub fn new(
        chain: SharedChain,
        config: ProducerConfig,
        transport: Arc<dyn BlockTransport>,
        snapshot_path: PathBuf,
    ) -> Self {
        Self {
            chain,
            config,
            transport,
            snapshot_path,
        }
    }

    /// Run until `shutdown` flips to true, then save a final snapshot
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Block producer started (poll {:?}, backoff {:?})",
            self.config.poll_interval,
            self.config.error_backoff
        );
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick() {
                        tracing::error!("Block production error: {}", e);
                        tokio::select! {
                            _ = sleep(self.config.error_backoff) => {}
                            _ = wait_for_shutdown(shutdown.clone()) => break,
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Block producer stopping");
        if let Err(e) = self.save_snapshot() {
            tracing::error!("Failed to save snapshot on shutdown: {}", e);
        }
    }

    /// One sealing attempt; returns the block if one was appended
    pub fn tick(&self) -> NodeResult<Option<Block>> {
        let outcome = self.chain.write().try_seal_block()?;
        match outcome {
            SealOutcome::Sealed(block) => {
                tracing::info!(
                    "Sealed block {} with {} transactions",
                    block.index,
                    block.tx_count()
                );
                self.transport.broadcast(&block);
                if self.config.snapshot_every > 0 && block.index % self.config.snapshot_every == 0 {
                    self.save_snapshot()?;
                }
                Ok(Some(block))
            }
            SealOutcome::Rejected(block) => {
                tracing::warn!("Sealed block {} was rejected by the ledger", block.index);
                Ok(None)
            }
            SealOutcome::NotMyTurn | SealOutcome::Idle => Ok(None),
        }
    }

    fn save_snapshot(&self) -> NodeResult<()> {
        self.chain.read().save_snapshot(&self.snapshot_path)?;
        Ok(())
    }
}

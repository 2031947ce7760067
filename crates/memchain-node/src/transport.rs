//! Outbound block propagation hook

use memchain_core::Block;

/// Sends locally sealed blocks to peers.
///
/// Inbound blocks go through `MemoryChain::handle_new_block`.
pub trait BlockTransport: Send + Sync {
    /// Announce a freshly sealed block
    fn broadcast(&self, block: &Block);
}

/// Transport that only logs; peer propagation is not wired up
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTransport;

impl BlockTransport for LoggingTransport {
    fn broadcast(&self, block: &Block) {
        tracing::info!(
            "Block {} ({} txs, hash {}) ready for broadcast",
            block.index,
            block.tx_count(),
            block.block_hash
        );
    }
}

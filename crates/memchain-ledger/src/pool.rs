//! Pending transaction pool

use memchain_types::Transaction;
use std::collections::{HashMap, VecDeque};

/// FIFO queue of pending transactions plus a lookup index.
///
/// Draining a batch only removes it from the queue; the index keeps the
/// transactions until the block carrying them is appended, so lookups keep
/// working while a block is in flight.
#[derive(Debug, Default)]
pub struct PendingPool {
    queue: VecDeque<Transaction>,
    index: HashMap<String, Transaction>,
}

impl PendingPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction to the back of the queue
    pub fn push(&mut self, tx: Transaction) {
        self.index.insert(tx.tx_id.clone(), tx.clone());
        self.queue.push_back(tx);
    }

    /// Take up to `limit` oldest transactions off the queue
    pub fn drain(&mut self, limit: usize) -> Vec<Transaction> {
        let n = limit.min(self.queue.len());
        self.queue.drain(..n).collect()
    }

    /// Put a drained batch back at the front, preserving its order.
    ///
    /// Only transactions still present in the index and not already queued
    /// are restored. Returns the number restored.
    pub fn requeue(&mut self, txs: &[Transaction]) -> usize {
        let mut restored = 0;
        for tx in txs.iter().rev() {
            if !self.index.contains_key(&tx.tx_id) {
                continue;
            }
            if self.queue.iter().any(|q| q.tx_id == tx.tx_id) {
                continue;
            }
            self.queue.push_front(tx.clone());
            restored += 1;
        }
        restored
    }

    /// Forget transactions that were included in an appended block
    pub fn remove_included<'a, I>(&mut self, tx_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for tx_id in tx_ids {
            if self.index.remove(tx_id).is_some() {
                self.queue.retain(|tx| tx.tx_id != tx_id);
            }
        }
    }

    /// Look up a transaction by id
    pub fn get(&self, tx_id: &str) -> Option<&Transaction> {
        self.index.get(tx_id)
    }

    /// Number of queued transactions
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of indexed transactions (queued or in flight)
    pub fn indexed_len(&self) -> usize {
        self.index.len()
    }

    /// Queued transaction ids in order
    pub fn pending_ids(&self) -> Vec<String> {
        self.queue.iter().map(|tx| tx.tx_id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memchain_types::DataMap;

    fn tx(n: i64) -> Transaction {
        Transaction::new("op", DataMap::new(), n, "T")
    }

    #[test]
    fn test_fifo_drain() {
        let mut pool = PendingPool::new();
        for i in 0..5 {
            pool.push(tx(i));
        }
        let batch = pool.drain(3);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].timestamp_micros, 0);
        assert_eq!(batch[2].timestamp_micros, 2);
        assert_eq!(pool.len(), 2);
        // drained transactions stay indexed
        assert_eq!(pool.indexed_len(), 5);
        assert!(pool.get(&batch[0].tx_id).is_some());
    }

    #[test]
    fn test_drain_more_than_available() {
        let mut pool = PendingPool::new();
        pool.push(tx(1));
        assert_eq!(pool.drain(10).len(), 1);
        assert!(pool.is_empty());
        assert!(pool.drain(10).is_empty());
    }

    #[test]
    fn test_remove_included() {
        let mut pool = PendingPool::new();
        let a = tx(1);
        let b = tx(2);
        pool.push(a.clone());
        pool.push(b.clone());
        pool.remove_included([a.tx_id.as_str()]);
        assert!(pool.get(&a.tx_id).is_none());
        assert_eq!(pool.pending_ids(), vec![b.tx_id]);
    }

    #[test]
    fn test_requeue_restores_front_in_order() {
        let mut pool = PendingPool::new();
        for i in 0..4 {
            pool.push(tx(i));
        }
        let batch = pool.drain(2);
        assert_eq!(pool.requeue(&batch), 2);
        let ids = pool.pending_ids();
        assert_eq!(ids[0], batch[0].tx_id);
        assert_eq!(ids[1], batch[1].tx_id);
        assert_eq!(ids.len(), 4);

        // already queued: no duplicates
        assert_eq!(pool.requeue(&batch), 0);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_requeue_skips_included() {
        let mut pool = PendingPool::new();
        pool.push(tx(1));
        let batch = pool.drain(1);
        pool.remove_included([batch[0].tx_id.as_str()]);
        assert_eq!(pool.requeue(&batch), 0);
        assert!(pool.is_empty());
    }
}

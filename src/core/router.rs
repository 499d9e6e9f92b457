//! Sender-based shard routing
//!
//! Every transfer is routed by its sender's id, so all transfers leaving one
//! account land on the same shard and are applied by the same worker in
//! submission order. That is what makes debits safe without a per-sender
//! ordering protocol: no two workers ever debit the same account concurrently.

use crate::types::AccountId;

/// Maps a sender id to a shard index in `[0, shard_count)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRouter {
    shard_count: usize,
}

impl ShardRouter {
    /// Create a router over `shard_count` shards
    ///
    /// # Panics
    ///
    /// Panics if `shard_count` is zero. `EngineConfig` never produces zero.
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard count must be positive");
        Self { shard_count }
    }

    /// Shard index for a transfer sent from `from`
    pub fn shard(&self, from: AccountId) -> usize {
        (from % self.shard_count as u64) as usize
    }

    /// Number of shards routed over
    pub fn shard_count(&self) -> usize {
        self.shard_count
    }
}

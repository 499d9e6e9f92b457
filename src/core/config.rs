//! Engine configuration
//!
//! Shard count and queue capacity are fixed when the engine is built. The
//! defaults mirror a small deployment: a quarter of the available cores with
//! a floor of two shards, and 20 000 pending transfers per shard.

use tracing::warn;

/// Smallest shard count the engine runs with
pub const MIN_SHARDS: usize = 2;

/// Default bound on pending transfers per shard
pub const DEFAULT_QUEUE_CAPACITY: usize = 20_000;

/// Configuration for the transaction engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of shards, and therefore worker threads
    pub shard_count: usize,
    /// Maximum pending transfers per shard before submitters block
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shard_count: (num_cpus::get() / 4).max(MIN_SHARDS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Create an EngineConfig with custom values
    ///
    /// A zero in either field falls back to the default; shard counts below
    /// [`MIN_SHARDS`] are raised to it. Each correction is logged.
    pub fn new(shard_count: usize, queue_capacity: usize) -> Self {
        let default = Self::default();

        let shard_count = if shard_count == 0 {
            warn!(
                requested = shard_count,
                fallback = default.shard_count,
                "invalid shard count, using default"
            );
            default.shard_count
        } else if shard_count < MIN_SHARDS {
            warn!(
                requested = shard_count,
                fallback = MIN_SHARDS,
                "shard count below minimum, raising"
            );
            MIN_SHARDS
        } else {
            shard_count
        };

        let queue_capacity = if queue_capacity == 0 {
            warn!(
                requested = queue_capacity,
                fallback = default.queue_capacity,
                "invalid queue capacity, using default"
            );
            default.queue_capacity
        } else {
            queue_capacity
        };

        Self {
            shard_count,
            queue_capacity,
        }
    }
}

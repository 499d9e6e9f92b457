//! Core business logic module
//!
//! This module contains the sharded transfer processing components:
//! - `account_store` - Concurrent account records with per-account locks
//! - `router` - Sender-based shard selection
//! - `status_log` - Drain-on-read outcome buffer
//! - `worker` - One consumer thread per shard and the transfer algorithm
//! - `engine` - Admission checks, routing, and worker lifecycle
//! - `config` - Shard count and queue capacity

pub mod account_store;
pub mod config;
pub mod engine;
pub mod router;
pub mod status_log;
mod worker;

pub use account_store::AccountStore;
pub use config::{EngineConfig, DEFAULT_QUEUE_CAPACITY, MIN_SHARDS};
pub use engine::TransactionEngine;
pub use router::ShardRouter;
pub use status_log::StatusLog;

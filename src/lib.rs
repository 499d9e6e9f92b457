//! Sharded In-Memory Ledger
//!
//! # Overview
//!
//! Money transfers between accounts are applied by a fixed pool of shard
//! workers. A transfer is routed by its sender, so all transfers from one
//! account run on one worker, in submission order. Submission validates the
//! request and returns immediately; the final result of each transfer is
//! recorded as an outcome in a shared status log.
//!
//! # Architecture
//!
//! - [`types`] - Accounts, transfer requests, outcomes and errors
//! - [`core`] - The engine:
//!   - [`core::engine`] - Submission, routing and worker lifecycle
//!   - [`core::account_store`] - Concurrent account map with per-account locks
//!   - [`core::router`] - Sender to shard mapping
//!   - [`core::status_log`] - Append-only outcome log with atomic drain
//!   - [`core::config`] - Shard count and queue capacity
//! - [`io`] - CSV input and output, field validation
//! - [`cli`] - Argument parsing and logging setup
//! - [`runner`] - Batch driver used by the `ledger` binary
//!
//! # Outcomes
//!
//! - **SUCCESS**: the amount moved from sender to receiver
//! - **FAILED**: the sender no longer had enough funds at execution time
//! - **SYSTEM_ERROR**: the request or the account data was inconsistent
//!   (missing account, corrupted balance, arithmetic overflow)
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use sharded_ledger::{EngineConfig, TransactionEngine, TransferRequest};
//!
//! let engine = TransactionEngine::with_config(EngineConfig::new(2, 16)).unwrap();
//! engine.create_account(1, Decimal::from(1000)).unwrap();
//! engine.create_account(2, Decimal::from(2000)).unwrap();
//!
//! engine.submit(TransferRequest::new(1, 2, Decimal::from(100))).unwrap();
//! let statuses = engine.status_log();
//! engine.shutdown().unwrap();
//!
//! assert_eq!(statuses.drain().len(), 1);
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod runner;
pub mod types;

pub use core::{AccountStore, EngineConfig, ShardRouter, StatusLog, TransactionEngine};
pub use io::{write_accounts_csv, write_outcomes_csv};
pub use types::{
    Account, AccountError, AccountId, LedgerError, SubmissionError, TransferId, TransferOutcome,
    TransferRequest, TransferStatus,
};

//! Transaction engine: admission, routing and worker lifecycle
//!
//! This module provides the `TransactionEngine` struct, the facade callers use
//! to submit transfers, read outcomes and manage accounts.
//!
//! # Architecture
//!
//! ```text
//! TransactionEngine
//!     ├── ShardRouter                      (from_id mod N)
//!     ├── Vec<mpsc::Sender>                (one bounded queue per shard)
//!     ├── Vec<JoinHandle>                  (one worker thread per shard)
//!     ├── Arc<AccountStore>                (shared with workers and readers)
//!     └── Arc<StatusLog>                   (written by workers, drained by callers)
//! ```
//!
//! # Two-phase checking
//!
//! `submit` checks the request against the store before queueing it, so
//! obviously invalid transfers get a synchronous error and never reach a
//! worker. Balances can move between submission and execution, so the worker
//! checks funds again; that second result arrives through the status log.
//!
//! # Thread Safety
//!
//! All methods take `&self`; the engine can be shared by reference (or `Arc`)
//! between any number of submitting threads.

use std::sync::Arc;
use std::thread::JoinHandle;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::account_store::AccountStore;
use super::config::EngineConfig;
use super::router::ShardRouter;
use super::status_log::StatusLog;
use super::worker::ShardWorker;
use crate::types::{
    Account, AccountError, AccountId, LedgerError, SubmissionError, TransferOutcome,
    TransferRequest,
};

/// Sharded transfer engine
///
/// Workers start in [`TransactionEngine::new`] and run until
/// [`TransactionEngine::shutdown`] (or until the engine is dropped, after
/// which they finish whatever is still queued and exit on their own).
#[derive(Debug)]
pub struct TransactionEngine {
    config: EngineConfig,
    router: ShardRouter,
    queues: Vec<mpsc::Sender<TransferRequest>>,
    workers: Vec<JoinHandle<()>>,
    accounts: Arc<AccountStore>,
    statuses: Arc<StatusLog>,
}

impl TransactionEngine {
    /// Create an engine over an existing store and status log
    ///
    /// Spawns one worker thread per configured shard. The configuration is
    /// passed through [`EngineConfig::new`] first, so a hand-built config with
    /// zero or one shard, or a zero queue capacity, is corrected rather than
    /// panicking.
    ///
    /// # Returns
    ///
    /// * `Ok(TransactionEngine)` with all workers running
    /// * `Err(LedgerError::WorkerSpawn)` if a worker thread could not start;
    ///   workers already started stop once their queues are dropped
    pub fn new(
        config: EngineConfig,
        accounts: Arc<AccountStore>,
        statuses: Arc<StatusLog>,
    ) -> Result<Self, LedgerError> {
        let config = EngineConfig::new(config.shard_count, config.queue_capacity);
        let router = ShardRouter::new(config.shard_count);
        let mut queues = Vec::with_capacity(config.shard_count);
        let mut workers = Vec::with_capacity(config.shard_count);

        for shard in 0..config.shard_count {
            let (sender, receiver) = mpsc::channel(config.queue_capacity);
            let worker =
                ShardWorker::new(shard, receiver, Arc::clone(&accounts), Arc::clone(&statuses));
            workers.push(worker.spawn()?);
            queues.push(sender);
        }

        info!(
            shards = config.shard_count,
            queue_capacity = config.queue_capacity,
            "transaction engine started"
        );

        Ok(Self {
            config,
            router,
            queues,
            workers,
            accounts,
            statuses,
        })
    }

    /// Create an engine with a fresh, empty store and status log
    pub fn with_config(config: EngineConfig) -> Result<Self, LedgerError> {
        Self::new(
            config,
            Arc::new(AccountStore::new()),
            Arc::new(StatusLog::new()),
        )
    }

    /// Submit a transfer, blocking while its shard's queue is full
    ///
    /// Returns as soon as the transfer is queued; its outcome shows up later
    /// in [`TransactionEngine::drain_statuses`]. Rejected transfers are never
    /// queued and never produce an outcome.
    ///
    /// This blocks the calling thread and must not be called from inside an
    /// async runtime; use [`TransactionEngine::submit_async`] there.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the transfer was queued
    /// * `Err(SubmissionError)` if it was rejected (see [`SubmissionError`])
    pub fn submit(&self, request: TransferRequest) -> Result<(), SubmissionError> {
        let shard = self.admit(&request)?;

        self.queues[shard]
            .blocking_send(request)
            .map_err(|_| SubmissionError::ShardClosed { shard })
    }

    /// Submit a transfer, awaiting free capacity in its shard's queue
    ///
    /// Same checks and guarantees as [`TransactionEngine::submit`].
    pub async fn submit_async(&self, request: TransferRequest) -> Result<(), SubmissionError> {
        let shard = self.admit(&request)?;

        self.queues[shard]
            .send(request)
            .await
            .map_err(|_| SubmissionError::ShardClosed { shard })
    }

    /// Submission-time checks; returns the target shard
    fn admit(&self, request: &TransferRequest) -> Result<usize, SubmissionError> {
        let result = self.check_admissible(request);

        match &result {
            Ok(shard) => debug!(%request, shard, "transfer admitted"),
            Err(e) => debug!(%request, error = %e, "transfer rejected"),
        }

        result
    }

    fn check_admissible(&self, request: &TransferRequest) -> Result<usize, SubmissionError> {
        if request.from == request.to {
            return Err(SubmissionError::SelfTransfer { id: request.from });
        }
        if request.amount <= Decimal::ZERO {
            return Err(SubmissionError::InvalidAmount {
                amount: request.amount,
            });
        }

        let sender = self
            .accounts
            .lookup(request.from)
            .ok_or(SubmissionError::SenderNotFound { id: request.from })?;

        if sender.balance < request.amount {
            return Err(SubmissionError::insufficient_funds(
                sender.id,
                sender.balance,
                request.amount,
            ));
        }

        if !self.accounts.contains(request.to) {
            return Err(SubmissionError::ReceiverNotFound { id: request.to });
        }

        Ok(self.router.shard(request.from))
    }

    /// Take every outcome recorded since the previous drain
    pub fn drain_statuses(&self) -> Vec<TransferOutcome> {
        self.statuses.drain()
    }

    /// Snapshot of one account
    pub fn lookup_account(&self, id: AccountId) -> Option<Account> {
        self.accounts.lookup(id)
    }

    /// Create an account with a non-negative initial balance
    pub fn create_account(&self, id: AccountId, balance: Decimal) -> Result<(), AccountError> {
        self.accounts.create_account(id, balance)
    }

    /// Remove an account
    ///
    /// Transfers already queued against it complete with a system error.
    pub fn remove_account(&self, id: AccountId) -> Option<Account> {
        self.accounts.remove(id)
    }

    /// All accounts, sorted by id
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.all_accounts()
    }

    /// Shared handle to the account store
    pub fn account_store(&self) -> Arc<AccountStore> {
        Arc::clone(&self.accounts)
    }

    /// Shared handle to the status log
    pub fn status_log(&self) -> Arc<StatusLog> {
        Arc::clone(&self.statuses)
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of shards (and worker threads)
    pub fn shard_count(&self) -> usize {
        self.router.shard_count()
    }

    /// Shard a transfer from `from` is routed to
    pub fn shard_for(&self, from: AccountId) -> usize {
        self.router.shard(from)
    }

    /// Transfers waiting in each shard's queue, by shard index
    pub fn queue_depths(&self) -> Vec<usize> {
        self.queues
            .iter()
            .map(|queue| queue.max_capacity() - queue.capacity())
            .collect()
    }

    /// Stop accepting transfers and wait for the workers to finish
    ///
    /// Everything queued before this call is still processed, so once it
    /// returns the status log holds an outcome for every admitted transfer.
    ///
    /// # Returns
    ///
    /// * `Ok(())` when every worker exited cleanly
    /// * `Err(LedgerError::WorkerPanicked)` for the first worker that panicked
    pub fn shutdown(self) -> Result<(), LedgerError> {
        let Self {
            queues, workers, ..
        } = self;

        drop(queues);

        let mut result = Ok(());
        for (shard, worker) in workers.into_iter().enumerate() {
            if worker.join().is_err() {
                error!(shard, "worker panicked");
                if result.is_ok() {
                    result = Err(LedgerError::WorkerPanicked { shard });
                }
            }
        }

        info!("transaction engine stopped");
        result
    }
}

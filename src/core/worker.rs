//! Shard workers
//!
//! One worker thread per shard. A worker is the only consumer of its shard's
//! queue, so transfers from one sender are applied strictly in the order they
//! were submitted.
//!
//! # Per-transfer algorithm
//!
//! 1. Resolve sender and receiver records; a missing one is a system error
//! 2. Lock both records, then make sure neither was removed meanwhile and
//!    neither balance is negative
//! 3. Funds check against the balance at execution time
//! 4. Debit and credit under both account locks, with checked arithmetic
//!
//! `execute_transfer` also rejects a self-transfer or a non-positive amount
//! as a system error before step 1. The engine refuses both at submission,
//! so for queued requests these checks never fire.
//!
//! Every path yields exactly one outcome, and no path panics or stops the
//! worker: a bad transfer is recorded and the loop moves on.

use super::account_store::{AccountRecord, AccountStore};
use super::status_log::StatusLog;
use crate::types::{LedgerError, TransferOutcome, TransferRequest, TransferStatus};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Consumer side of one shard
pub(crate) struct ShardWorker {
    shard: usize,
    queue: mpsc::Receiver<TransferRequest>,
    accounts: Arc<AccountStore>,
    statuses: Arc<StatusLog>,
}

impl ShardWorker {
    pub(crate) fn new(
        shard: usize,
        queue: mpsc::Receiver<TransferRequest>,
        accounts: Arc<AccountStore>,
        statuses: Arc<StatusLog>,
    ) -> Self {
        Self {
            shard,
            queue,
            accounts,
            statuses,
        }
    }

    /// Start the worker on its own named thread
    pub(crate) fn spawn(self) -> Result<JoinHandle<()>, LedgerError> {
        let shard = self.shard;

        thread::Builder::new()
            .name(format!("transfer-shard-{}", shard))
            .spawn(move || self.run())
            .map_err(|e| LedgerError::WorkerSpawn {
                shard,
                message: e.to_string(),
            })
    }

    /// Process transfers until every sender for this shard is dropped
    ///
    /// The blocking receive is the loop's only suspension point. Transfers
    /// still queued when the senders go away are processed before exiting.
    fn run(mut self) {
        debug!(shard = self.shard, "worker started");

        while let Some(request) = self.queue.blocking_recv() {
            debug!(shard = self.shard, %request, "dequeued");

            let outcome = execute_transfer(&self.accounts, &request);
            match outcome.status {
                TransferStatus::Success => {}
                TransferStatus::Failed => warn!(
                    shard = self.shard,
                    transfer = %request.transfer_id,
                    detail = outcome.detail.as_deref().unwrap_or_default(),
                    "transfer failed"
                ),
                TransferStatus::SystemError => error!(
                    shard = self.shard,
                    transfer = %request.transfer_id,
                    detail = outcome.detail.as_deref().unwrap_or_default(),
                    "transfer hit a system error"
                ),
            }

            self.statuses.append(outcome);
        }

        debug!(shard = self.shard, "queue closed, worker stopping");
    }
}

/// Apply one transfer to the store and describe what happened
pub(crate) fn execute_transfer(accounts: &AccountStore, request: &TransferRequest) -> TransferOutcome {
    let id = request.transfer_id;

    // Unreachable through `TransactionEngine::submit`
    if request.from == request.to {
        return TransferOutcome::system_error(
            id,
            format!("account {} is both sender and receiver", request.from),
        );
    }
    if request.amount <= Decimal::ZERO {
        return TransferOutcome::system_error(
            id,
            format!("non-positive amount {}", request.amount),
        );
    }

    let Some(sender) = accounts.record(request.from) else {
        return TransferOutcome::system_error(
            id,
            format!("sender account {} does not exist", request.from),
        );
    };
    let Some(receiver) = accounts.record(request.to) else {
        return TransferOutcome::system_error(
            id,
            format!("receiver account {} does not exist", request.to),
        );
    };

    let (mut sender_balance, mut receiver_balance) = AccountRecord::lock_pair(&sender, &receiver);

    // Removed while we were waiting for the locks
    for record in [&sender, &receiver] {
        if !accounts.is_live(record) {
            return TransferOutcome::system_error(
                id,
                format!("account {} was removed before execution", record.id()),
            );
        }
    }

    if *sender_balance < Decimal::ZERO || *receiver_balance < Decimal::ZERO {
        return TransferOutcome::system_error(
            id,
            format!(
                "data has been corrupted: account {} holds {}, account {} holds {}",
                sender.id(),
                *sender_balance,
                receiver.id(),
                *receiver_balance
            ),
        );
    }

    let Some(remaining) = sender_balance.checked_sub(request.amount) else {
        return TransferOutcome::system_error(
            id,
            format!("arithmetic overflow debiting account {}", request.from),
        );
    };
    if remaining < Decimal::ZERO {
        return TransferOutcome::failed(
            id,
            format!(
                "insufficient funds at execution time: account {} holds {}, requested {}",
                request.from, *sender_balance, request.amount
            ),
        );
    }

    let Some(credited) = receiver_balance.checked_add(request.amount) else {
        return TransferOutcome::system_error(
            id,
            format!("arithmetic overflow crediting account {}", request.to),
        );
    };

    *sender_balance = remaining;
    *receiver_balance = credited;

    TransferOutcome::success(id)
}

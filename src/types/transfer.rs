//! Transfer-related types for the ledger
//!
//! This module defines the transfer request that flows through the shard
//! queues and the outcome a worker records once it has processed one.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Transfer identifier
///
/// Assigned when the request is built and used to correlate a submission
/// with its outcome.
pub type TransferId = Uuid;

/// A request to move `amount` from one account to another
///
/// Immutable once built. It is moved into a shard queue on submission and
/// moved out again by the worker that owns that shard.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    /// Correlation key between the submission and its outcome
    pub transfer_id: TransferId,

    /// Sender account (the routing key)
    pub from: AccountId,

    /// Receiver account
    pub to: AccountId,

    /// Amount to move; expected to be strictly positive
    pub amount: Decimal,
}

impl TransferRequest {
    /// Create a transfer request with a freshly generated id
    pub fn new(from: AccountId, to: AccountId, amount: Decimal) -> Self {
        Self::with_id(Uuid::new_v4(), from, to, amount)
    }

    /// Create a transfer request with a caller-supplied id
    pub fn with_id(transfer_id: TransferId, from: AccountId, to: AccountId, amount: Decimal) -> Self {
        TransferRequest {
            transfer_id,
            from,
            to,
            amount,
        }
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transfer {} ({} -> {}, amount {})",
            self.transfer_id, self.from, self.to, self.amount
        )
    }
}

/// Terminal status of a processed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    /// Both balances were updated
    Success,

    /// The sender no longer had enough funds when the worker got to it
    Failed,

    /// State the engine cannot trust (missing account, corrupted balance,
    /// arithmetic overflow); nothing was mutated
    SystemError,
}

impl TransferStatus {
    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Failed => "FAILED",
            TransferStatus::SystemError => "SYSTEM_ERROR",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result recorded by a worker for one transfer
///
/// Exactly one outcome exists per admitted transfer. It lives in the status
/// log until a drain hands it to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    /// Id of the transfer this outcome belongs to
    pub transfer_id: TransferId,

    /// Terminal status
    pub status: TransferStatus,

    /// Human readable reason for non-success outcomes
    pub detail: Option<String>,

    /// When the worker finished processing the transfer
    pub timestamp: DateTime<Utc>,
}

impl TransferOutcome {
    /// Outcome for an applied transfer
    pub fn success(transfer_id: TransferId) -> Self {
        Self::new(transfer_id, TransferStatus::Success, None)
    }

    /// Outcome for a transfer rejected at execution time
    pub fn failed(transfer_id: TransferId, detail: impl Into<String>) -> Self {
        Self::new(transfer_id, TransferStatus::Failed, Some(detail.into()))
    }

    /// Outcome for a transfer that hit untrusted state
    pub fn system_error(transfer_id: TransferId, detail: impl Into<String>) -> Self {
        Self::new(transfer_id, TransferStatus::SystemError, Some(detail.into()))
    }

    fn new(transfer_id: TransferId, status: TransferStatus, detail: Option<String>) -> Self {
        TransferOutcome {
            transfer_id,
            status,
            detail,
            timestamp: Utc::now(),
        }
    }

    /// Whether the transfer was applied
    pub fn is_success(&self) -> bool {
        self.status == TransferStatus::Success
    }
}

//! Error types for the ledger
//!
//! This module defines every error the crate reports to a caller.
//!
//! # Error Categories
//!
//! - **Submission errors**: returned synchronously by `submit`; the transfer is
//!   never queued and never produces an outcome
//! - **Account errors**: returned by account creation
//! - **Ledger errors**: boundary failures (files, CSV, worker threads)
//!
//! Execution-time failures are not errors: they are recorded as outcomes in
//! the status log.

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a transfer is refused at submission time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    /// The sending account does not exist
    #[error("The sender account {id} was not found")]
    SenderNotFound {
        /// Sender id from the request
        id: AccountId,
    },

    /// The sender's balance is below the amount at submission time
    ///
    /// The balance is checked again by the worker, since it can change
    /// between submission and execution.
    #[error("Insufficient funds for account {id}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Sender id
        id: AccountId,
        /// Sender balance observed at submission
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// The receiving account does not exist
    #[error("The receiver account {id} was not found")]
    ReceiverNotFound {
        /// Receiver id from the request
        id: AccountId,
    },

    /// Sender and receiver are the same account
    #[error("Account {id} cannot transfer to itself")]
    SelfTransfer {
        /// The account on both sides
        id: AccountId,
    },

    /// The amount is zero or negative
    #[error("Invalid transfer amount {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: Decimal,
    },

    /// The shard's worker is gone and its queue no longer accepts work
    #[error("Shard {shard} is no longer accepting transfers")]
    ShardClosed {
        /// Index of the closed shard
        shard: usize,
    },
}

impl SubmissionError {
    /// Create an InsufficientFunds error
    pub fn insufficient_funds(id: AccountId, available: Decimal, requested: Decimal) -> Self {
        SubmissionError::InsufficientFunds {
            id,
            available,
            requested,
        }
    }
}

/// Errors from account creation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccountError {
    /// An account with this id is already present
    #[error("Account {id} already exists")]
    AlreadyExists {
        /// Conflicting id
        id: AccountId,
    },

    /// Initial balances must be zero or positive
    #[error("Initial balance {balance} for account {id} is negative")]
    NegativeBalance {
        /// Requested id
        id: AccountId,
        /// Requested initial balance
        balance: Decimal,
    },
}

/// Errors raised by the boundary layer and engine lifecycle
///
/// Fatal for the command-line driver: it prints the error and exits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Input file not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading or writing
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A worker thread could not be started
    #[error("Failed to start worker for shard {shard}: {message}")]
    WorkerSpawn {
        /// Shard whose worker failed to start
        shard: usize,
        /// Reason reported by the OS
        message: String,
    },

    /// A worker thread panicked
    #[error("Worker for shard {shard} panicked")]
    WorkerPanicked {
        /// Shard whose worker panicked
        shard: usize,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account snapshot and identifier
//! - `transfer`: Transfer requests, statuses and outcomes
//! - `error`: Error types for submission, accounts and the boundary layer

pub mod account;
pub mod error;
pub mod transfer;

pub use account::{Account, AccountId};
pub use error::{AccountError, LedgerError, SubmissionError};
pub use transfer::{TransferId, TransferOutcome, TransferRequest, TransferStatus};

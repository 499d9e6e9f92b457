//! Structural request validation
//!
//! The checks a request handler performs before anything reaches the engine:
//! amounts must be positive, a transfer needs two distinct accounts, and new
//! accounts cannot start below zero. The engine runs its own transfer checks
//! too, but callers get the friendlier messages from here.

use crate::types::AccountId;
use rust_decimal::Decimal;

/// Malformed or missing field
pub const INCORRECT_DATA: &str = "Incorrect data";

/// Transfer whose sender and receiver are the same
pub const SELF_TRANSFER: &str = "You can't send yourself";

/// New account with a negative balance
pub const NEGATIVE_BALANCE: &str = "Balance less than 0.0";

/// Validate the fields of a transfer request
///
/// # Returns
///
/// * `Ok(())` if the amount is positive and the accounts differ
/// * `Err(&'static str)` with the rejection message otherwise
pub fn validate_transfer(from: AccountId, to: AccountId, amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err(INCORRECT_DATA);
    }
    if from == to {
        return Err(SELF_TRANSFER);
    }
    Ok(())
}

/// Validate the fields of a new account
pub fn validate_new_account(balance: Decimal) -> Result<(), &'static str> {
    if balance < Decimal::ZERO {
        return Err(NEGATIVE_BALANCE);
    }
    Ok(())
}

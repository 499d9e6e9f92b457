//! CSV format handling for ledger input and output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for account and transfer input
//! - Conversion from CSV records to domain types (with validation)
//! - Outcome and balance output serialization
//!
//! Conversions are pure (no I/O) for easy testing.
//!
//! # Formats
//!
//! - accounts input: `id,balance`
//! - transfers input: `from,to,amount`
//! - outcomes output: `transfer_id,status,detail,timestamp`
//! - balances output: `id,balance`

use super::validation::{validate_new_account, validate_transfer};
use crate::types::{Account, AccountId, LedgerError, TransferOutcome, TransferRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Account input row
///
/// The balance is kept as a string so a malformed value can be reported
/// with its original text.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub id: AccountId,
    pub balance: String,
}

/// Transfer input row
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferCsvRecord {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: String,
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|_| format!("Invalid {} '{}'", field, value))
}

/// Convert an account row into an account with its initial balance
///
/// # Returns
///
/// * `Ok(Account)` - parsed, non-negative balance
/// * `Err(String)` - unparseable or negative balance
pub fn convert_account_record(record: AccountCsvRecord) -> Result<Account, String> {
    let balance = parse_decimal("balance", &record.balance)?;

    validate_new_account(balance)
        .map_err(|message| format!("{} for account {}", message, record.id))?;

    Ok(Account::new(record.id, balance))
}

/// Convert a transfer row into a transfer request with a fresh id
///
/// # Returns
///
/// * `Ok(TransferRequest)` - positive amount between two distinct accounts
/// * `Err(String)` - unparseable amount or a structural validation failure
pub fn convert_transfer_record(record: TransferCsvRecord) -> Result<TransferRequest, String> {
    let amount = parse_decimal("amount", &record.amount)?;

    validate_transfer(record.from, record.to, amount).map_err(|message| {
        format!(
            "{} (from {} to {}, amount {})",
            message, record.from, record.to, record.amount
        )
    })?;

    Ok(TransferRequest::new(record.from, record.to, amount))
}

/// Write transfer outcomes in CSV format
///
/// Outcomes are written in the order given, which is drain order.
pub fn write_outcomes_csv(
    outcomes: &[TransferOutcome],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["transfer_id", "status", "detail", "timestamp"])?;

    for outcome in outcomes {
        writer.write_record([
            outcome.transfer_id.to_string(),
            outcome.status.to_string(),
            outcome.detail.clone().unwrap_or_default(),
            outcome.timestamp.to_rfc3339(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write account balances in CSV format
///
/// Accounts are sorted by id for deterministic output.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["id", "balance"])?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer.write_record([account.id.to_string(), account.balance.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

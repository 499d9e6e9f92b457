//! Batch driver for the command-line tool
//!
//! Loads the starting accounts, submits every transfer, waits for the shard
//! workers to finish, then reports outcomes and final balances.
//!
//! Reading happens on the calling thread while transfers execute on the
//! shard workers, so a large transfer file is streamed rather than loaded.
//! Row-level problems are logged and counted; only boundary failures
//! (missing file, I/O, a dead worker) abort the run.

use crate::cli::CliArgs;
use crate::core::TransactionEngine;
use crate::io::csv_format::{
    convert_account_record, convert_transfer_record, write_accounts_csv, write_outcomes_csv,
    AccountCsvRecord, TransferCsvRecord,
};
use crate::io::reader::RecordReader;
use crate::types::{LedgerError, TransferStatus};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info, warn};

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub accounts_loaded: usize,
    pub accounts_rejected: usize,
    pub transfers_submitted: usize,
    pub transfers_rejected: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub system_errors: usize,
}

impl RunSummary {
    /// Outcomes recorded by the workers
    pub fn outcomes(&self) -> usize {
        self.succeeded + self.failed + self.system_errors
    }
}

/// Run one batch described by `args`, writing final balances to `output`
///
/// # Returns
///
/// * `Ok(RunSummary)` once every submitted transfer has an outcome
/// * `Err(LedgerError)` if an input file cannot be read, the outcomes file
///   cannot be written, or a worker died
pub fn run(args: &CliArgs, output: &mut dyn Write) -> Result<RunSummary, LedgerError> {
    let engine = TransactionEngine::with_config(args.to_engine_config())?;
    let statuses = engine.status_log();
    let accounts = engine.account_store();
    let mut summary = RunSummary::default();

    load_accounts(&engine, args, &mut summary)?;
    submit_transfers(&engine, args, &mut summary)?;

    // Closing the queues lets every worker finish what is already queued
    engine.shutdown()?;

    let outcomes = statuses.drain();
    for outcome in &outcomes {
        match outcome.status {
            TransferStatus::Success => summary.succeeded += 1,
            TransferStatus::Failed => summary.failed += 1,
            TransferStatus::SystemError => summary.system_errors += 1,
        }
    }

    if let Some(path) = &args.outcomes_file {
        let mut writer = BufWriter::new(File::create(path)?);
        write_outcomes_csv(&outcomes, &mut writer)?;
        writer.flush()?;
        debug!(path = %path.display(), count = outcomes.len(), "wrote transfer outcomes");
    }

    write_accounts_csv(&accounts.all_accounts(), output)?;

    info!(
        accounts_loaded = summary.accounts_loaded,
        accounts_rejected = summary.accounts_rejected,
        transfers_submitted = summary.transfers_submitted,
        transfers_rejected = summary.transfers_rejected,
        succeeded = summary.succeeded,
        failed = summary.failed,
        system_errors = summary.system_errors,
        "run complete"
    );

    Ok(summary)
}

fn load_accounts(
    engine: &TransactionEngine,
    args: &CliArgs,
    summary: &mut RunSummary,
) -> Result<(), LedgerError> {
    let reader = RecordReader::<AccountCsvRecord>::open(&args.accounts_file)?;

    for row in reader {
        let loaded = row.and_then(|(line, record)| {
            let account = convert_account_record(record).map_err(|e| at_line(line, e))?;
            engine
                .create_account(account.id, account.balance)
                .map_err(|e| at_line(line, e))
        });

        match loaded {
            Ok(()) => summary.accounts_loaded += 1,
            Err(message) => {
                warn!(file = %args.accounts_file.display(), "skipping account: {}", message);
                summary.accounts_rejected += 1;
            }
        }
    }

    info!(count = summary.accounts_loaded, "accounts loaded");
    Ok(())
}

fn submit_transfers(
    engine: &TransactionEngine,
    args: &CliArgs,
    summary: &mut RunSummary,
) -> Result<(), LedgerError> {
    let reader = RecordReader::<TransferCsvRecord>::open(&args.transfers_file)?;

    for row in reader {
        let converted = row.and_then(|(line, record)| {
            convert_transfer_record(record).map_err(|e| at_line(line, e))
        });
        let request = match converted {
            Ok(request) => request,
            Err(message) => {
                warn!(file = %args.transfers_file.display(), "skipping transfer: {}", message);
                summary.transfers_rejected += 1;
                continue;
            }
        };

        let transfer_id = request.transfer_id;
        match engine.submit(request) {
            Ok(()) => summary.transfers_submitted += 1,
            Err(e) => {
                debug!(%transfer_id, "transfer rejected: {}", e);
                summary.transfers_rejected += 1;
            }
        }
    }

    info!(
        submitted = summary.transfers_submitted,
        rejected = summary.transfers_rejected,
        "transfers submitted"
    );
    Ok(())
}

fn at_line(line: u64, error: impl std::fmt::Display) -> String {
    format!("Line {}: {}", line, error)
}

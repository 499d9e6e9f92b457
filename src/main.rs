//! Sharded ledger CLI
//!
//! Loads accounts from one CSV file, applies the transfers from another
//! through the sharded engine, and prints the final balances to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.csv transfers.csv > balances.csv
//! cargo run -- --shards 8 --outcomes outcomes.csv accounts.csv transfers.csv
//! LOG_LEVEL=debug cargo run -- --json-logs accounts.csv transfers.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use sharded_ledger::{cli, runner};
use std::process;

fn main() {
    let args = cli::parse_args();
    cli::init_tracing(&args.log_level, args.json_logs);

    // Balances go to stdout, logs to stderr
    let mut output = std::io::stdout().lock();
    if let Err(e) = runner::run(&args, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

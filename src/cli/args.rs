use crate::core::EngineConfig;
use clap::Parser;
use std::path::PathBuf;

/// Apply balance transfers through a sharded in-memory ledger
#[derive(Parser, Debug)]
#[command(name = "ledger")]
#[command(about = "Apply balance transfers through a sharded in-memory ledger", long_about = None)]
pub struct CliArgs {
    /// CSV file with the starting accounts (id,balance)
    #[arg(value_name = "ACCOUNTS", help = "Path to the accounts CSV file")]
    pub accounts_file: PathBuf,

    /// CSV file with the transfers to submit (from,to,amount)
    #[arg(value_name = "TRANSFERS", help = "Path to the transfers CSV file")]
    pub transfers_file: PathBuf,

    /// Number of shards / worker threads
    #[arg(
        long = "shards",
        env = "LEDGER_SHARDS",
        value_name = "COUNT",
        help = "Number of shards (default: a quarter of the CPU cores, at least 2)"
    )]
    pub shards: Option<usize>,

    /// Pending transfers per shard before submission blocks
    #[arg(
        long = "queue-capacity",
        env = "LEDGER_QUEUE_CAPACITY",
        value_name = "SIZE",
        help = "Pending transfers per shard before submission blocks (default: 20000)"
    )]
    pub queue_capacity: Option<usize>,

    /// Where to write transfer outcomes
    #[arg(
        long = "outcomes",
        value_name = "PATH",
        help = "Write transfer outcomes as CSV to this file"
    )]
    pub outcomes_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl CliArgs {
    /// Create an EngineConfig from CLI arguments
    ///
    /// Unset values fall back to the defaults; invalid ones are corrected by
    /// [`EngineConfig::new`] with a warning.
    pub fn to_engine_config(&self) -> EngineConfig {
        if self.shards.is_some() || self.queue_capacity.is_some() {
            let default = EngineConfig::default();
            EngineConfig::new(
                self.shards.unwrap_or(default.shard_count),
                self.queue_capacity.unwrap_or(default.queue_capacity),
            )
        } else {
            EngineConfig::default()
        }
    }
}

// CLI module
// Command-line interface, argument parsing and logging setup

mod args;

pub use args::CliArgs;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins over `level` when set. Logs go to stderr so stdout only
/// carries the balance report.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .with_target(false)
            .init();
    }
}

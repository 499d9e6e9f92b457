//! Benchmark suite for transfer throughput
//!
//! Measures the time to submit a batch of transfers and wait for every
//! outcome, across shard counts, using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Each iteration builds a fresh engine with 1,000 accounts so balances never
//! run out, then pushes transfers between pseudo-random pairs of accounts.

use rust_decimal::Decimal;
use sharded_ledger::{EngineConfig, TransactionEngine, TransferRequest};

const ACCOUNTS: u64 = 1_000;

fn main() {
    divan::main();
}

fn setup(shards: usize) -> TransactionEngine {
    let engine = TransactionEngine::with_config(EngineConfig::new(shards, 20_000))
        .expect("Failed to start engine");
    for id in 0..ACCOUNTS {
        engine
            .create_account(id, Decimal::from(1_000_000))
            .expect("Failed to create account");
    }
    engine
}

fn requests(count: u64) -> Vec<TransferRequest> {
    (0..count)
        .map(|i| {
            let from = (i * 7919) % ACCOUNTS;
            let to = (from + 1 + (i % (ACCOUNTS - 1))) % ACCOUNTS;
            TransferRequest::new(from, to, Decimal::new(150, 2))
        })
        .collect()
}

/// Submit and settle 10,000 transfers from a single submitting thread
#[divan::bench(args = [2, 4, 8])]
fn submit_and_settle(bencher: divan::Bencher, shards: usize) {
    bencher
        .with_inputs(|| (setup(shards), requests(10_000)))
        .bench_values(|(engine, requests)| {
            for request in requests {
                engine.submit(request).expect("Submission failed");
            }
            let statuses = engine.status_log();
            engine.shutdown().expect("Shutdown failed");
            divan::black_box(statuses.drain())
        });
}

/// Submit 10,000 transfers from four threads at once
#[divan::bench(args = [2, 4, 8])]
fn concurrent_submitters(bencher: divan::Bencher, shards: usize) {
    bencher
        .with_inputs(|| (setup(shards), requests(10_000)))
        .bench_values(|(engine, requests)| {
            std::thread::scope(|scope| {
                for chunk in requests.chunks(2_500) {
                    let engine = &engine;
                    scope.spawn(move || {
                        for request in chunk {
                            engine.submit(request.clone()).expect("Submission failed");
                        }
                    });
                }
            });
            let statuses = engine.status_log();
            engine.shutdown().expect("Shutdown failed");
            divan::black_box(statuses.drain())
        });
}

//! Engine behaviour under concurrent use
//!
//! These tests drive the public engine API from several threads and check
//! the properties that must hold however the shard workers interleave:
//! money is conserved, balances never go negative, every admitted transfer
//! gets exactly one outcome, and transfers from one sender apply in the
//! order they were submitted.

use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sharded_ledger::{
    AccountId, EngineConfig, SubmissionError, TransactionEngine, TransferId, TransferOutcome,
    TransferRequest, TransferStatus,
};
use std::collections::{HashMap, HashSet};
use std::thread;

fn engine_with(shards: usize, accounts: &[(AccountId, Decimal)]) -> TransactionEngine {
    let engine = TransactionEngine::with_config(EngineConfig::new(shards, 1024)).unwrap();
    for (id, balance) in accounts {
        engine.create_account(*id, *balance).unwrap();
    }
    engine
}

/// Shut the engine down and return everything it recorded
fn finish(engine: TransactionEngine) -> Vec<TransferOutcome> {
    let statuses = engine.status_log();
    engine.shutdown().unwrap();
    statuses.drain()
}

/// Small deterministic generator so failures are reproducible
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

#[rstest]
fn test_random_load_conserves_money(#[values(2, 4, 7)] shards: usize) {
    const ACCOUNTS: u64 = 20;
    const SUBMITTERS: u64 = 4;
    const PER_SUBMITTER: usize = 2_000;

    let initial: Vec<(AccountId, Decimal)> = (0..ACCOUNTS).map(|id| (id, dec!(1000))).collect();
    let engine = engine_with(shards, &initial);
    let accounts = engine.account_store();
    let total_before = accounts.total_balance();

    let admitted: Vec<TransferId> = thread::scope(|scope| {
        let handles: Vec<_> = (0..SUBMITTERS)
            .map(|seed| {
                let engine = &engine;
                scope.spawn(move || {
                    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15 ^ (seed + 1));
                    let mut ids = Vec::new();
                    for _ in 0..PER_SUBMITTER {
                        let from = rng.below(ACCOUNTS);
                        let to = rng.below(ACCOUNTS);
                        let amount = Decimal::new(rng.below(30_000) as i64 + 1, 2);
                        let request = TransferRequest::new(from, to, amount);
                        let id = request.transfer_id;
                        if engine.submit(request).is_ok() {
                            ids.push(id);
                        }
                    }
                    ids
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    let outcomes = finish(engine);

    assert_eq!(accounts.total_balance(), total_before);
    assert!(accounts
        .all_accounts()
        .iter()
        .all(|account| account.balance >= Decimal::ZERO));

    // Exactly one outcome per admitted transfer, none for rejected ones
    assert_eq!(outcomes.len(), admitted.len());
    let outcome_ids: HashSet<TransferId> = outcomes.iter().map(|o| o.transfer_id).collect();
    let admitted_ids: HashSet<TransferId> = admitted.into_iter().collect();
    assert_eq!(outcome_ids, admitted_ids);

    // Only funds can run out between submission and execution
    assert!(outcomes
        .iter()
        .all(|o| o.status != TransferStatus::SystemError));
}

#[test]
fn test_simple_transfer() {
    let engine = engine_with(2, &[(1, dec!(1000)), (2, dec!(2000))]);
    let accounts = engine.account_store();

    engine
        .submit(TransferRequest::new(1, 2, dec!(100)))
        .unwrap();
    let outcomes = finish(engine);

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_success());
    assert_eq!(accounts.lookup(1).unwrap().balance, dec!(900));
    assert_eq!(accounts.lookup(2).unwrap().balance, dec!(2100));
}

#[test]
fn test_overdraft_rejected_at_submission() {
    let engine = engine_with(2, &[(1, dec!(1000)), (2, dec!(2000))]);
    let accounts = engine.account_store();

    let result = engine.submit(TransferRequest::new(1, 2, dec!(2000)));
    let outcomes = finish(engine);

    assert!(matches!(
        result,
        Err(SubmissionError::InsufficientFunds { id: 1, .. })
    ));
    assert!(outcomes.is_empty());
    assert_eq!(accounts.lookup(1).unwrap().balance, dec!(1000));
    assert_eq!(accounts.lookup(2).unwrap().balance, dec!(2000));
}

#[test]
fn test_self_transfer_rejected() {
    let engine = engine_with(2, &[(1, dec!(1000))]);

    let result = engine.submit(TransferRequest::new(1, 1, dec!(1)));

    assert_eq!(result, Err(SubmissionError::SelfTransfer { id: 1 }));
    assert!(finish(engine).is_empty());
}

/// Whether a transfer moved money, whichever phase turned it down
fn applied(
    result: &Result<(), SubmissionError>,
    id: TransferId,
    outcomes: &HashMap<TransferId, TransferStatus>,
) -> bool {
    match result {
        Ok(()) => outcomes[&id] == TransferStatus::Success,
        Err(SubmissionError::InsufficientFunds { .. }) => false,
        Err(e) => panic!("unexpected rejection: {}", e),
    }
}

#[rstest]
fn test_same_sender_applies_in_submission_order(#[values(2, 5)] shards: usize) {
    let engine = engine_with(shards, &[(1, dec!(1000)), (2, dec!(2000)), (3, dec!(0))]);
    let accounts = engine.account_store();

    let first = TransferRequest::new(1, 2, dec!(600));
    let second = TransferRequest::new(1, 3, dec!(600));
    let (first_id, second_id) = (first.transfer_id, second.transfer_id);
    let first_result = engine.submit(first);
    let second_result = engine.submit(second);

    let outcomes: HashMap<_, _> = finish(engine)
        .into_iter()
        .map(|o| (o.transfer_id, o.status))
        .collect();

    assert!(applied(&first_result, first_id, &outcomes));
    assert!(!applied(&second_result, second_id, &outcomes));
    assert_eq!(accounts.lookup(1).unwrap().balance, dec!(400));
    assert_eq!(accounts.lookup(2).unwrap().balance, dec!(2600));
    assert_eq!(accounts.lookup(3).unwrap().balance, dec!(0));
}

#[test]
fn test_sequential_debits_follow_running_balance() {
    let engine = engine_with(3, &[(1, dec!(100)), (2, dec!(0))]);
    let accounts = engine.account_store();

    let amounts = [dec!(60), dec!(60), dec!(40), dec!(1)];
    let submitted: Vec<_> = amounts
        .iter()
        .map(|amount| {
            let request = TransferRequest::new(1, 2, *amount);
            let id = request.transfer_id;
            (id, engine.submit(request))
        })
        .collect();

    let outcomes: HashMap<_, _> = finish(engine)
        .into_iter()
        .map(|o| (o.transfer_id, o.status))
        .collect();

    let pattern: Vec<bool> = submitted
        .iter()
        .map(|(id, result)| applied(result, *id, &outcomes))
        .collect();
    assert_eq!(pattern, vec![true, false, true, false]);
    assert_eq!(accounts.lookup(1).unwrap().balance, dec!(0));
    assert_eq!(accounts.lookup(2).unwrap().balance, dec!(100));
}

#[test]
fn test_outcomes_for_one_sender_keep_submission_order() {
    let engine = engine_with(4, &[(1, dec!(1000)), (2, dec!(0)), (3, dec!(1000))]);

    let mut expected = Vec::new();
    for i in 0..200 {
        let request = TransferRequest::new(1, 2, dec!(1));
        expected.push(request.transfer_id);
        engine.submit(request).unwrap();
        // Interleave traffic from another sender
        if i % 3 == 0 {
            engine.submit(TransferRequest::new(3, 2, dec!(1))).unwrap();
        }
    }

    let expected_set: HashSet<_> = expected.iter().copied().collect();
    let outcomes = finish(engine);
    let observed: Vec<TransferId> = outcomes
        .iter()
        .map(|o| o.transfer_id)
        .filter(|id| expected_set.contains(id))
        .collect();

    assert_eq!(observed, expected);
}

#[test]
fn test_concurrent_credits_to_one_receiver() {
    const SENDERS: u64 = 16;

    let mut initial: Vec<(AccountId, Decimal)> =
        (1..=SENDERS).map(|id| (id, dec!(100))).collect();
    initial.push((0, dec!(0)));
    let engine = engine_with(4, &initial);
    let accounts = engine.account_store();

    thread::scope(|scope| {
        for sender in 1..=SENDERS {
            let engine = &engine;
            scope.spawn(move || {
                for _ in 0..10 {
                    engine
                        .submit(TransferRequest::new(sender, 0, dec!(10)))
                        .unwrap();
                }
            });
        }
    });

    let outcomes = finish(engine);

    assert_eq!(outcomes.len(), (SENDERS * 10) as usize);
    assert!(outcomes.iter().all(TransferOutcome::is_success));
    assert_eq!(accounts.lookup(0).unwrap().balance, dec!(1600));
    for sender in 1..=SENDERS {
        assert_eq!(accounts.lookup(sender).unwrap().balance, dec!(0));
    }
}

#[test]
fn test_receiver_removed_after_admission() {
    let engine = engine_with(2, &[(1, dec!(1000)), (2, dec!(0))]);
    let accounts = engine.account_store();

    for _ in 0..500 {
        engine.submit(TransferRequest::new(1, 2, dec!(1))).unwrap();
    }
    let removed = engine.remove_account(2).unwrap();
    let outcomes = finish(engine);

    assert_eq!(outcomes.len(), 500);
    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    assert!(outcomes
        .iter()
        .filter(|o| !o.is_success())
        .all(|o| o.status == TransferStatus::SystemError && o.detail.is_some()));

    // Credits landed before removal; nothing was lost or created after it
    let moved = Decimal::from(succeeded);
    assert_eq!(removed.balance, moved);
    assert_eq!(accounts.lookup(1).unwrap().balance, dec!(1000) - moved);
    assert!(accounts.lookup(2).is_none());
}

#[test]
fn test_zero_balance_receiver_is_credited() {
    let engine = engine_with(2, &[(1, dec!(0)), (2, dec!(40))]);
    let accounts = engine.account_store();

    engine.submit(TransferRequest::new(2, 1, dec!(40))).unwrap();
    let outcomes = finish(engine);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, TransferStatus::Success);
    assert_eq!(accounts.lookup(1).unwrap().balance, dec!(40));
    assert_eq!(accounts.lookup(2).unwrap().balance, dec!(0));
}

#[test]
fn test_shutdown_processes_everything_queued() {
    let engine = TransactionEngine::with_config(EngineConfig::new(2, 10_000)).unwrap();
    engine.create_account(1, dec!(10000)).unwrap();
    engine.create_account(2, dec!(0)).unwrap();
    let accounts = engine.account_store();

    for _ in 0..5_000 {
        engine.submit(TransferRequest::new(1, 2, dec!(1))).unwrap();
    }
    let outcomes = finish(engine);

    assert_eq!(outcomes.len(), 5_000);
    assert_eq!(accounts.lookup(2).unwrap().balance, dec!(5000));
}

#[test]
fn test_drain_is_destructive() {
    let engine = engine_with(2, &[(1, dec!(10)), (2, dec!(10))]);
    let statuses = engine.status_log();

    engine.submit(TransferRequest::new(1, 2, dec!(5))).unwrap();
    engine.shutdown().unwrap();

    assert_eq!(statuses.drain().len(), 1);
    assert!(statuses.drain().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_async_from_runtime() {
    let engine = engine_with(3, &[(1, dec!(500)), (2, dec!(500))]);
    let accounts = engine.account_store();

    for _ in 0..50 {
        engine
            .submit_async(TransferRequest::new(1, 2, dec!(2)))
            .await
            .unwrap();
        engine
            .submit_async(TransferRequest::new(2, 1, dec!(1)))
            .await
            .unwrap();
    }
    assert_eq!(
        engine.submit_async(TransferRequest::new(1, 9, dec!(1))).await,
        Err(SubmissionError::ReceiverNotFound { id: 9 })
    );

    // Joining worker threads blocks, so keep it off the runtime
    let outcomes = tokio::task::spawn_blocking(move || finish(engine))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 100);
    assert!(outcomes.iter().all(TransferOutcome::is_success));
    assert_eq!(accounts.lookup(1).unwrap().balance, dec!(450));
    assert_eq!(accounts.lookup(2).unwrap().balance, dec!(550));
}

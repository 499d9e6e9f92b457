//! Thread-safe account storage shared by the engine and its callers
//!
//! This module provides the `AccountStore` struct, which maps account ids to
//! lockable account records.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) for the id → record index,
//! so lookups and inserts on different accounts do not contend. Each record
//! carries its own `parking_lot::Mutex` around the balance. Balance changes
//! never happen while a `DashMap` shard guard is held: callers clone the
//! record's `Arc` out of the map first and lock the record afterwards.
//!
//! # Thread Safety
//!
//! Any worker may credit any account, so every balance mutation goes through
//! the record lock. A transfer locks both of its records in ascending id order
//! (see [`AccountRecord::lock_pair`]), which rules out lock-order deadlocks
//! between workers moving money in opposite directions.

use crate::types::{Account, AccountError, AccountId};
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Live account record
///
/// Shared between the store and whichever worker is currently applying a
/// transfer that touches it.
#[derive(Debug)]
pub(crate) struct AccountRecord {
    id: AccountId,
    balance: Mutex<Decimal>,
}

impl AccountRecord {
    fn new(id: AccountId, balance: Decimal) -> Self {
        Self {
            id,
            balance: Mutex::new(balance),
        }
    }

    pub(crate) fn id(&self) -> AccountId {
        self.id
    }

    fn snapshot(&self) -> Account {
        Account::new(self.id, *self.balance.lock())
    }

    /// Hold this account's lock, stalling any worker that needs it
    #[cfg(test)]
    pub(crate) fn hold(&self) -> MutexGuard<'_, Decimal> {
        self.balance.lock()
    }

    /// Lock the balances of a transfer's two accounts
    ///
    /// Locks are always taken lowest id first. The guards are returned as
    /// `(sender, receiver)` regardless of the order they were acquired in.
    /// The two records must be distinct, otherwise this deadlocks.
    pub(crate) fn lock_pair<'a>(
        sender: &'a AccountRecord,
        receiver: &'a AccountRecord,
    ) -> (MutexGuard<'a, Decimal>, MutexGuard<'a, Decimal>) {
        debug_assert_ne!(sender.id, receiver.id);

        if sender.id < receiver.id {
            let sender_balance = sender.balance.lock();
            let receiver_balance = receiver.balance.lock();
            (sender_balance, receiver_balance)
        } else {
            let receiver_balance = receiver.balance.lock();
            let sender_balance = sender.balance.lock();
            (sender_balance, receiver_balance)
        }
    }
}

/// Concurrent account store
///
/// Holds every account the ledger knows about. Shared (via `Arc`) by the
/// transaction engine, its workers and read-only callers.
///
/// # Consistency
///
/// Single-account reads always observe a balance from before or after a
/// transfer, never in between. Listings taken with [`AccountStore::all_accounts`]
/// are not a consistent snapshot across accounts while transfers are in flight.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Index of account records by id
    accounts: DashMap<AccountId, Arc<AccountRecord>>,
}

impl AccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Create an account with an initial balance
    ///
    /// Insertion is atomic with respect to concurrent creations of the same
    /// id: exactly one caller wins and the others get `AlreadyExists`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the account was created
    /// * `Err(AccountError::NegativeBalance)` if `balance` is below zero
    /// * `Err(AccountError::AlreadyExists)` if the id is taken
    pub fn create_account(&self, id: AccountId, balance: Decimal) -> Result<(), AccountError> {
        if balance < Decimal::ZERO {
            return Err(AccountError::NegativeBalance { id, balance });
        }

        let mut created = false;
        self.accounts.entry(id).or_insert_with(|| {
            created = true;
            Arc::new(AccountRecord::new(id, balance))
        });

        if created {
            Ok(())
        } else {
            Err(AccountError::AlreadyExists { id })
        }
    }

    /// Look up an account
    ///
    /// # Returns
    ///
    /// A snapshot of the account, or `None` if no account has this id.
    pub fn lookup(&self, id: AccountId) -> Option<Account> {
        self.record(id).map(|record| record.snapshot())
    }

    /// Whether an account with this id exists
    pub fn contains(&self, id: AccountId) -> bool {
        self.accounts.contains_key(&id)
    }

    /// Remove an account
    ///
    /// Transfers already queued that reference the account will be reported
    /// as system errors by the worker.
    ///
    /// # Returns
    ///
    /// The last snapshot of the removed account, or `None` if it did not exist.
    pub fn remove(&self, id: AccountId) -> Option<Account> {
        self.accounts
            .remove(&id)
            .map(|(_, record)| record.snapshot())
    }

    /// All accounts, sorted by id
    pub fn all_accounts(&self) -> Vec<Account> {
        let records: Vec<Arc<AccountRecord>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut accounts: Vec<Account> = records.iter().map(|record| record.snapshot()).collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Sum of all balances
    pub fn total_balance(&self) -> Decimal {
        self.all_accounts()
            .iter()
            .map(|account| account.balance)
            .sum()
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Shared handle to a live record
    ///
    /// The map guard is released before this returns.
    pub(crate) fn record(&self, id: AccountId) -> Option<Arc<AccountRecord>> {
        self.accounts.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether `record` is still the one stored under its id
    ///
    /// Callers hold the record's lock, so a concurrent `remove` cannot take
    /// its final snapshot until they are done.
    pub(crate) fn is_live(&self, record: &Arc<AccountRecord>) -> bool {
        self.accounts
            .get(&record.id())
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), record))
    }

    /// Overwrite a balance without any checks
    #[cfg(test)]
    pub(crate) fn force_balance(&self, id: AccountId, balance: Decimal) {
        if let Some(record) = self.record(id) {
            *record.balance.lock() = balance;
        }
    }
}

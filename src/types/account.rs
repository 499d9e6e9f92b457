//! Account-related types for the ledger
//!
//! This module defines the Account value handed out to callers. The live,
//! lockable record lives in the account store; an `Account` is a copy of it
//! taken at one instant.

use rust_decimal::Decimal;

/// Account identifier
///
/// Also the routing key: transfers are sharded by the sender's id.
pub type AccountId = u64;

/// Point-in-time view of an account
///
/// Returned by lookups and listings. Mutating it has no effect on the
/// store; balances only change through the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Stable account identifier
    pub id: AccountId,

    /// Balance at the moment the snapshot was taken
    ///
    /// Never negative for accounts created through the store.
    pub balance: Decimal,
}

impl Account {
    /// Create an account snapshot
    pub fn new(id: AccountId, balance: Decimal) -> Self {
        Account { id, balance }
    }
}

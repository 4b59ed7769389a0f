//! Lock Record Store - abstraction boundary for lock persistence.
//!
//! The mutex needs exactly two things from a backend: a point read, and an
//! atomic conditional update whose predicate is evaluated by the backend,
//! against the authoritative stored value, at write time, with the backend's
//! own clock. Anything offering compare-and-swap on a keyed record can
//! implement [`LockRecordStore`].
//!
//! Implementations:
//! - [`SqliteLockStore`]: `UPDATE ... WHERE <predicate>` in one statement
//! - [`MemoryLockStore`]: in-process map behind an async mutex
//!
//! Seeding records is a separate capability, [`StoreBootstrap`], so the
//! mutex itself can never create a record lazily.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{
    record::{LockName, LockRecord, Owner},
    Error, Result,
};

mod memory;
mod sqlite;

pub use memory::MemoryLockStore;
pub use sqlite::SqliteLockStore;
pub(crate) use sqlite::validate_table_name;

/// Condition over the currently stored record that must hold for a write to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `owner == "" OR lease_expiry < now`
    Claimable,
    /// `owner == <owner>`
    OwnedBy(Owner),
}

impl Predicate {
    /// Evaluate against a record at the store's `now`.
    pub fn holds(&self, record: &LockRecord, now: DateTime<Utc>) -> bool {
        match self {
            Self::Claimable => record.is_claimable_at(now),
            Self::OwnedBy(owner) => record.is_owned_by(owner),
        }
    }
}

/// New values written when the predicate holds. Both fields change together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// `owner = <owner>, lease_expiry = now + lease`
    Claim { owner: Owner, lease: Duration },
    /// `owner = "", lease_expiry = now`
    Clear,
}

/// Longest lease accepted (100 years), keeping every expiry representable.
pub const MAX_LEASE_MILLIS: i64 = 100 * 365 * 24 * 60 * 60 * 1000;

impl Transition {
    /// Lease length in whole milliseconds, the resolution records are kept at.
    pub fn lease_millis(lease: Duration) -> Result<i64> {
        i64::try_from(lease.as_millis())
            .ok()
            .filter(|millis| *millis <= MAX_LEASE_MILLIS)
            .ok_or_else(|| Error::invalid_argument("lease duration", "exceeds 100 years"))
    }

    /// Apply to an in-memory record at the store's `now`.
    pub fn apply(&self, record: &mut LockRecord, now: DateTime<Utc>) -> Result<()> {
        match self {
            Self::Claim { owner, lease } => {
                let millis = Self::lease_millis(*lease)?;
                let expiry = now
                    .checked_add_signed(chrono::Duration::milliseconds(millis))
                    .ok_or_else(|| {
                        Error::invalid_argument("lease duration", "expiry is out of range")
                    })?;
                record.owner = owner.as_str().to_string();
                record.lease_expiry = expiry;
            }
            Self::Clear => {
                record.owner.clear();
                record.lease_expiry = now;
            }
        }
        Ok(())
    }
}

/// Result of a conditional update. Predicate failure is an expected outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    PredicateFailed,
    NotFound,
}

/// The one capability the mutex protocol depends on.
///
/// # Guarantees required of implementations
///
/// - Predicate evaluation and write are one indivisible operation.
/// - Two updates on the same key with mutually exclusive predicates never
///   both apply.
/// - `now` in time-based predicates and transitions is read by the store when
///   it evaluates them.
/// - Backend failures surface as [`Error::Unavailable`] and are not retried.
#[async_trait::async_trait]
pub trait LockRecordStore: Send + Sync {
    /// Point read of one record.
    async fn read(&self, lock: &LockName) -> Result<Option<LockRecord>>;

    /// Atomically apply `transition` if `predicate` holds on the stored record.
    async fn conditional_update(
        &self,
        lock: &LockName,
        predicate: &Predicate,
        transition: &Transition,
    ) -> Result<UpdateOutcome>;
}

/// Table creation and record seeding, run before first use.
#[async_trait::async_trait]
pub trait StoreBootstrap: Send + Sync {
    /// Create the backing table if it does not exist.
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert an unheld record for `lock` unless one exists.
    ///
    /// Returns `true` when a record was created.
    async fn seed(&self, lock: &LockName) -> Result<bool>;
}

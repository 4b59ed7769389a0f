//! Lease mutex protocol.
//!
//! `acquire` and `release` are each exactly one conditional update against a
//! [`LockRecordStore`]. The store decides atomically, with its own clock,
//! whether the write applies; this type keeps no state of its own and needs
//! no local locking, so one instance can be shared freely across tasks.
//!
//! | Call | Predicate on stored record | Write |
//! |------|----------------------------|-------|
//! | `acquire(o, d)` | `owner == "" OR lease_expiry < now` | `owner = o, lease_expiry = now + d` |
//! | `release(o)` | `owner == o` | `owner = "", lease_expiry = now` |
//!
//! A failed predicate is the routine outcome of contention and comes back as
//! `Ok(false)`. There is no retry, no backoff and no renewal: a holder that
//! calls `acquire` again on its own live lease gets `false`.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::{
    cancel::Cancellation,
    error::Operation,
    record::{LockName, LockRecord, Owner},
    store::{LockRecordStore, Predicate, Transition, UpdateOutcome},
    Error, Result,
};

/// Snapshot of a lock for display.
///
/// `held` is judged against the caller's clock at `observed_at`, so it is
/// only informational; the store's clock decides every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub record: LockRecord,
    pub held: bool,
    pub observed_at: DateTime<Utc>,
}

impl LockStatus {
    /// Live holder, if any.
    pub fn holder(&self) -> Option<&str> {
        self.held.then_some(self.record.owner.as_str())
    }
}

/// Distributed mutex over a conditional-update store.
pub struct LeaseMutex<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for LeaseMutex<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for LeaseMutex<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaseMutex").finish_non_exhaustive()
    }
}

impl<S: LockRecordStore + ?Sized> LeaseMutex<S> {
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Try once to take `lock_name` for `owner` for `lease`.
    ///
    /// Returns `Ok(true)` if the lock is now held by `owner` until
    /// `now + lease` on the store's clock, `Ok(false)` if a live lease
    /// (including the caller's own) blocked the write.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for a blank owner or lock name, or a
    ///   lease too long to represent; the store is not contacted
    /// - [`Error::NotFound`] if the lock record was never seeded
    /// - [`Error::Unavailable`] if the store call failed
    /// - [`Error::Cancelled`] if `cancel` fired first; the write may have applied
    pub async fn acquire(
        &self,
        owner: &str,
        lock_name: &str,
        lease: Duration,
        cancel: &Cancellation,
    ) -> Result<bool> {
        let owner = Owner::parse(owner)?;
        let lock = LockName::parse(lock_name)?;
        Transition::lease_millis(lease)?;

        let predicate = Predicate::Claimable;
        let transition = Transition::Claim {
            owner: owner.clone(),
            lease,
        };

        let applied = self
            .update(Operation::Acquire, &lock, &predicate, &transition, cancel)
            .await?;

        if applied {
            debug!(
                lock = %lock,
                owner = %owner,
                lease_ms = u64::try_from(lease.as_millis()).unwrap_or(u64::MAX),
                "lock acquired"
            );
        } else {
            trace!(lock = %lock, owner = %owner, "lock held by a live lease");
        }
        Ok(applied)
    }

    /// Try once to give up `lock_name` on behalf of `owner`.
    ///
    /// Succeeds whenever `owner` is the stored owner, even if its lease has
    /// already elapsed, as long as nobody has taken the lock over since.
    ///
    /// # Errors
    ///
    /// Same as [`acquire`](Self::acquire).
    pub async fn release(&self, owner: &str, lock_name: &str, cancel: &Cancellation) -> Result<bool> {
        let owner = Owner::parse(owner)?;
        let lock = LockName::parse(lock_name)?;

        let predicate = Predicate::OwnedBy(owner.clone());
        let applied = self
            .update(Operation::Release, &lock, &predicate, &Transition::Clear, cancel)
            .await?;

        if applied {
            debug!(lock = %lock, owner = %owner, "lock released");
        } else {
            trace!(lock = %lock, owner = %owner, "release skipped, not the stored owner");
        }
        Ok(applied)
    }

    /// Point read of a lock for display and debugging.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the record was never seeded, otherwise as
    /// [`acquire`](Self::acquire).
    pub async fn inspect(&self, lock_name: &str, cancel: &Cancellation) -> Result<LockStatus> {
        let lock = LockName::parse(lock_name)?;
        let record = Self::race(Operation::Inspect, &lock, cancel, self.store.read(&lock))
            .await?
            .ok_or_else(|| Error::not_found(lock.as_str()))?;

        let observed_at = Utc::now();
        Ok(LockStatus {
            held: record.is_held_at(observed_at),
            record,
            observed_at,
        })
    }

    async fn update(
        &self,
        operation: Operation,
        lock: &LockName,
        predicate: &Predicate,
        transition: &Transition,
        cancel: &Cancellation,
    ) -> Result<bool> {
        let outcome = Self::race(
            operation,
            lock,
            cancel,
            self.store.conditional_update(lock, predicate, transition),
        )
        .await?;

        match outcome {
            UpdateOutcome::Applied => Ok(true),
            UpdateOutcome::PredicateFailed => Ok(false),
            UpdateOutcome::NotFound => Err(Error::not_found(lock.as_str())),
        }
    }

    /// Run one store round trip against the caller's cancellation.
    async fn race<T>(
        operation: Operation,
        lock: &LockName,
        cancel: &Cancellation,
        call: impl std::future::Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        let cancelled = |reason| Error::Cancelled {
            operation,
            lock: lock.as_str().to_string(),
            reason,
        };

        if let Some(reason) = cancel.reason() {
            return Err(cancelled(reason));
        }

        // A definitive answer wins over a simultaneous cancellation.
        let result = tokio::select! {
            biased;
            result = call => result,
            reason = cancel.cancelled() => {
                warn!(%operation, lock = %lock, %reason, "store call abandoned, outcome unknown");
                return Err(cancelled(reason));
            }
        };

        result.inspect_err(|err| {
            if matches!(err, Error::Unavailable(_)) {
                warn!(%operation, lock = %lock, error = %err, "lock store call failed");
            }
        })
    }
}

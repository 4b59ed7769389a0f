//! In-process lock record store.
//!
//! Serializes every operation behind one async mutex, which trivially gives
//! per-key atomicity. Useful for single-process deployments and for tests,
//! where a [`ManualClock`](crate::clock::ManualClock) makes lease expiry
//! deterministic.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use tracing::debug;

use super::{LockRecordStore, Predicate, StoreBootstrap, Transition, UpdateOutcome};
use crate::{
    clock::{Clock, SystemClock},
    record::{LockName, LockRecord},
    Result,
};

/// Lock records held in process memory.
pub struct MemoryLockStore {
    records: Mutex<HashMap<String, LockRecord>>,
    clock: Arc<dyn Clock>,
}

impl MemoryLockStore {
    /// Store judged by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Store judged by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Copy of every record, sorted by name.
    pub async fn snapshot(&self) -> Vec<LockRecord> {
        let mut records: Vec<LockRecord> = self.records.lock().await.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

impl Default for MemoryLockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLockStore").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl LockRecordStore for MemoryLockStore {
    async fn read(&self, lock: &LockName) -> Result<Option<LockRecord>> {
        Ok(self.records.lock().await.get(lock.as_str()).cloned())
    }

    async fn conditional_update(
        &self,
        lock: &LockName,
        predicate: &Predicate,
        transition: &Transition,
    ) -> Result<UpdateOutcome> {
        let mut records = self.records.lock().await;
        let Some(record) = records.get_mut(lock.as_str()) else {
            return Ok(UpdateOutcome::NotFound);
        };

        let now = self.clock.now();
        if !predicate.holds(record, now) {
            return Ok(UpdateOutcome::PredicateFailed);
        }

        // Stage the write so a failed transition leaves the record untouched.
        let mut staged = record.clone();
        transition.apply(&mut staged, now)?;
        *record = staged;
        Ok(UpdateOutcome::Applied)
    }
}

#[async_trait::async_trait]
impl StoreBootstrap for MemoryLockStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn seed(&self, lock: &LockName) -> Result<bool> {
        let mut records = self.records.lock().await;
        if records.contains_key(lock.as_str()) {
            return Ok(false);
        }
        records.insert(lock.as_str().to_string(), LockRecord::unheld(lock));
        debug!(lock = %lock, "seeded in-memory lock record");
        Ok(true)
    }
}

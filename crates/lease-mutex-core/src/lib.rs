//! # lease-mutex-core
//!
//! Lease-based distributed mutex over a store offering atomic conditional
//! updates.
//!
//! Each lock is one record `(id, owner, lease_expiry)`. Acquire and release
//! are single conditional writes whose predicates the store evaluates with
//! its own clock, so mutual exclusion holds across any number of processes
//! and hosts without coordination between them. A crashed holder blocks
//! others only until its lease elapses.
//!
//! ```no_run
//! # async fn run() -> lease_mutex_core::Result<()> {
//! use std::{sync::Arc, time::Duration};
//!
//! use lease_mutex_core::{
//!     bootstrap, config::StoreConfig, Cancellation, LeaseMutex, SqliteLockStore,
//!     DEFAULT_LOCK_NAME,
//! };
//!
//! let store = Arc::new(SqliteLockStore::connect(&StoreConfig::default()).await?);
//! bootstrap(store.as_ref(), &[DEFAULT_LOCK_NAME]).await?;
//!
//! let mutex = LeaseMutex::new(store);
//! let cancel = Cancellation::timeout(Duration::from_secs(2));
//! if mutex.acquire("host-1", DEFAULT_LOCK_NAME, Duration::from_secs(30), &cancel).await? {
//!     // critical section
//!     mutex.release("host-1", DEFAULT_LOCK_NAME, &cancel).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod error;
pub mod mutex;
pub mod record;
pub mod store;

pub use bootstrap::bootstrap;
pub use cancel::{CancelHandle, CancelReason, Cancellation};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Operation, Result};
pub use mutex::{LeaseMutex, LockStatus};
pub use record::{LockName, LockRecord, Owner};
pub use store::{
    LockRecordStore, MemoryLockStore, Predicate, SqliteLockStore, StoreBootstrap, Transition,
    UpdateOutcome,
};

/// Lock used when the caller does not name one.
pub const DEFAULT_LOCK_NAME: &str = "default-mutex";

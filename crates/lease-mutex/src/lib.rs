//! lease-mutex - console harness for the lease-based distributed mutex
//!
//! Drives [`lease_mutex_core::LeaseMutex`] over an `SQLite` store from the
//! command line: bootstrap records, acquire, release, inspect, or poke at a
//! lock interactively.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;

pub use context::Context;
pub use error::Error;

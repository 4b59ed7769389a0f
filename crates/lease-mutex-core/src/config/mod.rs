//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/lease-mutex/config.toml
//! 3. Project config: .lease-mutex/config.toml
//! 4. Environment variables: `LEASE_MUTEX_*`
//! 5. CLI flags
//!
//! An explicit config file (`--config`) replaces layers 2 and 3.
//!
//! # Example Config
//!
//! ```toml
//! [store]
//! database_url = "sqlite:/var/lib/locks/locks.db?mode=rwc"
//! table = "lock_records"
//!
//! [lock]
//! name = "nightly-report"
//! lease_ms = 30000
//! seed = ["nightly-report", "compaction"]
//!
//! [client]
//! timeout_ms = 2000
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `merge`: Layer merging
//! - `validate`: Validation and derived values

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use defaults::{default_owner, DEFAULT_DATABASE_URL, DEFAULT_TABLE};
pub use load::{global_config_path, load_config, load_toml_file, project_config_path};
pub use types::{
    ClientConfig, Config, LockConfig, PartialClientConfig, PartialConfig, PartialLockConfig,
    PartialStoreConfig, StoreConfig,
};

//! Configuration validation and derived values

use std::time::Duration;

use super::{defaults::default_owner, types::Config};
use crate::{store::validate_table_name, store::MAX_LEASE_MILLIS, Error, Result};

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    pub fn validate(&self) -> Result<()> {
        if self.store.database_url.trim().is_empty() {
            return Err(Error::invalid_config("store.database_url cannot be empty"));
        }
        validate_table_name(&self.store.table)?;
        if self.store.max_connections == 0 {
            return Err(Error::invalid_config("store.max_connections must be at least 1"));
        }

        if self.lock.name.trim().is_empty() {
            return Err(Error::invalid_config("lock.name cannot be blank"));
        }
        if self.lock.seed.iter().any(|name| name.trim().is_empty()) {
            return Err(Error::invalid_config("lock.seed cannot contain blank names"));
        }
        if let Some(owner) = &self.lock.owner {
            if owner.trim().is_empty() {
                return Err(Error::invalid_config(
                    "lock.owner cannot be blank - either unset it or provide an owner",
                ));
            }
        }

        let max_lease = u64::try_from(MAX_LEASE_MILLIS).unwrap_or(u64::MAX);
        if self.lock.lease_ms == 0 || self.lock.lease_ms > max_lease {
            return Err(Error::invalid_config(format!(
                "lock.lease_ms must be 1-{max_lease}"
            )));
        }

        if self.client.timeout_ms == 0 {
            return Err(Error::invalid_config("client.timeout_ms must be at least 1"));
        }
        if self.client.poll_interval_ms == 0 {
            return Err(Error::invalid_config(
                "client.poll_interval_ms must be at least 1",
            ));
        }

        Ok(())
    }

    /// Configured owner, or `<hostname>-<pid>`.
    pub fn owner(&self) -> String {
        self.lock.owner.clone().unwrap_or_else(default_owner)
    }

    pub const fn lease(&self) -> Duration {
        Duration::from_millis(self.lock.lease_ms)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.client.timeout_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.client.poll_interval_ms)
    }

    /// Every lock name bootstrap should create: the configured lock first,
    /// then `seed` in order, without duplicates.
    pub fn seed_names(&self) -> Vec<String> {
        std::iter::once(&self.lock.name)
            .chain(&self.lock.seed)
            .fold(Vec::new(), |mut names, name| {
                if !names.contains(name) {
                    names.push(name.clone());
                }
                names
            })
    }
}

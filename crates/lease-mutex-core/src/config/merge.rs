//! Configuration merging logic (Immutable functional pattern)
//!
//! A layer overrides exactly the fields it sets. Lists are replaced, not
//! appended.

use super::types::{
    ClientConfig, Config, LockConfig, PartialClientConfig, PartialConfig, PartialLockConfig,
    PartialStoreConfig, StoreConfig,
};

impl Config {
    /// Merge a layer into this config (layer takes precedence)
    pub fn merge(self, layer: PartialConfig) -> Self {
        Self {
            store: self.store.merge(layer.store),
            lock: self.lock.merge(layer.lock),
            client: self.client.merge(layer.client),
        }
    }
}

impl StoreConfig {
    fn merge(self, layer: PartialStoreConfig) -> Self {
        Self {
            database_url: layer.database_url.unwrap_or(self.database_url),
            table: layer.table.unwrap_or(self.table),
            max_connections: layer.max_connections.unwrap_or(self.max_connections),
            busy_timeout_ms: layer.busy_timeout_ms.unwrap_or(self.busy_timeout_ms),
        }
    }
}

impl LockConfig {
    fn merge(self, layer: PartialLockConfig) -> Self {
        Self {
            name: layer.name.unwrap_or(self.name),
            lease_ms: layer.lease_ms.unwrap_or(self.lease_ms),
            owner: layer.owner.or(self.owner),
            seed: layer.seed.unwrap_or(self.seed),
        }
    }
}

impl ClientConfig {
    fn merge(self, layer: PartialClientConfig) -> Self {
        Self {
            timeout_ms: layer.timeout_ms.unwrap_or(self.timeout_ms),
            poll_interval_ms: layer.poll_interval_ms.unwrap_or(self.poll_interval_ms),
        }
    }
}

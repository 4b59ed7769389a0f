//! Default value implementations

use super::types::{ClientConfig, LockConfig, StoreConfig};
use crate::DEFAULT_LOCK_NAME;

/// SQLite file under the project directory, created on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:.lease-mutex/locks.db?mode=rwc";

pub const DEFAULT_TABLE: &str = "lock_records";

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            table: DEFAULT_TABLE.to_string(),
            max_connections: 5,
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOCK_NAME.to_string(),
            lease_ms: 1000,
            owner: None,
            seed: Vec::new(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            poll_interval_ms: 100,
        }
    }
}

/// `<hostname>-<pid>`, unique enough to tell processes apart.
pub fn default_owner() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_string());
    format!("{host}-{}", std::process::id())
}

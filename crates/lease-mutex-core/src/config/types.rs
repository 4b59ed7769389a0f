//! Configuration type definitions
//!
//! Resolved structures carry a value for every field. The `Partial*`
//! structures mirror them with optional fields and describe one layer
//! (a file, the environment, or CLI flags) before it is merged.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// RESOLVED CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

/// Root configuration structure
///
/// Loaded from defaults → global → project → env vars → CLI flags
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub lock: LockConfig,
    pub client: ClientConfig,
}

/// Where lock records live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// sqlx connection URL, e.g. `sqlite:locks.db?mode=rwc`
    pub database_url: String,
    pub table: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
}

/// Which lock to operate on and how.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockConfig {
    pub name: String,
    pub lease_ms: u64,
    /// Falls back to `<hostname>-<pid>` when unset.
    pub owner: Option<String>,
    /// Extra lock names created by bootstrap.
    pub seed: Vec<String>,
}

/// Per-call behaviour of the CLI client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Deadline for a single store round trip.
    pub timeout_ms: u64,
    /// Delay between attempts when waiting for a lock.
    pub poll_interval_ms: u64,
}

// ═══════════════════════════════════════════════════════════════════════════
// LAYERS
// ═══════════════════════════════════════════════════════════════════════════

/// One configuration layer; unset fields leave lower layers untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub store: PartialStoreConfig,
    pub lock: PartialLockConfig,
    pub client: PartialClientConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PartialStoreConfig {
    pub database_url: Option<String>,
    pub table: Option<String>,
    pub max_connections: Option<u32>,
    pub busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PartialLockConfig {
    pub name: Option<String>,
    pub lease_ms: Option<u64>,
    pub owner: Option<String>,
    pub seed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PartialClientConfig {
    pub timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

//! Backends shared by the integration tests.

#![allow(dead_code, clippy::missing_errors_doc)]

use std::sync::Arc;

use lease_mutex_core::{
    bootstrap, config::StoreConfig, LeaseMutex, LockRecordStore, MemoryLockStore, Result,
    SqliteLockStore,
};
use tempfile::TempDir;

/// A mutex plus whatever must outlive it.
pub struct Backend {
    pub name: &'static str,
    pub mutex: LeaseMutex<dyn LockRecordStore>,
    _dir: Option<TempDir>,
}

pub async fn memory(locks: &[&str]) -> Result<Backend> {
    let store = Arc::new(MemoryLockStore::new());
    bootstrap(store.as_ref(), locks).await?;
    Ok(Backend {
        name: "memory",
        mutex: LeaseMutex::new(store as Arc<dyn LockRecordStore>),
        _dir: None,
    })
}

/// File-backed SQLite with a multi-connection pool.
pub async fn sqlite(locks: &[&str]) -> Result<Backend> {
    let dir = tempfile::tempdir()?;
    let config = StoreConfig {
        database_url: format!("sqlite:{}?mode=rwc", dir.path().join("locks.db").display()),
        max_connections: 8,
        ..StoreConfig::default()
    };
    let store = Arc::new(SqliteLockStore::connect(&config).await?);
    bootstrap(store.as_ref(), locks).await?;
    Ok(Backend {
        name: "sqlite",
        mutex: LeaseMutex::new(store as Arc<dyn LockRecordStore>),
        _dir: Some(dir),
    })
}

pub async fn all(locks: &[&str]) -> Result<Vec<Backend>> {
    Ok(vec![memory(locks).await?, sqlite(locks).await?])
}

//! Resolved configuration plus an open store, shared by every command.

use std::sync::Arc;

use anyhow::Result;
use lease_mutex_core::{Cancellation, Config, LeaseMutex, SqliteLockStore};

pub struct Context {
    pub config: Config,
    pub mutex: LeaseMutex<SqliteLockStore>,
    /// Fires on Ctrl-C.
    pub interrupt: Cancellation,
}

impl Context {
    /// Connect to the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened
    pub async fn open(config: Config, interrupt: Cancellation) -> Result<Self> {
        let store = SqliteLockStore::connect(&config.store).await?;
        Ok(Self {
            config,
            mutex: LeaseMutex::new(Arc::new(store)),
            interrupt,
        })
    }

    /// Cancellation for one store round trip: Ctrl-C or the client timeout.
    pub fn call(&self) -> Cancellation {
        self.interrupt.clone().with_timeout(self.config.timeout())
    }

    pub fn store(&self) -> &SqliteLockStore {
        self.mutex.store()
    }
}

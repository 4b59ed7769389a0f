//! `SQLite` lock record store.
//!
//! Each conditional update is a single `UPDATE ... WHERE id = ? AND (<predicate>)`
//! statement. `SQLite` takes the write lock before evaluating the `WHERE`
//! clause, so predicate and write are atomic, and concurrent writers on any
//! key are serialized by the database. The current time comes from
//! `julianday('now')` inside the statement, which is stable for the whole
//! statement, so the caller's clock never enters the decision.
//!
//! Expiries are stored as integer milliseconds since the Unix epoch.

use std::{str::FromStr, time::Duration};

use chrono::DateTime;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info};

use super::{LockRecordStore, Predicate, StoreBootstrap, Transition, UpdateOutcome};
use crate::{
    config::StoreConfig,
    record::{LockName, LockRecord},
    Error, Result,
};

/// Current time in epoch milliseconds, evaluated by the database.
const NOW_MILLIS: &str = "CAST(ROUND((julianday('now') - 2440587.5) * 86400000.0) AS INTEGER)";

/// Reject anything that is not a plain SQL identifier. The table name is
/// interpolated into statements, so this is the only thing standing between
/// configuration and SQL injection.
pub(crate) fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && table.len() <= 64 {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "table name '{table}' must match [A-Za-z_][A-Za-z0-9_]* (max 64 chars)"
        )))
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Lock records in an `SQLite` table keyed by lock name.
#[derive(Debug, Clone)]
pub struct SqliteLockStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteLockStore {
    /// Wrap an existing pool.
    pub fn new(pool: SqlitePool, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Open a pool as described by `config`.
    ///
    /// File databases use WAL and a busy timeout so concurrent writers from
    /// other processes queue instead of failing. In-memory databases are
    /// private to one connection, so the pool is capped at one.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        validate_table_name(&config.table)?;
        let url = config.database_url.as_str();
        let in_memory = is_in_memory(url);

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::invalid_config(format!("invalid database_url '{url}': {e}")))?
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let options = if in_memory {
            options
        } else {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            options.journal_mode(SqliteJournalMode::Wal)
        };

        let max_connections = if in_memory { 1 } else { config.max_connections };

        let pool_options = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1);
        // The database vanishes with its last connection.
        let pool_options = if in_memory {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| Error::unavailable(format!("failed to connect to '{url}': {e}")))?;

        debug!(url, table = %config.table, max_connections, "connected lock store");
        Self::new(pool, &config.table)
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// A missing table means bootstrap never ran for this database.
    fn store_error(lock: &LockName, err: &sqlx::Error) -> Error {
        let message = err.to_string();
        if message.contains("no such table") {
            Error::not_found(lock.as_str())
        } else {
            Error::unavailable(message)
        }
    }

    fn set_clause(transition: &Transition) -> String {
        match transition {
            Transition::Claim { .. } => format!("owner = ?, lease_expiry = ({NOW_MILLIS}) + ?"),
            Transition::Clear => format!("owner = '', lease_expiry = ({NOW_MILLIS})"),
        }
    }

    fn where_clause(predicate: &Predicate) -> String {
        match predicate {
            Predicate::Claimable => format!("owner = '' OR lease_expiry < ({NOW_MILLIS})"),
            Predicate::OwnedBy(_) => "owner = ?".to_string(),
        }
    }

    async fn exists(&self, lock: &LockName) -> Result<bool> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?", self.table);
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(lock.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::store_error(lock, &e))?;
        Ok(count > 0)
    }
}

#[async_trait::async_trait]
impl LockRecordStore for SqliteLockStore {
    async fn read(&self, lock: &LockName) -> Result<Option<LockRecord>> {
        let sql = format!(
            "SELECT id, owner, lease_expiry FROM {} WHERE id = ?",
            self.table
        );
        let row: Option<(String, String, i64)> = sqlx::query_as(&sql)
            .bind(lock.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::store_error(lock, &e))?;

        row.map(|(id, owner, expiry_millis)| {
            DateTime::from_timestamp_millis(expiry_millis)
                .map(|lease_expiry| LockRecord {
                    id,
                    owner,
                    lease_expiry,
                })
                .ok_or_else(|| {
                    Error::corrupt_record(
                        lock.as_str(),
                        format!("lease_expiry {expiry_millis} is out of range"),
                    )
                })
        })
        .transpose()
    }

    async fn conditional_update(
        &self,
        lock: &LockName,
        predicate: &Predicate,
        transition: &Transition,
    ) -> Result<UpdateOutcome> {
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? AND ({})",
            self.table,
            Self::set_clause(transition),
            Self::where_clause(predicate)
        );

        // Bind order follows placeholder order: SET, then id, then WHERE.
        let mut query = sqlx::query(&sql);
        if let Transition::Claim { owner, lease } = transition {
            query = query
                .bind(owner.as_str())
                .bind(Transition::lease_millis(*lease)?);
        }
        query = query.bind(lock.as_str());
        if let Predicate::OwnedBy(owner) = predicate {
            query = query.bind(owner.as_str());
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| Self::store_error(lock, &e))?;

        if result.rows_affected() > 0 {
            return Ok(UpdateOutcome::Applied);
        }

        // Records are never deleted, so existence checked after the fact
        // still tells a failed predicate from a missing record.
        if self.exists(lock).await? {
            Ok(UpdateOutcome::PredicateFailed)
        } else {
            Ok(UpdateOutcome::NotFound)
        }
    }
}

#[async_trait::async_trait]
impl StoreBootstrap for SqliteLockStore {
    async fn ensure_schema(&self) -> Result<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY NOT NULL,
                owner TEXT NOT NULL DEFAULT '',
                lease_expiry INTEGER NOT NULL DEFAULT 0
            ) WITHOUT ROWID",
            self.table
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::unavailable(format!("failed to create lock table: {e}")))?;
        Ok(())
    }

    async fn seed(&self, lock: &LockName) -> Result<bool> {
        let sql = format!(
            "INSERT INTO {} (id, owner, lease_expiry) VALUES (?, '', 0)
             ON CONFLICT(id) DO NOTHING",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(lock.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| Self::store_error(lock, &e))?;

        let created = result.rows_affected() > 0;
        if created {
            info!(lock = %lock, table = %self.table, "seeded lock record");
        }
        Ok(created)
    }
}

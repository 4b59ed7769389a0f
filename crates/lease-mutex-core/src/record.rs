//! Lock record model and validated identifiers.
//!
//! A [`LockRecord`] is the only persisted entity. The validated newtypes
//! [`LockName`] and [`Owner`] make it impossible to reach the store with a
//! blank key or a blank owner moniker, since the empty owner is the "unheld"
//! marker.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn require_non_blank(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::invalid_argument(
            field,
            "must not be empty or whitespace-only",
        ))
    } else {
        Ok(())
    }
}

/// Name of a lock; also its partition key in the store.
///
/// The value is kept exactly as given. Only blank names are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LockName(String);

impl LockName {
    /// Validate and wrap a lock name.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        require_non_blank("lock name", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LockName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Moniker of a lock holder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Owner(String);

impl Owner {
    /// Validate and wrap an owner moniker.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        require_non_blank("owner", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Owner {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stored state of one lock.
///
/// `owner` and `lease_expiry` only ever change together. An empty `owner`
/// means unheld; a populated owner whose lease has elapsed is also unheld,
/// the stale name is kept for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Lock name, immutable once created.
    pub id: String,
    /// Current holder, or empty when unheld.
    pub owner: String,
    /// Instant after which `owner` is stale.
    pub lease_expiry: DateTime<Utc>,
}

impl LockRecord {
    /// The record bootstrap seeds: no owner, lease expired at the Unix epoch.
    pub fn unheld(id: &LockName) -> Self {
        Self {
            id: id.as_str().to_string(),
            owner: String::new(),
            lease_expiry: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Whether the lock is held at `now`.
    pub fn is_held_at(&self, now: DateTime<Utc>) -> bool {
        !self.owner.is_empty() && self.lease_expiry > now
    }

    /// The live holder at `now`, if any.
    pub fn holder_at(&self, now: DateTime<Utc>) -> Option<&str> {
        self.is_held_at(now).then_some(self.owner.as_str())
    }

    /// Acquire write condition: nobody recorded, or the recorded lease has
    /// strictly elapsed. Ownership is not consulted, so a live holder cannot
    /// re-acquire its own lease.
    pub fn is_claimable_at(&self, now: DateTime<Utc>) -> bool {
        self.owner.is_empty() || self.lease_expiry < now
    }

    /// Release write condition: identity only, expiry is ignored.
    pub fn is_owned_by(&self, owner: &Owner) -> bool {
        self.owner == owner.as_str()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn held(owner: &str, expiry: DateTime<Utc>) -> LockRecord {
        LockRecord {
            id: "L".into(),
            owner: owner.into(),
            lease_expiry: expiry,
        }
    }

    #[test]
    fn test_blank_names_rejected() {
        for blank in ["", " ", "\t\n", "   "] {
            assert!(matches!(
                LockName::parse(blank),
                Err(Error::InvalidArgument { field: "lock name", .. })
            ));
            assert!(matches!(
                Owner::parse(blank),
                Err(Error::InvalidArgument { field: "owner", .. })
            ));
        }
    }

    #[test]
    fn test_names_kept_verbatim() -> Result<()> {
        let name = LockName::parse(" padded ")?;
        assert_eq!(name.as_str(), " padded ");
        assert_eq!(Owner::parse("host-1")?.to_string(), "host-1");
        Ok(())
    }

    #[test]
    fn test_seeded_record_is_unheld_and_claimable() -> Result<()> {
        let record = LockRecord::unheld(&LockName::parse("default-mutex")?);
        let now = Utc::now();
        assert_eq!(record.owner, "");
        assert_eq!(record.lease_expiry, DateTime::<Utc>::UNIX_EPOCH);
        assert!(!record.is_held_at(now));
        assert!(record.is_claimable_at(now));
        assert_eq!(record.holder_at(now), None);
        Ok(())
    }

    #[test]
    fn test_live_lease_is_held_and_not_claimable() {
        let now = Utc::now();
        let record = held("host-1", now + Duration::seconds(1));
        assert!(record.is_held_at(now));
        assert_eq!(record.holder_at(now), Some("host-1"));
        assert!(!record.is_claimable_at(now));
    }

    #[test]
    fn test_elapsed_lease_keeps_owner_but_is_unheld() {
        let now = Utc::now();
        let record = held("host-1", now - Duration::milliseconds(1));
        assert!(!record.is_held_at(now));
        assert!(record.is_claimable_at(now));
        assert_eq!(record.owner, "host-1");
    }

    #[test]
    fn test_boundary_instant_is_neither_held_nor_claimable() {
        let now = Utc::now();
        let record = held("host-1", now);
        assert!(!record.is_held_at(now));
        assert!(!record.is_claimable_at(now));
    }

    #[test]
    fn test_ownership_ignores_expiry() -> Result<()> {
        let now = Utc::now();
        let record = held("host-1", now - Duration::hours(1));
        assert!(record.is_owned_by(&Owner::parse("host-1")?));
        assert!(!record.is_owned_by(&Owner::parse("host-2")?));
        Ok(())
    }
}

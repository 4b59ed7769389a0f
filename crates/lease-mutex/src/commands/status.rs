//! Status command

use anyhow::Result;
use lease_mutex_core::LockStatus;

use crate::Context;

/// Human-readable multi-line description of a lock.
pub fn describe(status: &LockStatus) -> String {
    let record = &status.record;
    let state = if status.held {
        "held".to_string()
    } else if record.owner.is_empty() {
        "free".to_string()
    } else {
        format!("free (lease of {} elapsed)", record.owner)
    };
    let owner = if record.owner.is_empty() {
        "-"
    } else {
        record.owner.as_str()
    };

    format!(
        "Lock:    {}\nState:   {state}\nOwner:   {owner}\nExpires: {}",
        record.id,
        record.lease_expiry.to_rfc3339()
    )
}

/// Print the stored record for the configured lock.
///
/// # Errors
///
/// Returns an error if the record is missing or the store fails
pub async fn run(ctx: &Context, json: bool) -> Result<()> {
    let status = ctx.mutex.inspect(&ctx.config.lock.name, &ctx.call()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", describe(&status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use lease_mutex_core::LockRecord;

    use super::*;

    fn status(owner: &str, held: bool) -> LockStatus {
        let now = Utc::now();
        LockStatus {
            record: LockRecord {
                id: "default-mutex".into(),
                owner: owner.into(),
                lease_expiry: now + Duration::seconds(5),
            },
            held,
            observed_at: now,
        }
    }

    #[test]
    fn test_describe_states() {
        assert!(describe(&status("", false)).contains("State:   free\n"));
        assert!(describe(&status("host-1", true)).contains("State:   held"));
        assert!(describe(&status("host-1", false)).contains("lease of host-1 elapsed"));
        assert!(describe(&status("", false)).contains("Owner:   -"));
    }
}

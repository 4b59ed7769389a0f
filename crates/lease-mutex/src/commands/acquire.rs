//! Acquire command
//!
//! One attempt by default. With `--wait-ms` the attempt is repeated every
//! `client.poll_interval_ms` until it succeeds or the wait runs out; the
//! protocol itself never retries.

use std::time::Duration;

use anyhow::Result;
use tokio::time::Instant;
use tracing::debug;

use crate::{Context, Error};

/// Take the configured lock for the configured owner.
///
/// # Errors
///
/// Returns [`Error::Busy`] if the lock stayed held for the whole wait,
/// [`Error::Interrupted`] on Ctrl-C between attempts, or any store error.
pub async fn run(ctx: &Context, wait: Duration) -> Result<()> {
    let owner = ctx.config.owner();
    let lock = &ctx.config.lock.name;
    let lease = ctx.config.lease();
    let give_up_at = Instant::now() + wait;
    let mut attempts = 0_u32;

    loop {
        attempts += 1;
        if ctx.mutex.acquire(&owner, lock, lease, &ctx.call()).await? {
            println!("Acquired lock '{lock}' as {owner}");
            println!("  Lease:   {} ms", ctx.config.lock.lease_ms);
            // The expiry was stamped by the store's clock, so read it back.
            if let Ok(status) = ctx.mutex.inspect(lock, &ctx.call()).await {
                println!("  Expires: {}", status.record.lease_expiry.to_rfc3339());
            }
            return Ok(());
        }

        let now = Instant::now();
        if now >= give_up_at {
            break;
        }
        debug!(lock = %lock, attempts, "lock busy, waiting");

        let pause = ctx.config.poll_interval().min(give_up_at - now);
        tokio::select! {
            () = tokio::time::sleep(pause) => {}
            _ = ctx.interrupt.cancelled() => {
                return Err(Error::Interrupted { lock: lock.clone() }.into());
            }
        }
    }

    // Best effort: the holder may change between the attempt and this read.
    let holder = ctx
        .mutex
        .inspect(lock, &ctx.call())
        .await
        .ok()
        .and_then(|status| status.holder().map(str::to_string));

    Err(Error::Busy {
        lock: lock.clone(),
        holder,
    }
    .into())
}

//! Release command

use anyhow::Result;

use crate::{Context, Error};

/// Release the configured lock for the configured owner.
///
/// # Errors
///
/// Returns [`Error::NotHeld`] when the owner is not the stored owner, or
/// any store error.
pub async fn run(ctx: &Context) -> Result<()> {
    let owner = ctx.config.owner();
    let lock = &ctx.config.lock.name;

    if ctx.mutex.release(&owner, lock, &ctx.call()).await? {
        println!("Released lock '{lock}' held by {owner}");
        Ok(())
    } else {
        Err(Error::NotHeld {
            lock: lock.clone(),
            owner,
        }
        .into())
    }
}

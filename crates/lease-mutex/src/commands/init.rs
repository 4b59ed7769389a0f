//! Init command: create the lock table and seed records.

use anyhow::Result;
use lease_mutex_core::bootstrap;

use crate::Context;

/// Seed `locks`, or the configured lock plus `lock.seed` when empty.
///
/// # Errors
///
/// Returns an error for blank names or if the store fails
pub async fn run(ctx: &Context, locks: &[String]) -> Result<()> {
    let names = if locks.is_empty() {
        ctx.config.seed_names()
    } else {
        locks.to_vec()
    };

    let created = bootstrap(ctx.store(), &names).await?;
    let existing = names.len() - created;

    println!(
        "Initialized {} lock record(s) in table '{}' ({created} created, {existing} already present)",
        names.len(),
        ctx.store().table()
    );
    for name in &names {
        println!("  {name}");
    }
    Ok(())
}

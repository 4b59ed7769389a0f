//! Lock record bootstrap.
//!
//! The mutex never creates records; an operator (or deployment step) runs
//! this once per lock name. Safe to rerun: existing records, held or not,
//! are left exactly as they are.

use tracing::info;

use crate::{record::LockName, store::StoreBootstrap, Result};

/// Create the schema if needed and seed an unheld record for each name.
///
/// Every name is validated before the store is touched. Returns how many
/// records were newly created.
///
/// # Errors
///
/// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) for a blank name
/// - [`Error::Unavailable`](crate::Error::Unavailable) if the store fails
pub async fn bootstrap<B, N>(store: &B, names: &[N]) -> Result<usize>
where
    B: StoreBootstrap + ?Sized,
    N: AsRef<str>,
{
    let names = names
        .iter()
        .map(|name| LockName::parse(name.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    store.ensure_schema().await?;

    let mut created = 0;
    for name in &names {
        if store.seed(name).await? {
            created += 1;
        }
    }

    info!(requested = names.len(), created, "lock records bootstrapped");
    Ok(created)
}

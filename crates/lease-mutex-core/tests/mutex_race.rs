//! Concurrent acquirers: exactly one wins.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::doc_markdown,
    clippy::missing_errors_doc
)]

mod common;

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use lease_mutex_core::{Cancellation, Result};

const CONTENDERS: usize = 24;

async fn race(backend: common::Backend) -> Result<()> {
    let mutex = Arc::new(backend.mutex);

    let attempts = (0..CONTENDERS).map(|i| {
        let mutex = Arc::clone(&mutex);
        tokio::spawn(async move {
            let owner = format!("worker-{i}");
            let won = mutex
                .acquire(&owner, "contended", Duration::from_secs(60), &Cancellation::never())
                .await?;
            Ok::<_, lease_mutex_core::Error>((owner, won))
        })
    });

    let mut winners = Vec::new();
    for joined in join_all(attempts).await {
        let (owner, won) = joined.expect("task panicked")?;
        if won {
            winners.push(owner);
        }
    }

    assert_eq!(winners.len(), 1, "{}: winners {winners:?}", backend.name);

    let status = mutex.inspect("contended", &Cancellation::never()).await?;
    assert_eq!(status.holder(), Some(winners[0].as_str()), "{}", backend.name);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_race_has_single_winner() -> Result<()> {
    race(common::memory(&["contended"]).await?).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_race_has_single_winner() -> Result<()> {
    race(common::sqlite(&["contended"]).await?).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_race_after_expiry_has_single_winner() -> Result<()> {
    let backend = common::sqlite(&["contended"]).await?;
    assert!(
        backend
            .mutex
            .acquire("stale", "contended", Duration::from_millis(20), &Cancellation::never())
            .await?
    );
    tokio::time::sleep(Duration::from_millis(60)).await;
    race(backend).await
}

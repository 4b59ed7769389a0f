//! Caller-supplied cancellation for store round trips.
//!
//! A [`Cancellation`] fires either when its [`CancelHandle`] is triggered or
//! when its deadline passes, whichever comes first. Clones observe the same
//! signal, so one handle can abandon every call sharing it (e.g. on Ctrl-C).

use std::{fmt, future, time::Duration};

use tokio::{sync::watch, time::Instant};

/// Why a call was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The handle was triggered.
    Requested,
    /// The deadline passed before the store answered.
    DeadlineElapsed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("cancellation requested"),
            Self::DeadlineElapsed => f.write_str("deadline elapsed"),
        }
    }
}

/// Triggers every [`Cancellation`] created with it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Cancellation signal and/or deadline observed by each mutex operation.
#[derive(Debug, Clone)]
pub struct Cancellation {
    signal: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// A signal that never fires.
    pub const fn never() -> Self {
        Self {
            signal: None,
            deadline: None,
        }
    }

    /// Fires once `after` has elapsed from now.
    pub fn timeout(after: Duration) -> Self {
        Self::never().with_timeout(after)
    }

    /// A handle/signal pair with no deadline.
    pub fn pair() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (
            CancelHandle { tx },
            Self {
                signal: Some(rx),
                deadline: None,
            },
        )
    }

    /// Add a deadline `after` from now, keeping any earlier one.
    pub fn with_timeout(self, after: Duration) -> Self {
        let candidate = Instant::now() + after;
        let deadline = self
            .deadline
            .map_or(candidate, |existing| existing.min(candidate));
        Self {
            deadline: Some(deadline),
            ..self
        }
    }

    /// Non-blocking check, used before issuing a store call.
    pub fn reason(&self) -> Option<CancelReason> {
        if self.signal.as_ref().is_some_and(|rx| *rx.borrow()) {
            Some(CancelReason::Requested)
        } else if self.deadline.is_some_and(|at| Instant::now() >= at) {
            Some(CancelReason::DeadlineElapsed)
        } else {
            None
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Resolves when the signal fires. Pending forever for [`never`](Self::never).
    pub async fn cancelled(&self) -> CancelReason {
        let requested = async {
            match self.signal.clone() {
                Some(mut rx) => {
                    let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
                    if !fired {
                        // Handle dropped without firing.
                        future::pending::<()>().await;
                    }
                }
                None => future::pending::<()>().await,
            }
        };
        let elapsed = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            () = requested => CancelReason::Requested,
            () = elapsed => CancelReason::DeadlineElapsed,
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let cancel = Cancellation::never();
        assert!(!cancel.is_cancelled());
        let raced = tokio::time::timeout(Duration::from_millis(20), cancel.cancelled()).await;
        assert!(raced.is_err());
    }

    #[tokio::test]
    async fn test_handle_fires_all_clones() {
        let (handle, cancel) = Cancellation::pair();
        let clone = cancel.clone();
        assert!(!clone.is_cancelled());

        handle.cancel();

        assert_eq!(cancel.reason(), Some(CancelReason::Requested));
        assert_eq!(clone.cancelled().await, CancelReason::Requested);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires() {
        let cancel = Cancellation::timeout(Duration::from_millis(50));
        assert!(!cancel.is_cancelled());
        assert_eq!(cancel.cancelled().await, CancelReason::DeadlineElapsed);
        assert_eq!(cancel.reason(), Some(CancelReason::DeadlineElapsed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_keeps_earliest_deadline() {
        let cancel = Cancellation::timeout(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(60));
        let started = Instant::now();
        assert_eq!(cancel.cancelled().await, CancelReason::DeadlineElapsed);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_dropped_handle_never_fires() {
        let (handle, cancel) = Cancellation::pair();
        drop(handle);
        let raced = tokio::time::timeout(Duration::from_millis(20), cancel.cancelled()).await;
        assert!(raced.is_err());
        assert!(!cancel.is_cancelled());
    }
}

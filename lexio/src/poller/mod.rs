//! Generic polling loop for long-running server-side work.
//!
//! Both content-extraction jobs and research tasks share one loop: fetch the
//! status, report it, stop on a terminal state, a deadline, or cancellation.
//! The loop is deliberately simple — a fixed interval with no backoff, since
//! workload duration is server-controlled and unpredictable — and it never
//! retries a failed fetch; retry policy belongs to the transport.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::cancellation::CancellationToken;
use crate::config::PollConfig;
use crate::errors::LexioError;

/// A point-in-time view of a job or task with a terminal-state predicate.
///
/// Snapshots are immutable once read; the poller only ever replaces them with
/// a newer fetch.
pub trait TaskSnapshot {
    /// Whether no further state transition is expected.
    fn is_terminal(&self) -> bool;
}

/// Progress observer invoked with every snapshot, in fetch order.
pub type ProgressFn<'a, S> = &'a (dyn Fn(&S) + Send + Sync);

/// Errors from the polling loop, parametrized by the snapshot type so the
/// last-seen state stays fully typed.
#[derive(Debug, Error)]
pub enum PollError<S> {
    /// The deadline elapsed before a terminal state was observed. Carries the
    /// last-seen snapshot so the caller can inspect partial progress.
    #[error("did not reach a terminal state within {}s", waited.as_secs())]
    Timeout {
        /// The most recent snapshot, if any fetch succeeded.
        last: Option<Box<S>>,
        /// Total wall-clock time waited.
        waited: Duration,
    },

    /// The caller cancelled the wait via a [`CancellationToken`]. The remote
    /// job keeps running unless cancelled server-side as well.
    #[error("polling cancelled: {reason}")]
    Cancelled {
        /// The most recent snapshot, if any fetch succeeded.
        last: Option<Box<S>>,
        /// The cancellation reason from the token.
        reason: String,
    },

    /// A fetch or client failure, propagated immediately without retry.
    #[error(transparent)]
    Client(#[from] LexioError),
}

impl<S> PollError<S> {
    /// Returns the last-seen snapshot, if this error carries one.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&S> {
        match self {
            Self::Timeout { last, .. } | Self::Cancelled { last, .. } => last.as_deref(),
            Self::Client(_) => None,
        }
    }

    /// Flattens into a plain client error, for callers that do not need the
    /// last-seen snapshot. Timeouts and cancellations keep their message but
    /// drop the snapshot.
    #[must_use]
    pub fn into_client_error(self) -> LexioError {
        match self {
            Self::Client(err) => err,
            Self::Timeout { waited, .. } => LexioError::WaitTimeout {
                message: format!(
                    "did not reach a terminal state within {}s",
                    waited.as_secs()
                ),
            },
            Self::Cancelled { reason, .. } => LexioError::WaitCancelled { message: reason },
        }
    }
}

/// Polls `fetch_status` until the snapshot is terminal.
///
/// After every fetch the snapshot is handed to `on_progress` (if supplied)
/// before the termination check; snapshots arrive in strictly increasing
/// fetch order and observer panics are isolated so a faulty observer cannot
/// corrupt the loop. Termination conditions, in priority order: terminal
/// snapshot, elapsed deadline, otherwise sleep and refetch. Cancellation is
/// cooperative and takes effect at the next iteration boundary.
pub async fn poll_until_terminal<S, F, Fut>(
    fetch_status: F,
    config: &PollConfig,
    on_progress: Option<ProgressFn<'_, S>>,
    cancel: Option<&CancellationToken>,
) -> Result<S, PollError<S>>
where
    S: TaskSnapshot,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<S, LexioError>>,
{
    config.validate().map_err(LexioError::from)?;

    let interval = config.poll_interval();
    let max_wait = config.max_wait();
    let started = Instant::now();
    let mut last: Option<S> = None;

    loop {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(PollError::Cancelled {
                    last: last.map(Box::new),
                    reason: token
                        .reason()
                        .unwrap_or_else(|| "cancelled by caller".to_string()),
                });
            }
        }

        let snapshot = fetch_status().await?;

        if let Some(callback) = on_progress {
            let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback(&snapshot);
            }));
            if caught.is_err() {
                warn!("progress observer panicked; polling continues");
            }
        }

        if snapshot.is_terminal() {
            return Ok(snapshot);
        }

        let waited = started.elapsed();
        if waited >= max_wait {
            return Err(PollError::Timeout {
                last: Some(Box::new(snapshot)),
                waited,
            });
        }

        debug!(
            waited_secs = waited.as_secs(),
            "not terminal yet; sleeping before next poll"
        );
        last = Some(snapshot);
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct FakeStatus {
        state: &'static str,
        step: usize,
    }

    impl TaskSnapshot for FakeStatus {
        fn is_terminal(&self) -> bool {
            matches!(self.state, "completed" | "failed" | "cancelled")
        }
    }

    fn scripted(
        states: Vec<&'static str>,
    ) -> (Arc<AtomicUsize>, impl Fn() -> std::future::Ready<Result<FakeStatus, LexioError>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetch = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let state = states.get(n).copied().unwrap_or("processing");
            std::future::ready(Ok(FakeStatus { state, step: n }))
        };
        (calls, fetch)
    }

    fn fast() -> PollConfig {
        PollConfig::new().with_poll_interval(1.0).with_max_wait(3600.0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_terminal_snapshot_after_exact_fetch_count() {
        let (calls, fetch) = scripted(vec!["pending", "processing", "processing", "completed"]);

        let result = poll_until_terminal(fetch, &fast(), None, None).await.unwrap();

        assert_eq!(result.state, "completed");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_terminal_needs_single_fetch() {
        let (calls, fetch) = scripted(vec!["completed"]);

        let result = poll_until_terminal(fetch, &fast(), None, None).await.unwrap();

        assert_eq!(result.step, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_carries_last_snapshot_and_bounds_fetches() {
        let (calls, fetch) = scripted(vec![]);
        let config = PollConfig::new().with_poll_interval(1.0).with_max_wait(5.0);

        let err = poll_until_terminal(fetch, &config, None, None).await.unwrap_err();

        match err {
            PollError::Timeout { last, waited } => {
                assert!(last.is_some());
                assert!(waited >= Duration::from_secs(5));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // ceil(T/I) + 1 fetches at most.
        assert!(calls.load(Ordering::SeqCst) <= 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_observer_sees_every_snapshot_in_order() {
        let (_, fetch) = scripted(vec!["pending", "processing", "completed"]);
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = move |s: &FakeStatus| sink.lock().push(s.clone());

        poll_until_terminal(fetch, &fast(), Some(&observer), None)
            .await
            .unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen.iter().map(|s| s.step).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(seen[2].state, "completed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_observer_does_not_abort_polling() {
        let (calls, fetch) = scripted(vec!["processing", "completed"]);
        let observer = |_: &FakeStatus| panic!("observer bug");

        let result = poll_until_terminal(fetch, &fast(), Some(&observer), None).await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_before_next_fetch() {
        let token = Arc::new(CancellationToken::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let trip = token.clone();
        // Cancel from within the second fetch; the loop must observe it at
        // the next iteration boundary and issue no third fetch.
        let fetch = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                trip.cancel("user pressed ctrl-c");
            }
            std::future::ready(Ok(FakeStatus {
                state: "processing",
                step: n,
            }))
        };

        let err = poll_until_terminal(fetch, &fast(), None, Some(&token))
            .await
            .unwrap_err();

        match err {
            PollError::Cancelled { last, reason } => {
                assert_eq!(reason, "user pressed ctrl-c");
                assert_eq!(last.unwrap().step, 1);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_prevents_any_fetch() {
        let token = CancellationToken::new();
        token.cancel("never started");
        let (calls, fetch) = scripted(vec!["completed"]);

        let err = poll_until_terminal(fetch, &fast(), None, Some(&token))
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { last: None, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_any_fetch() {
        let (calls, fetch) = scripted(vec!["completed"]);
        let config = PollConfig::new().with_poll_interval(0.0);

        let err = poll_until_terminal(fetch, &config, None, None).await.unwrap_err();

        assert!(matches!(err, PollError::Client(LexioError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_without_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetch = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err::<FakeStatus, _>(LexioError::api(500, "boom")))
        };

        let err = poll_until_terminal(fetch, &fast(), None, None).await.unwrap_err();

        assert!(matches!(
            err,
            PollError::Client(LexioError::Api { status: 500, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.last_snapshot().is_none());
    }
}

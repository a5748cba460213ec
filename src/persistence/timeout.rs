//! Timeout combinator with cooperative cancellation
//!
//! [`with_timeout`] spawns the task and races it against a timer. When the
//! timer wins the caller gets [`TimeoutError::Elapsed`] and the task keeps
//! running; its [`CancelToken`] is signalled so it can stop early. A late
//! result is discarded.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::warn;

/// Timeout errors
#[derive(Error, Debug)]
pub enum TimeoutError {
    /// Budget elapsed before the task settled
    #[error("timed out after {0:?}")]
    Elapsed(Duration),

    /// Task panicked or was aborted
    #[error("task failed: {0}")]
    Join(#[from] JoinError),
}

/// Read side of a cancellation signal
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Write side of a cancellation signal
#[derive(Debug)]
pub struct CancelTrigger {
    tx: watch::Sender<bool>,
}

impl CancelToken {
    /// Create a linked trigger and token
    pub fn pair() -> (CancelTrigger, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelTrigger { tx }, CancelToken { rx })
    }

    /// A token that is never signalled
    pub fn never() -> Self {
        let (_trigger, token) = Self::pair();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is signalled; pends forever if the trigger
    /// is dropped without firing
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl CancelTrigger {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Run `task` on the tokio runtime, giving up after `budget`.
///
/// The task receives a [`CancelToken`] that is signalled when the budget
/// elapses. The task itself is never aborted.
pub async fn with_timeout<T, F, Fut>(task: F, budget: Duration) -> Result<T, TimeoutError>
where
    F: FnOnce(CancelToken) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let (trigger, token) = CancelToken::pair();
    let handle = tokio::spawn(task(token));

    tokio::select! {
        joined = handle => Ok(joined?),
        _ = tokio::time::sleep(budget) => {
            trigger.cancel();
            warn!("Task timed out after {:?}; signalled cancellation", budget);
            Err(TimeoutError::Elapsed(budget))
        }
    }
}

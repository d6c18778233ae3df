//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race an outbound call against a fixed deadline
//! - Report a timeout distinctly from the call's own errors
//!
//! # Design Decisions
//! - Uses Tokio's timer
//! - The raced call runs as its own task and is not cancelled when the deadline
//!   wins; it may still complete later and its result is dropped

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeadlineError {
    #[error("deadline of {0:?} elapsed")]
    Elapsed(Duration),

    #[error("task failed before completing: {0}")]
    Aborted(String),
}

/// Run `future` on its own task; whichever of it and the timer settles first wins.
pub async fn race_detached<F, T>(future: F, deadline: Duration) -> Result<T, DeadlineError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(future);
    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_error)) => Err(DeadlineError::Aborted(join_error.to_string())),
        Err(_) => Err(DeadlineError::Elapsed(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fast_future_wins() {
        let result = race_detached(async { 7 }, Duration::from_secs(1)).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wins_and_loser_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let result = race_detached(
            async move {
                tokio::time::sleep(Duration::from_secs(15)).await;
                flag.store(true, Ordering::SeqCst);
                "late"
            },
            Duration::from_secs(10),
        )
        .await;

        assert_eq!(result, Err(DeadlineError::Elapsed(Duration::from_secs(10))));
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_task_is_aborted() {
        let result = race_detached(
            async {
                if true {
                    panic!("boom");
                }
            },
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(DeadlineError::Aborted(_))));
    }
}

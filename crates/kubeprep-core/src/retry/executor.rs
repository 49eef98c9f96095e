//! Retry execution engine

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use crate::types::RetryPolicy;

use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver, TracingObserver};

/// Execute an async operation under a fixed-interval retry policy
///
/// Each failed attempt is logged through a [`TracingObserver`] named after
/// `operation`. Returns the first success or the last error once
/// `policy.max_attempts` attempts have failed.
pub async fn retry<F, Fut, T, E>(
    operation: &str,
    policy: &RetryPolicy,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetryExecutor::new(*policy)
        .with_observer(TracingObserver::new(operation))
        .execute(op)
        .await
}

/// A retry executor with a fixed-interval policy and an observer
pub struct RetryExecutor<O = NoOpObserver> {
    policy: RetryPolicy,
    observer: O,
}

impl RetryExecutor<NoOpObserver> {
    /// Create an executor with no observer
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            observer: NoOpObserver,
        }
    }
}

impl<O> RetryExecutor<O> {
    /// Set the observer
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutor<O2> {
        RetryExecutor {
            policy: self.policy,
            observer,
        }
    }
}

impl<O: RetryObserver> RetryExecutor<O> {
    /// Execute an operation with retry logic
    ///
    /// The delay is slept between attempts only, never after the last one,
    /// so an always-failing operation costs `max_attempts - 1` delays.
    pub async fn execute<F, Fut, T, E>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let start = Instant::now();
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            self.observer.on_attempt_start(attempt, max_attempts);

            match op().await {
                Ok(result) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(result);
                }
                Err(err) => {
                    if attempt >= max_attempts {
                        self.observer.on_exhausted(attempt, &err);
                        return Err(RetryError::exhausted(attempt, err, start.elapsed()));
                    }

                    let delay = self.policy.delay;
                    self.observer.on_attempt_failed(attempt, &err, delay);

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(RetryError::NoAttempts)
    }
}

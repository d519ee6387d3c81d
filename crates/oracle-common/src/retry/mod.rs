use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time;
use tracing::warn;

/// Outcome of a single attempt driven by a [`RetryPolicy`].
#[derive(Debug)]
pub enum Attempt<T, E> {
    /// The attempt succeeded, stop here
    Success(T),

    /// The attempt failed in a way that a fresh attempt may fix
    Retryable(E),

    /// The attempt failed and must not be attempted again
    Fatal(E),
}

/// Errors that know whether the operation that produced them can be attempted again.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl<T, E: Retryable> From<Result<T, E>> for Attempt<T, E> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(value) => Self::Success(value),
            Err(e) if e.is_retryable() => Self::Retryable(e),
            Err(e) => Self::Fatal(e),
        }
    }
}

const DEFAULT_ATTEMPTS: usize = 3;
const DEFAULT_BACKOFF_MILLISECONDS: u64 = 1000;

fn default_attempts() -> usize {
    DEFAULT_ATTEMPTS
}

fn default_backoff() -> u64 {
    DEFAULT_BACKOFF_MILLISECONDS
}

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    #[serde(default = "default_attempts")]
    pub attempts: usize,

    /// Delay between two attempts, in milliseconds
    #[serde(default = "default_backoff")]
    pub backoff: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF_MILLISECONDS,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, backoff: Duration) -> Self {
        Self {
            attempts,
            backoff: backoff.as_millis() as u64,
        }
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff)
    }

    /// Runs `f` until it returns [`Attempt::Success`] or [`Attempt::Fatal`], or until the
    /// attempts are exhausted in which case the last retryable error is returned. `f` receives
    /// the 1-based index of the current attempt and owns everything it produces, nothing is
    /// carried over from one attempt to the next.
    pub async fn run<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Attempt<T, E>>,
        E: Display,
    {
        let attempts = self.attempts.max(1);

        let mut attempt = 1;
        loop {
            match f(attempt).await {
                Attempt::Success(value) => return Ok(value),
                Attempt::Fatal(error) => return Err(error),
                Attempt::Retryable(error) if attempt >= attempts => {
                    warn!(attempt, attempts, %error, "giving up after last attempt");
                    return Err(error);
                },
                Attempt::Retryable(error) => {
                    warn!(attempt, attempts, %error, "attempt failed, retrying");
                    time::sleep(self.backoff()).await;

                    attempt += 1;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use thiserror::Error;

    use super::*;

    #[derive(Error, Debug, PartialEq, Eq)]
    enum Error {
        #[error("transient {0}")]
        Transient(usize),

        #[error("fatal {0}")]
        Fatal(usize),
    }

    impl Retryable for Error {
        fn is_retryable(&self) -> bool {
            matches!(self, Error::Transient(_))
        }
    }

    fn policy(attempts: usize) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn success_on_first_attempt_runs_once() {
        let calls = AtomicUsize::new(0);

        let result: Result<usize, Error> = policy(3)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Attempt::Success(attempt) }
            })
            .await;

        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retryable_errors_are_retried_until_success() {
        // Given
        let calls = AtomicUsize::new(0);

        // When
        let result: Result<usize, Error> = policy(3)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Attempt::from(match attempt {
                        1 | 2 => Err(Error::Transient(attempt)),
                        _ => Ok(attempt),
                    })
                }
            })
            .await;

        // Then
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn last_error_is_returned_when_attempts_are_exhausted() {
        let calls = AtomicUsize::new(0);

        let result: Result<usize, Error> = policy(3)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Attempt::from(Err::<usize, Error>(Error::Transient(attempt))) }
            })
            .await;

        assert_eq!(result, Err(Error::Transient(3)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);

        let result: Result<usize, Error> = policy(3)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Attempt::from(Err::<usize, Error>(Error::Fatal(attempt))) }
            })
            .await;

        assert_eq!(result, Err(Error::Fatal(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicUsize::new(0);

        let result: Result<usize, Error> = policy(0)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Attempt::from(Err::<usize, Error>(Error::Transient(attempt))) }
            })
            .await;

        assert_eq!(result, Err(Error::Transient(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn policy_defaults_match_configuration_defaults() {
        let policy: RetryPolicy = serde_json::from_str("{}").unwrap();

        assert_eq!(policy, RetryPolicy::default());
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.backoff(), Duration::from_secs(1));
    }
}

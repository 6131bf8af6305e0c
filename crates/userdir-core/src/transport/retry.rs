//! Bounded retry with linear backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How many attempts to make and how long to wait between them
///
/// The wait after attempt `n` is `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Linear backoff; `attempts` is clamped to at least one
    pub fn linear(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    /// A single attempt, no waiting
    pub fn none() -> Self {
        Self::linear(1, Duration::ZERO)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait before the attempt following `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(3, Duration::from_millis(1000))
    }
}

/// Result of running an operation under a `RetryPolicy`
#[derive(Debug, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    /// An attempt succeeded
    Succeeded { value: T, attempts: u32 },
    /// Every attempt failed; `error` is the last one
    Exhausted { error: E, attempts: u32 },
    /// A fatal error stopped retrying early
    Aborted { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. } => *attempts,
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Ok(value),
            RetryOutcome::Exhausted { error, .. } | RetryOutcome::Aborted { error, .. } => Err(error),
        }
    }
}

/// Run `op` until it succeeds, fails fatally, or runs out of attempts
///
/// `op` receives the 1-based attempt number.
pub async fn retry<T, E, F, Fut, P>(policy: &RetryPolicy, mut op: F, is_fatal: P) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                }
            }
            Err(error) if is_fatal(&error) => {
                return RetryOutcome::Aborted {
                    error,
                    attempts: attempt,
                }
            }
            Err(error) if attempt >= policy.attempts() => {
                return RetryOutcome::Exhausted {
                    error,
                    attempts: attempt,
                }
            }
            Err(error) => {
                let wait = policy.delay_for(attempt);
                warn!(
                    error = %error,
                    attempt = attempt,
                    wait_ms = wait.as_millis() as u64,
                    "Attempt failed, retrying with backoff"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::linear(attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts(), 3);
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_linear_backoff() {
        let base = Duration::from_millis(100);
        let started = tokio::time::Instant::now();
        let times = std::cell::RefCell::new(Vec::new());

        let outcome = retry(
            &RetryPolicy::linear(3, base),
            |_| {
                times.borrow_mut().push(started.elapsed());
                async { Err::<(), _>("boom") }
            },
            |_| false,
        )
        .await;

        assert!(matches!(outcome, RetryOutcome::Exhausted { attempts: 3, .. }));
        let times = times.into_inner();
        assert_eq!(times.len(), 3);
        assert_eq!(times[0], Duration::ZERO);

        // Paused clock: sleeps complete at their deadline, give or take a timer tick
        let tick = Duration::from_millis(1);
        let first_gap = times[1] - times[0];
        let second_gap = times[2] - times[1];
        assert!(first_gap >= base && first_gap <= base + tick, "{:?}", first_gap);
        assert!(second_gap >= base * 2 && second_gap <= base * 2 + tick, "{:?}", second_gap);
        // No sleep after the last attempt
        assert!(started.elapsed() <= base * 3 + tick * 2);
    }

    #[test]
    fn test_attempts_clamped() {
        assert_eq!(RetryPolicy::linear(0, Duration::ZERO).attempts(), 1);
        assert_eq!(RetryPolicy::none().attempts(), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = Cell::new(0);
        let outcome = retry(
            &fast(3),
            |attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt < 3 {
                        Err("boom")
                    } else {
                        Ok(attempt)
                    }
                }
            },
            |_| false,
        )
        .await;

        assert_eq!(
            outcome,
            RetryOutcome::Succeeded {
                value: 3,
                attempts: 3
            }
        );
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_keeps_last_error() {
        let outcome: RetryOutcome<(), String> = retry(
            &fast(2),
            |attempt| async move { Err(format!("failure {}", attempt)) },
            |_| false,
        )
        .await;

        assert_eq!(
            outcome,
            RetryOutcome::Exhausted {
                error: "failure 2".to_string(),
                attempts: 2
            }
        );
    }

    #[tokio::test]
    async fn test_fatal_error_aborts() {
        let calls = Cell::new(0);
        let outcome: RetryOutcome<(), &str> = retry(
            &fast(5),
            |_| {
                calls.set(calls.get() + 1);
                async { Err("fatal") }
            },
            |e| *e == "fatal",
        )
        .await;

        assert!(matches!(outcome, RetryOutcome::Aborted { attempts: 1, .. }));
        assert_eq!(calls.get(), 1);
        assert!(outcome.into_result().is_err());
    }
}

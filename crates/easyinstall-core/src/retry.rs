//! Bounded retry with a fixed backoff
//!
//! Flashing over USB serial fails transiently (the board is still booting,
//! another process holds the port, the auto-reset circuit misses). Erase and
//! write are each wrapped in [`retry`] with the same [`RetryPolicy`].

use std::fmt;
use std::thread;
use std::time::Duration;

/// How often and how patiently to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Pause between two attempts
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Policy used for flashing: 3 attempts, 5 seconds apart
    pub const DEFAULT: RetryPolicy = RetryPolicy {
        max_attempts: 3,
        backoff: Duration::from_secs(5),
    };

    /// `attempts` tries with no pause in between
    pub const fn immediate(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Every attempt failed
#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempts: {last}")]
pub struct RetryExhausted<E> {
    /// Number of attempts made
    pub attempts: u32,
    /// Error returned by the last attempt
    #[source]
    pub last: E,
}

/// Run `action` until it succeeds or the policy runs out of attempts
///
/// The closure receives the 1-based attempt number. Every failure is logged
/// with a warning. The backoff is only slept between attempts, never after
/// the last one. A policy with `max_attempts == 0` still runs once.
pub fn retry<T, E, F>(policy: &RetryPolicy, mut action: F) -> Result<T, RetryExhausted<E>>
where
    E: fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match action(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    log::debug!("Succeeded on attempt {}/{}", attempt, max);
                }
                return Ok(value);
            }
            Err(e) if attempt < max => {
                log::warn!("Attempt {}/{} failed: {}", attempt, max, e);
                if !policy.backoff.is_zero() {
                    log::info!("Retrying in {:?}", policy.backoff);
                    thread::sleep(policy.backoff);
                }
                attempt += 1;
            }
            Err(e) => {
                log::warn!("Attempt {}/{} failed: {}", attempt, max, e);
                return Err(RetryExhausted {
                    attempts: attempt,
                    last: e,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_success_runs_once() {
        let mut calls = 0;
        let result: Result<u32, RetryExhausted<String>> =
            retry(&RetryPolicy::immediate(3), |attempt| {
                calls += 1;
                Ok(attempt)
            });
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_two_failures_then_success() {
        let mut calls = 0;
        let result = retry(&RetryPolicy::immediate(3), |attempt| {
            calls += 1;
            if attempt < 3 {
                Err(format!("busy {}", attempt))
            } else {
                Ok("done")
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_exhausted_keeps_last_error() {
        let mut calls = 0;
        let result: Result<(), _> = retry(&RetryPolicy::immediate(3), |attempt| {
            calls += 1;
            Err(format!("failure {}", attempt))
        });
        let err = result.unwrap_err();
        assert_eq!(calls, 3);
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last, "failure 3");
        assert_eq!(err.to_string(), "gave up after 3 attempts: failure 3");
    }

    #[test]
    fn test_exhausted_exposes_last_error_as_source() {
        use std::error::Error;

        let result: Result<(), _> = retry(&RetryPolicy::immediate(2), |_| {
            Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "no sync"))
        });
        let err = result.unwrap_err();
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "no sync");
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let mut calls = 0;
        let result: Result<(), _> = retry(&RetryPolicy::immediate(0), |_| {
            calls += 1;
            Err("nope")
        });
        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_secs(5));
    }
}

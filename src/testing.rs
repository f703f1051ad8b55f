//! Testing utilities for code built on bulwark
//!
//! Provides a scripted work item for exercising retry policies, and assertion
//! macros for the outcomes of checks and executions.
//!
//! # Examples
//!
//! ## FlakyWork
//!
//! ```rust
//! use bulwark::testing::FlakyWork;
//! use bulwark::RetryPolicy;
//!
//! # tokio_test::block_on(async {
//! let work = FlakyWork::succeeding_with("done").failing(2, "busy");
//! let policy = RetryPolicy::with_max_attempts(3).unwrap();
//!
//! let handle = work.clone();
//! assert_eq!(policy.execute(move || handle.call()).await, Ok("done"));
//! assert_eq!(work.calls(), 3);
//! # });
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use bulwark::{assert_failed_with, assert_precondition, PreconditionKind, RetryPolicy};
//!
//! assert_precondition!(RetryPolicy::<()>::with_max_attempts(0), PreconditionKind::Argument);
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::with_max_attempts(1).unwrap();
//! assert_failed_with!(policy.execute(|| Err::<(), _>("nope")).await, "nope");
//! # });
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A work item that misbehaves a fixed number of times, then succeeds.
///
/// Call `n` (0-indexed) sleeps for the stall duration when `n` is below the
/// stall count, then fails when `n` is below the failure count. Clones share
/// one call counter.
///
/// # Example
///
/// ```rust
/// use bulwark::testing::FlakyWork;
/// use std::time::Duration;
///
/// let work = FlakyWork::succeeding_with(7)
///     .failing(1, "transient")
///     .stalling(1, Duration::from_millis(1));
///
/// assert_eq!(work.call(), Err("transient"));
/// assert_eq!(work.call(), Ok(7));
/// assert_eq!(work.calls(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FlakyWork<T, E> {
    value: T,
    error: Option<E>,
    failures: u32,
    stalls: u32,
    stall: Duration,
    calls: Arc<AtomicU32>,
}

impl<T: Clone, E: Clone> FlakyWork<T, E> {
    /// Work that succeeds with `value` on every call.
    pub fn succeeding_with(value: T) -> Self {
        Self {
            value,
            error: None,
            failures: 0,
            stalls: 0,
            stall: Duration::ZERO,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Fail the first `times` calls with `error`.
    pub fn failing(mut self, times: u32, error: E) -> Self {
        self.failures = times;
        self.error = Some(error);
        self
    }

    /// Make the first `times` calls take `duration` before answering.
    pub fn stalling(mut self, times: u32, duration: Duration) -> Self {
        self.stalls = times;
        self.stall = duration;
        self
    }

    /// Invoke the work item, blocking the thread while it stalls.
    pub fn call(&self) -> Result<T, E> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.stalls {
            std::thread::sleep(self.stall);
        }
        self.outcome(n)
    }

    /// Invoke the work item, sleeping on the tokio timer while it stalls.
    pub async fn call_async(&self) -> Result<T, E> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.stalls {
            tokio::time::sleep(self.stall).await;
        }
        self.outcome(n)
    }

    /// Number of calls started so far, across all clones.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn outcome(&self, n: u32) -> Result<T, E> {
        match &self.error {
            Some(error) if n < self.failures => Err(error.clone()),
            _ => Ok(self.value.clone()),
        }
    }
}

/// Assert that an execution ended with a timeout.
///
/// # Example
///
/// ```rust
/// use bulwark::{assert_timed_out, AttemptError};
/// use std::time::Duration;
///
/// let result: Result<(), AttemptError<String>> =
///     Err(AttemptError::timed_out(Duration::from_millis(500), 1));
/// assert_timed_out!(result);
/// ```
#[macro_export]
macro_rules! assert_timed_out {
    ($result:expr) => {
        match $result {
            Err($crate::AttemptError::TimedOut { .. }) => {}
            other => {
                panic!("Expected TimedOut, got {:?}", other);
            }
        }
    };
}

/// Assert that an execution ended with the given work-item error.
#[macro_export]
macro_rules! assert_failed_with {
    ($result:expr, $expected:expr) => {
        match $result {
            Err($crate::AttemptError::Failed(error)) => {
                assert_eq!(error, $expected);
            }
            other => {
                panic!("Expected Failed({:?}), got {:?}", $expected, other);
            }
        }
    };
}

/// Assert that a check failed with a precondition error of the given kind.
#[macro_export]
macro_rules! assert_precondition {
    ($result:expr, $kind:expr) => {
        match $result {
            Err(error) => {
                let error: $crate::PreconditionError = error;
                assert_eq!(error.kind(), $kind, "unexpected precondition error: {}", error);
            }
            Ok(_) => {
                panic!("Expected {:?} precondition error, got Ok", $kind);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttemptError, PreconditionError, PreconditionKind};

    #[test]
    fn flaky_work_fails_then_succeeds() {
        let work = FlakyWork::succeeding_with(1).failing(2, "down");

        assert_eq!(work.call(), Err("down"));
        assert_eq!(work.call(), Err("down"));
        assert_eq!(work.call(), Ok(1));
        assert_eq!(work.calls(), 3);
    }

    #[test]
    fn flaky_work_clones_share_counter() {
        let work = FlakyWork::<_, ()>::succeeding_with("x");
        let clone = work.clone();

        clone.call().unwrap();
        clone.call().unwrap();
        assert_eq!(work.calls(), 2);
    }

    #[tokio::test]
    async fn flaky_work_stalls_async() {
        tokio::time::pause();
        let work = FlakyWork::<_, ()>::succeeding_with(3).stalling(1, Duration::from_secs(60));

        let start = tokio::time::Instant::now();
        assert_eq!(work.call_async().await, Ok(3));
        assert!(start.elapsed() >= Duration::from_secs(60));

        let start = tokio::time::Instant::now();
        assert_eq!(work.call_async().await, Ok(3));
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn assert_timed_out_macro() {
        let result: Result<(), AttemptError<String>> =
            Err(AttemptError::timed_out(Duration::from_secs(1), 2));
        assert_timed_out!(result);
    }

    #[test]
    fn assert_failed_with_macro() {
        let result: Result<(), AttemptError<&str>> = Err(AttemptError::Failed("boom"));
        assert_failed_with!(result, "boom");
    }

    #[test]
    fn assert_precondition_macro() {
        let result: Result<(), PreconditionError> = Err(PreconditionError::argument("n"));
        assert_precondition!(result, PreconditionKind::Argument);
    }

    #[test]
    #[should_panic(expected = "Expected TimedOut")]
    fn assert_timed_out_panics_on_success() {
        let result: Result<i32, AttemptError<String>> = Ok(1);
        assert_timed_out!(result);
    }

    #[test]
    #[should_panic(expected = "Expected Failed")]
    fn assert_failed_with_panics_on_timeout() {
        let result: Result<(), AttemptError<&str>> =
            Err(AttemptError::timed_out(Duration::from_secs(1), 1));
        assert_failed_with!(result, "boom");
    }

    #[test]
    #[should_panic(expected = "precondition error, got Ok")]
    fn assert_precondition_panics_on_ok() {
        let result: Result<(), PreconditionError> = Ok(());
        assert_precondition!(result, PreconditionKind::InvalidState);
    }
}

//! Retry policy configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::precondition::{check_argument_msg, check_state_msg, PreconditionError};
use crate::retry::backoff::Backoff;

type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
type BackoffFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// How many times to attempt a unit of work, which failures to retry, and how
/// long each attempt may take.
///
/// A policy is a handle: clones share the same configuration and the same
/// running flag. While an execution is in flight, every clone refuses both
/// reconfiguration and a second execution with an `InvalidState` error.
///
/// Defaults: retry on every error, one second per attempt, timed-out attempts
/// left running in the background.
///
/// # Examples
///
/// ```rust
/// use bulwark::{Backoff, RetryPolicy};
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// enum FetchError { Throttled, NotFound }
///
/// let policy = RetryPolicy::with_max_attempts(4)?
///     .with_retry_predicate(|e: &FetchError| matches!(e, FetchError::Throttled))?
///     .with_backoff_strategy(Backoff::exponential(Duration::from_millis(250)))?;
///
/// assert_eq!(policy.max_attempts(), 4);
/// assert_eq!(policy.attempt_timeout(2), Duration::from_secs(1));
/// # Ok::<(), bulwark::PreconditionError>(())
/// ```
pub struct RetryPolicy<E> {
    shared: Arc<Shared<E>>,
}

struct Shared<E> {
    max_attempts: u32,
    running: AtomicBool,
    settings: Mutex<Settings<E>>,
}

struct Settings<E> {
    retry_when: RetryPredicate<E>,
    backoff: BackoffFn,
    abort_on_timeout: bool,
}

impl<E: 'static> RetryPolicy<E> {
    /// Create a policy that makes at most `max_attempts` attempts.
    ///
    /// Fails with an `Argument` error naming `max_attempts` when it is zero.
    ///
    /// ```rust
    /// use bulwark::{PreconditionKind, RetryPolicy};
    ///
    /// assert!(RetryPolicy::<String>::with_max_attempts(1).is_ok());
    ///
    /// let err = RetryPolicy::<String>::with_max_attempts(0).unwrap_err();
    /// assert_eq!(err.kind(), PreconditionKind::Argument);
    /// assert_eq!(err.parameter(), Some("max_attempts"));
    /// ```
    pub fn with_max_attempts(max_attempts: u32) -> Result<Self, PreconditionError> {
        check_argument_msg(max_attempts > 0, "max_attempts", "max_attempts must be > 0")?;

        let backoff = Backoff::default();
        Ok(Self {
            shared: Arc::new(Shared {
                max_attempts,
                running: AtomicBool::new(false),
                settings: Mutex::new(Settings {
                    retry_when: Arc::new(|_: &E| true),
                    backoff: Arc::new(move |attempt| backoff.timeout_for(attempt)),
                    abort_on_timeout: false,
                }),
            }),
        })
    }

    /// Decide which work-item errors are retried.
    ///
    /// Errors rejected by the predicate end the execution immediately.
    /// Timeouts are retried regardless of the predicate.
    pub fn with_retry_predicate<P>(self, predicate: P) -> Result<Self, PreconditionError>
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.configure("Cannot change retry predicate while running", |settings| {
            settings.retry_when = Arc::new(predicate);
        })
    }

    /// Set the function mapping a zero-based attempt index to the time that
    /// attempt is given before it is declared timed out.
    ///
    /// ```rust
    /// use bulwark::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::<String>::with_max_attempts(3)?
    ///     .with_backoff(|attempt| if attempt < 1 {
    ///         Duration::from_millis(500)
    ///     } else {
    ///         Duration::from_secs(5)
    ///     })?;
    ///
    /// assert_eq!(policy.attempt_timeout(0), Duration::from_millis(500));
    /// assert_eq!(policy.attempt_timeout(1), Duration::from_secs(5));
    /// # Ok::<(), bulwark::PreconditionError>(())
    /// ```
    pub fn with_backoff<B>(self, backoff: B) -> Result<Self, PreconditionError>
    where
        B: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.configure("Cannot change retry policy while running", |settings| {
            settings.backoff = Arc::new(backoff);
        })
    }

    /// Use one of the ready-made [`Backoff`] schedules.
    pub fn with_backoff_strategy(self, backoff: Backoff) -> Result<Self, PreconditionError> {
        self.with_backoff(move |attempt| backoff.timeout_for(attempt))
    }

    /// Abort the task of a timed-out attempt instead of leaving it running.
    ///
    /// Only work started with [`execute_async`](RetryPolicy::execute_async)
    /// can be stopped this way. Blocking work items from
    /// [`execute`](RetryPolicy::execute) run to completion on the blocking
    /// pool whatever this is set to.
    pub fn abort_on_timeout(self, abort: bool) -> Result<Self, PreconditionError> {
        self.configure("Cannot change timeout handling while running", |settings| {
            settings.abort_on_timeout = abort;
        })
    }

    fn configure(
        self,
        message: &'static str,
        apply: impl FnOnce(&mut Settings<E>),
    ) -> Result<Self, PreconditionError> {
        {
            let mut settings = self.settings();
            check_state_msg(!self.is_running(), message)?;
            apply(&mut *settings);
        }
        Ok(self)
    }

    /// Claim the running flag and snapshot the configuration for one execution.
    pub(crate) fn start(&self) -> Result<Execution<'_, E>, PreconditionError> {
        let running = &self.shared.running;
        check_state_msg(
            || {
                running
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            },
            "Task is already running",
        )?;
        let guard = RunningGuard(running);

        let settings = self.settings();
        Ok(Execution {
            max_attempts: self.shared.max_attempts,
            retry_when: Arc::clone(&settings.retry_when),
            backoff: Arc::clone(&settings.backoff),
            abort_on_timeout: settings.abort_on_timeout,
            _guard: guard,
        })
    }
}

impl<E> RetryPolicy<E> {
    /// Maximum number of attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.shared.max_attempts
    }

    /// Returns true while an execution is in flight.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Timeout the backoff function gives attempt N (0-indexed).
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        let backoff = Arc::clone(&self.settings().backoff);
        backoff(attempt)
    }

    fn settings(&self) -> MutexGuard<'_, Settings<E>> {
        // Every write is a single assignment, so a poisoned lock still holds valid settings.
        self.shared
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> std::fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.shared.max_attempts)
            .field("running", &self.is_running())
            .field("abort_on_timeout", &self.settings().abort_on_timeout)
            .field("retry_predicate", &"<fn>")
            .field("backoff", &"<fn>")
            .finish()
    }
}

/// Configuration frozen for the lifetime of one execution.
///
/// Dropping it releases the policy, on every exit path including unwinding
/// and cancellation of the execution future.
pub(crate) struct Execution<'a, E> {
    pub(crate) max_attempts: u32,
    retry_when: RetryPredicate<E>,
    backoff: BackoffFn,
    pub(crate) abort_on_timeout: bool,
    _guard: RunningGuard<'a>,
}

impl<E> Execution<'_, E> {
    pub(crate) fn timeout_for(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt)
    }

    pub(crate) fn should_retry(&self, error: &E) -> bool {
        (self.retry_when)(error)
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

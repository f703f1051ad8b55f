//! The attempt loop.
//!
//! Every attempt runs as its own tokio task and is raced against the timeout
//! the policy's backoff function gives it. Attempts never overlap: attempt
//! `n + 1` starts only once attempt `n` has succeeded, failed or timed out.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::retry::error::AttemptError;
use crate::retry::policy::RetryPolicy;

impl<E> RetryPolicy<E>
where
    E: Send + 'static,
{
    /// Run a blocking work item until it succeeds, fails permanently, or the
    /// attempt budget is spent.
    ///
    /// Each attempt calls `work` on tokio's blocking pool. Use `T = ()` for
    /// work that produces no value.
    ///
    /// A timed-out attempt is abandoned, not stopped: it keeps running in the
    /// background while the next attempt starts.
    ///
    /// # Panics
    ///
    /// A panic inside `work` is resumed in the caller, after the policy has
    /// been released.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bulwark::RetryPolicy;
    ///
    /// # tokio_test::block_on(async {
    /// let policy = RetryPolicy::<String>::with_max_attempts(5).unwrap();
    ///
    /// let value = policy.execute(|| Ok("ok")).await;
    /// assert_eq!(value, Ok("ok"));
    /// # });
    /// ```
    pub async fn execute<T, F>(&self, work: F) -> Result<T, AttemptError<E>>
    where
        T: Send + 'static,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        let work = Arc::new(work);
        self.run_attempts(move || {
            let work = Arc::clone(&work);
            tokio::task::spawn_blocking(move || work())
        })
        .await
    }

    /// Like [`execute`](RetryPolicy::execute), for async work.
    ///
    /// `factory` builds a fresh future for every attempt, which is spawned
    /// onto the runtime. With [`abort_on_timeout`](RetryPolicy::abort_on_timeout)
    /// set, a timed-out attempt's task is aborted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bulwark::{AttemptError, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let policy = RetryPolicy::<String>::with_max_attempts(1)
    ///     .unwrap()
    ///     .with_backoff(|_| Duration::from_millis(20))
    ///     .unwrap();
    ///
    /// let result = policy
    ///     .execute_async(|| async {
    ///         tokio::time::sleep(Duration::from_secs(10)).await;
    ///         Ok::<_, String>(())
    ///     })
    ///     .await;
    ///
    /// assert!(matches!(result, Err(AttemptError::TimedOut { attempts: 1, .. })));
    /// # });
    /// ```
    pub async fn execute_async<T, F, Fut>(&self, factory: F) -> Result<T, AttemptError<E>>
    where
        T: Send + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.run_attempts(|| tokio::spawn(factory())).await
    }

    async fn run_attempts<T, S>(&self, mut spawn: S) -> Result<T, AttemptError<E>>
    where
        T: Send + 'static,
        S: FnMut() -> JoinHandle<Result<T, E>>,
    {
        let execution = self.start()?;
        let mut attempts = 0u32;

        loop {
            let timeout = execution.timeout_for(attempts);
            #[cfg(feature = "tracing")]
            tracing::debug!(attempt = attempts + 1, ?timeout, "starting attempt");

            let mut handle = spawn();
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(Ok(value))) => return Ok(value),
                Ok(Ok(Err(error))) => {
                    attempts += 1;
                    if attempts >= execution.max_attempts {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(attempts, "attempt failed, no attempts left");
                        return Err(AttemptError::Failed(error));
                    }
                    if !execution.should_retry(&error) {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(attempts, "attempt failed with a non-retryable error");
                        return Err(AttemptError::Failed(error));
                    }
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempts, "attempt failed, retrying");
                }
                Ok(Err(join_error)) => {
                    if join_error.is_panic() {
                        std::panic::resume_unwind(join_error.into_panic());
                    }
                    return Err(AttemptError::Cancelled);
                }
                Err(_elapsed) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempt = attempts + 1, ?timeout, "attempt timed out");
                    if execution.abort_on_timeout {
                        handle.abort();
                    }
                    attempts += 1;
                    if attempts >= execution.max_attempts {
                        return Err(AttemptError::timed_out(timeout, attempts));
                    }
                }
            }
        }
    }
}

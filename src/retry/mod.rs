//! Bounded retry with a timeout on every attempt.
//!
//! A [`RetryPolicy`] describes how many attempts to make, which errors are
//! worth another attempt, and how long each attempt is given. Executing a
//! work item through the policy runs each attempt as its own tokio task and
//! races it against that attempt's timeout:
//!
//! - **Success**: the value is returned, no further attempts are made
//! - **Work-item error**: retried while the predicate accepts it and attempts remain
//! - **Timeout**: retried while attempts remain, whatever the predicate says
//!
//! # Quick Start
//!
//! ```rust
//! use bulwark::RetryPolicy;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::with_max_attempts(3)
//!     .unwrap()
//!     .with_retry_predicate(|e: &std::io::Error| e.kind() == std::io::ErrorKind::Interrupted)
//!     .unwrap()
//!     .with_backoff(|attempt| Duration::from_millis(200 * (attempt as u64 + 1)))
//!     .unwrap();
//!
//! let calls = Arc::new(AtomicU32::new(0));
//! let counter = calls.clone();
//! let result = policy
//!     .execute(move || {
//!         if counter.fetch_add(1, Ordering::SeqCst) == 0 {
//!             Err(std::io::ErrorKind::Interrupted.into())
//!         } else {
//!             Ok(42)
//!         }
//!     })
//!     .await;
//!
//! assert_eq!(result.unwrap(), 42);
//! assert_eq!(calls.load(Ordering::SeqCst), 2);
//! # });
//! ```
//!
//! # Abandoned attempts
//!
//! A timed-out attempt is not waited for. Its task keeps running detached
//! unless [`RetryPolicy::abort_on_timeout`] is set, and even then only async
//! work items can be stopped.
//!
//! # Error Types
//!
//! - [`AttemptError`]: terminal failure of an execution
//! - [`PreconditionError`](crate::PreconditionError): invalid configuration, or
//!   reconfiguring a policy while it runs

mod backoff;
mod error;
mod execute;
mod policy;

pub use backoff::{Backoff, Schedule};
pub use error::AttemptError;
pub use policy::RetryPolicy;

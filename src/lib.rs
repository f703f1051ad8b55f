//! # Bulwark
//!
//! Small guards for code that has to fail loudly or try again.
//!
//! - [`precondition`]: fail-fast checks on arguments and receiver state
//! - [`verify`]: internal invariant assertions, reported separately from bad input
//! - [`retry`]: re-run a unit of work a bounded number of times, each attempt
//!   raced against its own timeout, retrying only the errors you call transient
//!
//! None of the checks panic. They return errors that propagate with `?`.
//!
//! ## Quick Example
//!
//! ```rust
//! use bulwark::{check_argument, AttemptError, PreconditionError, RetryPolicy};
//! use std::time::Duration;
//!
//! fn connect_policy(attempts: u32) -> Result<RetryPolicy<String>, PreconditionError> {
//!     check_argument!(attempts <= 10, "attempts", "at most 10 attempts, got {}", attempts)?;
//!     RetryPolicy::with_max_attempts(attempts)?
//!         .with_retry_predicate(|e: &String| e.starts_with("busy"))?
//!         .with_backoff(|attempt| Duration::from_millis(500) * (attempt + 1))
//! }
//!
//! # tokio_test::block_on(async {
//! let policy = connect_policy(3).unwrap();
//!
//! match policy.execute(|| Err::<(), _>("refused".to_string())).await {
//!     Err(AttemptError::Failed(e)) => assert_eq!(e, "refused"),
//!     other => panic!("Expected Failed, got {:?}", other),
//! }
//!
//! assert!(connect_policy(0).is_err());
//! assert!(connect_policy(11).is_err());
//! # });
//! ```
//!
//! ## Logging
//!
//! With the `tracing` feature enabled, retry executions emit `tracing` events
//! for every attempt, timeout and retry decision.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod condition;
pub mod precondition;
pub mod retry;
pub mod testing;
pub mod verify;

// Re-exports
pub use condition::Condition;
pub use precondition::{PreconditionError, PreconditionKind};
pub use retry::{AttemptError, Backoff, RetryPolicy};
pub use verify::InvariantViolation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::condition::Condition;
    pub use crate::precondition::{PreconditionError, PreconditionKind};
    pub use crate::retry::{AttemptError, Backoff, RetryPolicy};
    pub use crate::verify::InvariantViolation;
    pub use crate::{check_argument, check_not_null, check_state, ensure, ensure_not_null};
}

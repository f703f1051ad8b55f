//! Error type for retry executions.

use std::time::Duration;

use crate::precondition::PreconditionError;

/// Terminal failure of [`RetryPolicy::execute`](crate::RetryPolicy::execute).
///
/// Work-item errors are carried unchanged in [`AttemptError::Failed`].
///
/// # Examples
///
/// ```rust
/// use bulwark::{AttemptError, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::<&str>::with_max_attempts(2)
///     .unwrap()
///     .with_retry_predicate(|e| *e != "fatal")
///     .unwrap();
///
/// match policy.execute(|| Err::<(), _>("fatal")).await {
///     Err(AttemptError::Failed(e)) => assert_eq!(e, "fatal"),
///     other => panic!("Expected Failed, got {:?}", other),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError<E> {
    /// The final attempt did not finish within its allotted time.
    TimedOut {
        /// The timeout of the final attempt.
        duration: Duration,
        /// Total number of attempts made.
        attempts: u32,
    },
    /// The work item failed and the failure was not retried.
    Failed(E),
    /// The execution was refused before any attempt ran.
    Rejected(PreconditionError),
    /// The runtime cancelled an attempt before it completed.
    Cancelled,
}

impl<E> AttemptError<E> {
    /// Create a timeout error.
    pub fn timed_out(duration: Duration, attempts: u32) -> Self {
        Self::TimedOut { duration, attempts }
    }

    /// Returns true if the final attempt timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Returns true if this carries a work-item error.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if the execution was refused.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Get the work-item error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the work-item error if present.
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for AttemptError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimedOut { duration, attempts } => write!(
                f,
                "call timed out after {:?} (attempt {})",
                duration, attempts
            ),
            Self::Failed(e) => write!(f, "{}", e),
            Self::Rejected(e) => write!(f, "execution rejected: {}", e),
            Self::Cancelled => write!(f, "attempt was cancelled"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for AttemptError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Rejected(e) => Some(e),
            Self::TimedOut { .. } | Self::Cancelled => None,
        }
    }
}

impl<E> From<PreconditionError> for AttemptError<E> {
    fn from(error: PreconditionError) -> Self {
        Self::Rejected(error)
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_timed_out_display() {
        let err: AttemptError<String> = AttemptError::timed_out(Duration::from_millis(500), 3);
        let display = format!("{}", err);
        assert!(display.contains("timed out"));
        assert!(display.contains("500ms"));
        assert!(display.contains("attempt 3"));
    }

    #[test]
    fn test_failed_is_transparent() {
        let err = AttemptError::Failed("connection reset".to_string());
        assert_eq!(format!("{}", err), "connection reset");
        assert!(err.is_failed());
        assert_eq!(err.inner().map(String::as_str), Some("connection reset"));
        assert_eq!(err.into_inner(), Some("connection reset".to_string()));
    }

    #[test]
    fn test_timeout_has_no_inner() {
        let err: AttemptError<String> = AttemptError::timed_out(Duration::from_secs(1), 1);
        assert!(err.is_timeout());
        assert!(!err.is_failed());
        assert!(err.into_inner().is_none());
    }

    #[test]
    fn test_rejected_from_precondition() {
        let err: AttemptError<String> =
            PreconditionError::invalid_state("Task is already running").into();
        assert!(err.is_rejected());
        assert_eq!(
            format!("{}", err),
            "execution rejected: Task is already running"
        );
    }

    #[test]
    fn test_source_chains_to_work_item_error() {
        use std::error::Error;

        let io = std::io::Error::other("disk full");
        let err = AttemptError::Failed(io);
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk full".into()));

        let timeout: AttemptError<std::io::Error> =
            AttemptError::timed_out(Duration::from_secs(1), 1);
        assert!(timeout.source().is_none());
    }
}

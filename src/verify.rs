//! In-code invariant verification
//!
//! Where [`precondition`](crate::precondition) guards the boundary against bad
//! input, `verify` states what must already hold inside the implementation.
//! A failure here is a bug in the calling code, reported as an
//! [`InvariantViolation`] rather than an argument or state error.
//!
//! # Examples
//!
//! ```
//! use bulwark::{ensure, ensure_not_null, InvariantViolation};
//!
//! fn checksum(frames: &[u8], cursor: Option<usize>) -> Result<u8, InvariantViolation> {
//!     let cursor = ensure_not_null!(cursor, "cursor lost")?;
//!     ensure!(cursor <= frames.len(), "cursor {} past end {}", cursor, frames.len())?;
//!     Ok(frames[..cursor].iter().fold(0u8, |acc, b| acc.wrapping_add(*b)))
//! }
//!
//! assert_eq!(checksum(&[1, 2, 3], Some(2)), Ok(3));
//! assert_eq!(
//!     checksum(&[1], Some(4)).unwrap_err().to_string(),
//!     "invariant violation: cursor 4 past end 1"
//! );
//! ```

use std::fmt;

use crate::condition::Condition;

/// Error returned when an internal invariant does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvariantViolation {
    message: String,
}

impl InvariantViolation {
    /// Create a violation with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The rendered message, empty when none was given.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "invariant violation")
        } else {
            write!(f, "invariant violation: {}", self.message)
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Ensure an internal invariant holds.
pub fn ensure(condition: impl Condition) -> Result<(), InvariantViolation> {
    if condition.evaluate() {
        Ok(())
    } else {
        Err(InvariantViolation::default())
    }
}

/// Like [`ensure`], with a message rendered only on failure.
pub fn ensure_msg(
    condition: impl Condition,
    message: impl fmt::Display,
) -> Result<(), InvariantViolation> {
    if condition.evaluate() {
        Ok(())
    } else {
        Err(InvariantViolation::new(message.to_string()))
    }
}

/// Ensure a value that must exist is present, handing it back.
pub fn ensure_not_null<T>(reference: Option<T>) -> Result<T, InvariantViolation> {
    reference.ok_or_else(InvariantViolation::default)
}

/// Like [`ensure_not_null`], with a message rendered only on failure.
pub fn ensure_not_null_msg<T>(
    reference: Option<T>,
    message: impl fmt::Display,
) -> Result<T, InvariantViolation> {
    reference.ok_or_else(|| InvariantViolation::new(message.to_string()))
}

/// Verify an invariant, with an optional message template.
///
/// ```
/// use bulwark::ensure;
///
/// assert!(ensure!(1 + 1 == 2).is_ok());
/// assert!(ensure!(|| false, "never {}", "true").is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($condition:expr $(,)?) => {
        $crate::verify::ensure($condition)
    };
    ($condition:expr, $($template:tt)+) => {
        $crate::verify::ensure_msg($condition, ::core::format_args!($($template)+))
    };
}

/// Verify a value is present, with an optional message template.
#[macro_export]
macro_rules! ensure_not_null {
    ($reference:expr $(,)?) => {
        $crate::verify::ensure_not_null($reference)
    };
    ($reference:expr, $($template:tt)+) => {
        $crate::verify::ensure_not_null_msg($reference, ::core::format_args!($($template)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_condition_is_a_violation() {
        assert_eq!(ensure(false), Err(InvariantViolation::default()));
    }

    #[test]
    fn false_expression_is_a_violation() {
        assert!(ensure(|| false).is_err());
    }

    #[test]
    fn true_condition_completes() {
        assert!(ensure(true).is_ok());
        assert!(ensure(|| true).is_ok());
    }

    #[test]
    fn missing_value_is_a_violation() {
        assert!(ensure_not_null(None::<&str>).is_err());
    }

    #[test]
    fn present_value_is_returned() {
        assert_eq!(ensure_not_null(Some("")), Ok(""));
    }

    #[test]
    fn templated_message() {
        let err = crate::ensure!(false, "expected {} entries", 3).unwrap_err();
        assert_eq!(err.message(), "expected 3 entries");
        assert_eq!(err.to_string(), "invariant violation: expected 3 entries");

        let err = crate::ensure_not_null!(None::<u8>, "slot {} empty", 7).unwrap_err();
        assert_eq!(err.message(), "slot 7 empty");
    }

    #[test]
    fn default_message_is_empty() {
        let err = ensure(false).unwrap_err();
        assert_eq!(err.message(), "");
        assert_eq!(err.to_string(), "invariant violation");
    }
}

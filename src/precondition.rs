//! Fail-fast precondition checks
//!
//! These checks validate caller input (`check_argument`, `check_not_null`) and
//! the state of the receiver (`check_state`). They never panic: a failed check
//! returns a [`PreconditionError`] that the caller propagates with `?`.
//!
//! # Examples
//!
//! ```
//! use bulwark::{check_argument, check_not_null, check_state, PreconditionError};
//!
//! fn reserve(seats: Option<u32>, open: bool) -> Result<u32, PreconditionError> {
//!     let seats = check_not_null!(seats, "seats")?;
//!     check_argument!(seats <= 8, "seats", "at most 8 seats per booking, got {}", seats)?;
//!     check_state!(open, "booking is closed")?;
//!     Ok(seats)
//! }
//!
//! assert_eq!(reserve(Some(2), true), Ok(2));
//! assert_eq!(
//!     reserve(Some(9), true).unwrap_err().to_string(),
//!     "at most 8 seats per booking, got 9 (parameter 'seats')"
//! );
//! assert_eq!(reserve(None, true).unwrap_err().message(), "Value cannot be null.");
//! assert_eq!(reserve(Some(1), false).unwrap_err().message(), "booking is closed");
//! ```

use std::fmt;

use crate::condition::Condition;

/// Classification of a [`PreconditionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreconditionKind {
    /// An argument had an invalid value.
    Argument,
    /// A required argument was absent.
    NullArgument,
    /// The receiver was in a state that forbids the operation.
    InvalidState,
}

/// Error returned by a failed precondition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// An argument had an invalid value.
    Argument {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Rendered message.
        message: String,
    },
    /// A required argument was absent.
    NullArgument {
        /// Name of the missing parameter.
        parameter: &'static str,
        /// Rendered message.
        message: String,
    },
    /// The receiver was in a state that forbids the operation.
    InvalidState {
        /// Rendered message, empty when none was given.
        message: String,
    },
}

impl PreconditionError {
    /// Create an argument error with the default message.
    pub fn argument(parameter: &'static str) -> Self {
        Self::Argument {
            parameter,
            message: format!("Precondition check for '{}' failed.", parameter),
        }
    }

    /// Create a null-argument error with the default message.
    pub fn null_argument(parameter: &'static str) -> Self {
        Self::NullArgument {
            parameter,
            message: "Value cannot be null.".to_string(),
        }
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Replace the message carried by this error.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self {
            Self::Argument { parameter, .. } => Self::Argument { parameter, message },
            Self::NullArgument { parameter, .. } => Self::NullArgument { parameter, message },
            Self::InvalidState { .. } => Self::InvalidState { message },
        }
    }

    /// The kind of check that failed.
    pub fn kind(&self) -> PreconditionKind {
        match self {
            Self::Argument { .. } => PreconditionKind::Argument,
            Self::NullArgument { .. } => PreconditionKind::NullArgument,
            Self::InvalidState { .. } => PreconditionKind::InvalidState,
        }
    }

    /// The parameter the error refers to, if it is an argument error.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::Argument { parameter, .. } | Self::NullArgument { parameter, .. } => {
                Some(parameter)
            }
            Self::InvalidState { .. } => None,
        }
    }

    /// The rendered message.
    pub fn message(&self) -> &str {
        match self {
            Self::Argument { message, .. }
            | Self::NullArgument { message, .. }
            | Self::InvalidState { message } => message,
        }
    }
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument { parameter, message } | Self::NullArgument { parameter, message } => {
                write!(f, "{} (parameter '{}')", message, parameter)
            }
            Self::InvalidState { message } if message.is_empty() => write!(f, "invalid state"),
            Self::InvalidState { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for PreconditionError {}

/// Ensure the truth of a condition involving a parameter of the calling function.
///
/// # Examples
///
/// ```
/// use bulwark::precondition::check_argument;
///
/// assert!(check_argument(3 > 0, "count").is_ok());
///
/// let err = check_argument(|| "".len() > 0, "name").unwrap_err();
/// assert_eq!(err.message(), "Precondition check for 'name' failed.");
/// assert_eq!(err.parameter(), Some("name"));
/// ```
pub fn check_argument(
    condition: impl Condition,
    parameter: &'static str,
) -> Result<(), PreconditionError> {
    if condition.evaluate() {
        Ok(())
    } else {
        Err(PreconditionError::argument(parameter))
    }
}

/// Like [`check_argument`], with a caller-supplied message.
///
/// The message is only rendered when the check fails.
pub fn check_argument_msg(
    condition: impl Condition,
    parameter: &'static str,
    message: impl fmt::Display,
) -> Result<(), PreconditionError> {
    if condition.evaluate() {
        Ok(())
    } else {
        Err(PreconditionError::Argument {
            parameter,
            message: message.to_string(),
        })
    }
}

/// Ensure the truth of a condition involving the state of the caller.
///
/// # Examples
///
/// ```
/// use bulwark::precondition::check_state;
///
/// assert!(check_state(true).is_ok());
/// assert_eq!(check_state(false).unwrap_err().message(), "");
/// ```
pub fn check_state(condition: impl Condition) -> Result<(), PreconditionError> {
    if condition.evaluate() {
        Ok(())
    } else {
        Err(PreconditionError::invalid_state(String::new()))
    }
}

/// Like [`check_state`], with a caller-supplied message.
pub fn check_state_msg(
    condition: impl Condition,
    message: impl fmt::Display,
) -> Result<(), PreconditionError> {
    if condition.evaluate() {
        Ok(())
    } else {
        Err(PreconditionError::invalid_state(message.to_string()))
    }
}

/// Ensure a required argument is present, handing back the value.
///
/// # Examples
///
/// ```
/// use bulwark::precondition::check_not_null;
///
/// assert_eq!(check_not_null(Some("x"), "name"), Ok("x"));
/// assert!(check_not_null(None::<&str>, "name").is_err());
/// ```
pub fn check_not_null<T>(
    reference: Option<T>,
    parameter: &'static str,
) -> Result<T, PreconditionError> {
    reference.ok_or_else(|| PreconditionError::null_argument(parameter))
}

/// Like [`check_not_null`], with a caller-supplied message.
pub fn check_not_null_msg<T>(
    reference: Option<T>,
    parameter: &'static str,
    message: impl fmt::Display,
) -> Result<T, PreconditionError> {
    reference.ok_or_else(|| PreconditionError::NullArgument {
        parameter,
        message: message.to_string(),
    })
}

/// Check an argument, with an optional message template.
///
/// Expands to [`check_argument`] or [`check_argument_msg`]; the template takes
/// `format!`-style positional values.
///
/// ```
/// use bulwark::check_argument;
///
/// let port = 70_000;
/// let err = check_argument!(port <= 65_535, "port", "port {} out of range", port).unwrap_err();
/// assert_eq!(err.message(), "port 70000 out of range");
/// ```
#[macro_export]
macro_rules! check_argument {
    ($condition:expr, $parameter:expr $(,)?) => {
        $crate::precondition::check_argument($condition, $parameter)
    };
    ($condition:expr, $parameter:expr, $($template:tt)+) => {
        $crate::precondition::check_argument_msg(
            $condition,
            $parameter,
            ::core::format_args!($($template)+),
        )
    };
}

/// Check receiver state, with an optional message template.
///
/// ```
/// use bulwark::check_state;
///
/// let pending = 3;
/// let err = check_state!(pending == 0, "{} writes still pending", pending).unwrap_err();
/// assert_eq!(err.to_string(), "3 writes still pending");
/// ```
#[macro_export]
macro_rules! check_state {
    ($condition:expr $(,)?) => {
        $crate::precondition::check_state($condition)
    };
    ($condition:expr, $($template:tt)+) => {
        $crate::precondition::check_state_msg($condition, ::core::format_args!($($template)+))
    };
}

/// Check that a required argument is present, with an optional message template.
///
/// ```
/// use bulwark::check_not_null;
///
/// let host: Option<&str> = None;
/// let err = check_not_null!(host, "host", "no host configured").unwrap_err();
/// assert_eq!(err.to_string(), "no host configured (parameter 'host')");
/// ```
#[macro_export]
macro_rules! check_not_null {
    ($reference:expr, $parameter:expr $(,)?) => {
        $crate::precondition::check_not_null($reference, $parameter)
    };
    ($reference:expr, $parameter:expr, $($template:tt)+) => {
        $crate::precondition::check_not_null_msg(
            $reference,
            $parameter,
            ::core::format_args!($($template)+),
        )
    };
}

//! Plain and lazy boolean conditions
//!
//! Every check in [`precondition`](crate::precondition) and
//! [`verify`](crate::verify) accepts anything implementing [`Condition`]:
//! a `bool`, or a closure producing one. Closures are evaluated once,
//! immediately, by the check that receives them.

/// A boolean condition that can be evaluated once.
///
/// # Example
///
/// ```rust
/// use bulwark::Condition;
///
/// assert!(true.evaluate());
/// assert!(!(|| 1 > 2).evaluate());
/// ```
pub trait Condition {
    /// Evaluate the condition.
    fn evaluate(self) -> bool;
}

impl Condition for bool {
    #[inline]
    fn evaluate(self) -> bool {
        self
    }
}

// Blanket impl for closures
impl<F> Condition for F
where
    F: FnOnce() -> bool,
{
    #[inline]
    fn evaluate(self) -> bool {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn bool_evaluates_to_itself() {
        assert!(true.evaluate());
        assert!(!false.evaluate());
    }

    #[test]
    fn closure_is_called_exactly_once() {
        let calls = Cell::new(0);
        let result = (|| {
            calls.set(calls.get() + 1);
            true
        })
        .evaluate();

        assert!(result);
        assert_eq!(calls.get(), 1);
    }
}

//! Per-attempt timeout schedules.

use std::time::Duration;

/// A ready-made schedule mapping an attempt index to that attempt's timeout.
///
/// Install it with [`RetryPolicy::with_backoff_strategy`](crate::RetryPolicy::with_backoff_strategy),
/// or use any `Fn(u32) -> Duration` through
/// [`RetryPolicy::with_backoff`](crate::RetryPolicy::with_backoff).
///
/// # Examples
///
/// ```rust
/// use bulwark::Backoff;
/// use std::time::Duration;
///
/// let backoff = Backoff::exponential(Duration::from_millis(100))
///     .with_max(Duration::from_millis(500));
///
/// assert_eq!(backoff.timeout_for(0), Duration::from_millis(100));
/// assert_eq!(backoff.timeout_for(2), Duration::from_millis(400));
/// assert_eq!(backoff.timeout_for(3), Duration::from_millis(500)); // capped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    schedule: Schedule,
    max: Option<Duration>,
}

/// The growth pattern of a [`Backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Same timeout for every attempt.
    Constant(Duration),
    /// base * (attempt + 1).
    Linear {
        /// Base duration.
        base: Duration,
    },
    /// base * 2^attempt.
    Exponential {
        /// Base duration.
        base: Duration,
    },
    /// base * fib(attempt + 1).
    Fibonacci {
        /// Base duration.
        base: Duration,
    },
}

impl Backoff {
    /// Same timeout for every attempt.
    pub fn constant(timeout: Duration) -> Self {
        Self::from_schedule(Schedule::Constant(timeout))
    }

    /// Timeout grows linearly: 100ms, 200ms, 300ms, ...
    ///
    /// ```rust
    /// use bulwark::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::linear(Duration::from_millis(100));
    /// assert_eq!(backoff.timeout_for(2), Duration::from_millis(300));
    /// ```
    pub fn linear(base: Duration) -> Self {
        Self::from_schedule(Schedule::Linear { base })
    }

    /// Timeout doubles: 100ms, 200ms, 400ms, ...
    pub fn exponential(base: Duration) -> Self {
        Self::from_schedule(Schedule::Exponential { base })
    }

    /// Timeout follows the Fibonacci sequence: 100ms, 100ms, 200ms, 300ms, 500ms, ...
    pub fn fibonacci(base: Duration) -> Self {
        Self::from_schedule(Schedule::Fibonacci { base })
    }

    fn from_schedule(schedule: Schedule) -> Self {
        Self {
            schedule,
            max: None,
        }
    }

    /// Cap every timeout at `max`.
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }

    /// The growth pattern.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// The cap, if any.
    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    /// Timeout for attempt N (0-indexed).
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        let timeout = match self.schedule {
            Schedule::Constant(d) => d,
            Schedule::Linear { base } => base.saturating_mul(attempt.saturating_add(1)),
            Schedule::Exponential { base } => base.saturating_mul(2u32.saturating_pow(attempt)),
            Schedule::Fibonacci { base } => {
                base.saturating_mul(fibonacci(attempt.saturating_add(1)))
            }
        };

        match self.max {
            Some(max) => timeout.min(max),
            None => timeout,
        }
    }
}

impl Default for Backoff {
    /// One second for every attempt.
    fn default() -> Self {
        Self::constant(Duration::from_secs(1))
    }
}

/// Calculate the nth Fibonacci number.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    // fib(48) already saturates u32
    for _ in 1..n.min(64) {
        let temp = a.saturating_add(b);
        a = b;
        b = temp;
    }
    b
}

#[cfg(test)]
mod backoff_tests {
    use super::*;

    #[test]
    fn test_constant() {
        let backoff = Backoff::constant(Duration::from_millis(500));
        for attempt in [0, 1, 7, u32::MAX] {
            assert_eq!(backoff.timeout_for(attempt), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_linear() {
        let backoff = Backoff::linear(Duration::from_millis(100));

        assert_eq!(backoff.timeout_for(0), Duration::from_millis(100));
        assert_eq!(backoff.timeout_for(1), Duration::from_millis(200));
        assert_eq!(backoff.timeout_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_exponential() {
        let backoff = Backoff::exponential(Duration::from_millis(100));

        assert_eq!(backoff.timeout_for(0), Duration::from_millis(100));
        assert_eq!(backoff.timeout_for(1), Duration::from_millis(200));
        assert_eq!(backoff.timeout_for(3), Duration::from_millis(800));
    }

    #[test]
    fn test_fibonacci() {
        let backoff = Backoff::fibonacci(Duration::from_millis(100));

        // fib sequence: 1, 1, 2, 3, 5, 8...
        let expected = [100, 100, 200, 300, 500, 800];
        for (attempt, millis) in expected.iter().enumerate() {
            assert_eq!(
                backoff.timeout_for(attempt as u32),
                Duration::from_millis(*millis)
            );
        }
    }

    #[test]
    fn test_max_cap() {
        let backoff =
            Backoff::exponential(Duration::from_millis(100)).with_max(Duration::from_millis(500));

        assert_eq!(backoff.timeout_for(2), Duration::from_millis(400));
        assert_eq!(backoff.timeout_for(3), Duration::from_millis(500));
        assert_eq!(backoff.timeout_for(30), Duration::from_millis(500));
        assert_eq!(backoff.max(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_large_attempts_saturate() {
        let backoff = Backoff::exponential(Duration::MAX);
        assert_eq!(backoff.timeout_for(1), Duration::MAX);

        let backoff = Backoff::fibonacci(Duration::from_secs(1));
        assert_eq!(backoff.timeout_for(u32::MAX), Duration::from_secs(u32::MAX as u64));
    }

    #[test]
    fn test_default_is_one_second() {
        let backoff = Backoff::default();
        assert_eq!(backoff.schedule(), &Schedule::Constant(Duration::from_secs(1)));
        assert_eq!(backoff.timeout_for(4), Duration::from_secs(1));
    }

    #[test]
    fn test_fibonacci_function() {
        assert_eq!(fibonacci(0), 0);
        assert_eq!(fibonacci(1), 1);
        assert_eq!(fibonacci(2), 1);
        assert_eq!(fibonacci(3), 2);
        assert_eq!(fibonacci(7), 13);
    }
}

//! # Bounded fixed-delay retry.
//!
//! [`RetryPolicy`] declares a retry budget: a fixed delay between attempts
//! and a maximum number of retries. [`RetryCounter`] is the stateful side,
//! owned by the engine, one per retryable bring-up state.
//!
//! The contract matches the bring-up semantics exactly: a policy of
//! `max_attempts = 10` tolerates ten consecutive failures; the eleventh
//! exhausts the budget and [`RetryCounter::next`] returns `None`.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use cellvisor::{RetryCounter, RetryPolicy};
//!
//! let mut counter = RetryCounter::new(RetryPolicy::new(Duration::from_secs(1), 3));
//!
//! assert_eq!(counter.next(), Some(Duration::from_secs(1)));
//! assert_eq!(counter.next(), Some(Duration::from_secs(1)));
//! assert_eq!(counter.next(), Some(Duration::from_secs(1)));
//! assert_eq!(counter.next(), None); // 4th failure: budget exhausted
//!
//! counter.reset();
//! assert_eq!(counter.next(), Some(Duration::from_secs(1)));
//! ```

use std::time::Duration;

/// Declarative retry budget: fixed delay, bounded attempt count.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Delay before each retry.
    pub delay: Duration,
    /// Maximum number of retries tolerated before giving up.
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy with the given delay and retry cap.
    pub const fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }
}

/// Stateful counter driving one [`RetryPolicy`].
///
/// Owned by the engine; never shared between controller instances.
#[derive(Debug)]
pub struct RetryCounter {
    policy: RetryPolicy,
    used: u32,
}

impl RetryCounter {
    /// Creates a fresh counter for the given policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, used: 0 }
    }

    /// Consumes one retry from the budget.
    ///
    /// Returns `Some(delay)` while the budget allows another attempt,
    /// `None` once it is exhausted.
    pub fn next(&mut self) -> Option<Duration> {
        self.used += 1;
        if self.used <= self.policy.max_attempts {
            Some(self.policy.delay)
        } else {
            None
        }
    }

    /// Number of retries consumed so far.
    pub fn attempt(&self) -> u32 {
        self.used
    }

    /// Resets the counter for a fresh bring-up attempt.
    pub fn reset(&mut self) {
        self.used = 0;
    }
}

//! # Backoff for registration denials.
//!
//! [`DenialBackoff`] controls how long to wait before re-attempting
//! registration after the network explicitly denies it. It is parameterized
//! by:
//! - [`DenialBackoff::first`] the delay after the first denial;
//! - [`DenialBackoff::factor`] the multiplicative growth factor;
//! - [`DenialBackoff::max`] an optional delay ceiling.
//!
//! The delay after denial `n` (0-indexed) is `first × factor^n`, clamped to
//! `max` when one is set, then jitter is applied. The base delay is derived
//! purely from the denial count, so jitter output never feeds back into
//! subsequent calculations.
//!
//! The default is the historical bring-up behavior: 1 s doubling with **no
//! ceiling**. An uncapped backoff can silently grow to hours on a network
//! that keeps denying; deployments that care should set
//! [`DenialBackoff::max`].
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use cellvisor::DenialBackoff;
//!
//! let backoff = DenialBackoff::default();
//!
//! assert_eq!(backoff.delay_for(0), Duration::from_millis(1000));
//! assert_eq!(backoff.delay_for(1), Duration::from_millis(2000));
//! assert_eq!(backoff.delay_for(2), Duration::from_millis(4000));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Growing retry delay applied after successive registration denials.
#[derive(Clone, Copy, Debug)]
pub struct DenialBackoff {
    /// Delay after the first denial.
    pub first: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Optional delay ceiling. `None` preserves the historical unbounded growth.
    pub max: Option<Duration>,
    /// Jitter applied to the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for DenialBackoff {
    /// Returns the historical denial policy:
    /// - `first = 1s`;
    /// - `factor = 2.0` (doubling);
    /// - `max = None` (unbounded);
    /// - `jitter = None`.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            factor: 2.0,
            max: None,
            jitter: JitterPolicy::None,
        }
    }
}

impl DenialBackoff {
    /// Computes the delay for the given denial count (0-indexed).
    ///
    /// The base delay is `first × factor^denials`, clamped to
    /// [`DenialBackoff::max`] when a ceiling is set. Non-finite or negative
    /// intermediate values clamp to the ceiling (or to `Duration::MAX`
    /// without one).
    pub fn delay_for(&self, denials: u32) -> Duration {
        let clamped_exp = denials.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        let ceiling = self.max.unwrap_or(Duration::MAX);
        let base = if !unclamped_secs.is_finite()
            || unclamped_secs < 0.0
            || unclamped_secs > ceiling.as_secs_f64()
        {
            ceiling
        } else {
            Duration::from_secs_f64(unclamped_secs)
        };

        self.jitter.apply(base)
    }
}

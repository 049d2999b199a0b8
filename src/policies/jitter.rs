//! # Jitter for backoff delays.
//!
//! [`JitterPolicy`] adds randomness to denial-backoff delays so that a fleet
//! of modems denied by the same congested network does not re-register in
//! lockstep.
//!
//! - [`JitterPolicy::None`] — no randomization, predictable delays (default)
//! - [`JitterPolicy::Full`] — random delay in [0, base]
//! - [`JitterPolicy::Equal`] — delay = base/2 + random[0, base/2]

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of backoff delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    ///
    /// The default; a single modem retrying against one network has no herd
    /// to worry about, and predictable timing is easier to reason about.
    #[default]
    None,

    /// Full jitter: random delay in [0, base].
    ///
    /// Most aggressive spreading; can significantly shorten the delay.
    Full,

    /// Equal jitter: delay = base/2 + random[0, base/2].
    ///
    /// Preserves at least half of the backoff while still de-correlating.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given base delay.
    pub fn apply(&self, base: Duration) -> Duration {
        match self {
            JitterPolicy::None => base,
            JitterPolicy::Full => self.full_jitter(base),
            JitterPolicy::Equal => self.equal_jitter(base),
        }
    }

    /// Full jitter: random[0, base]
    fn full_jitter(&self, base: Duration) -> Duration {
        let ms = base.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::rng();
        Duration::from_millis(rng.random_range(0..=ms))
    }

    /// Equal jitter: base/2 + random[0, base/2]
    fn equal_jitter(&self, base: Duration) -> Duration {
        let ms = base.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let half = ms / 2;
        let jitter = if half == 0 {
            0
        } else {
            rand::rng().random_range(0..=half)
        };
        Duration::from_millis(half + jitter)
    }
}

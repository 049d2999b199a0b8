//! # Instance-owned retry and backoff counters.
//!
//! One [`RetryCounters`] lives inside each engine. Nothing here is static or
//! shared: two controllers, or two consecutive bring-up attempts on one
//! controller, never accumulate each other's counts. The whole set resets
//! whenever the owner rewinds to
//! [`PowerOn`](crate::CellularState::PowerOn) — that is what makes a rewind
//! a *fresh* bring-up attempt.

use crate::core::config::ControllerConfig;
use crate::policies::RetryCounter;

/// All mutable retry/backoff state of one engine.
#[derive(Debug)]
pub(crate) struct RetryCounters {
    /// Consecutive power-on failures.
    pub power: RetryCounter,
    /// Consecutive AT-mode entry failures.
    pub device_ready: RetryCounter,
    /// Consecutive SIM unlock failures.
    pub sim: RetryCounter,
    /// Consecutive registration-command failures.
    pub register: RetryCounter,
    /// Registration polls spent waiting on a "searching" modem.
    pub registration_wait: RetryCounter,
    /// Shared zero-delay retry budget (attach command/query failures).
    pub immediate: RetryCounter,
    /// Successive registration denials (indexes the denial backoff).
    pub denials: u32,
}

impl RetryCounters {
    pub(crate) fn new(cfg: &ControllerConfig) -> Self {
        Self {
            power: RetryCounter::new(cfg.power_retry),
            device_ready: RetryCounter::new(cfg.power_retry),
            sim: RetryCounter::new(cfg.sim_retry),
            register: RetryCounter::new(cfg.register_retry),
            registration_wait: RetryCounter::new(cfg.registration_wait),
            immediate: RetryCounter::new(crate::policies::RetryPolicy::new(
                std::time::Duration::ZERO,
                cfg.immediate_retry_budget,
            )),
            denials: 0,
        }
    }

    /// Starts a fresh bring-up attempt: every budget back to full.
    pub(crate) fn reset(&mut self) {
        self.power.reset();
        self.device_ready.reset();
        self.sim.reset();
        self.register.reset();
        self.registration_wait.reset();
        self.immediate.reset();
        self.denials = 0;
    }
}

//! # Controller configuration.
//!
//! [`ControllerConfig`] centralizes every tunable of the bring-up engine:
//! credentials (SIM PIN, PLMN), per-state retry budgets, the
//! registration-denial backoff, and runtime plumbing sizes.
//!
//! `Default` carries the historical bring-up constants:
//!
//! | Knob                  | Default        | Used by                        |
//! |-----------------------|----------------|--------------------------------|
//! | `power_retry`         | 1 s × 10       | PowerOn, DeviceReady           |
//! | `sim_retry`           | 1 s × 10       | SimPin                         |
//! | `register_retry`      | 1 s × 3        | RegisterNetwork                |
//! | `registration_wait`   | 1 s × 180      | RegisteringNetwork (searching) |
//! | `immediate_retry_budget` | 3           | attach command/query failures  |
//! | `denial_backoff`      | 1 s, ×2, uncapped | registration denials        |
//! | `sim_ready_poll`      | 100 ms × 30    | SIM settling after PIN entry   |

use std::time::Duration;

use crate::policies::{DenialBackoff, RetryPolicy};

/// All tunables of one [`Controller`](crate::Controller).
///
/// Credentials (`sim_pin`, `plmn`) are usually set through the controller's
/// setters before `start_dispatch`; the engine reads its own copy, so
/// mutating the config after start has no effect.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// PIN submitted when the SIM reports
    /// [`PinNeeded`](crate::capabilities::types::SimState::PinNeeded).
    /// `None` means no PIN is configured.
    pub sim_pin: Option<String>,

    /// Operator to force registration to. `None` selects automatic
    /// registration.
    pub plmn: Option<String>,

    /// Retry budget for power-on and AT-mode entry (each has its own counter).
    pub power_retry: RetryPolicy,

    /// Retry budget for SIM unlock.
    pub sim_retry: RetryPolicy,

    /// Retry budget for the explicit registration command.
    pub register_retry: RetryPolicy,

    /// How long to keep re-polling registration while the modem reports
    /// "searching" before escalating to an explicit registration command.
    pub registration_wait: RetryPolicy,

    /// Shared budget for immediate (zero-delay) retries of attach
    /// commands/queries. Exhausting it is a terminal failure.
    pub immediate_retry_budget: u32,

    /// Backoff applied after successive registration denials.
    pub denial_backoff: DenialBackoff,

    /// How often, and how many times, to re-read the SIM state while it
    /// settles after PIN submission.
    pub sim_ready_poll: RetryPolicy,

    /// Capacity of the owner→engine command channel (min 1).
    pub command_capacity: usize,

    /// How long [`Controller::stop`](crate::Controller::stop) waits for the
    /// engine to exit cooperatively before aborting it.
    pub stop_grace: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sim_pin: None,
            plmn: None,
            power_retry: RetryPolicy::new(Duration::from_secs(1), 10),
            sim_retry: RetryPolicy::new(Duration::from_secs(1), 10),
            register_retry: RetryPolicy::new(Duration::from_secs(1), 3),
            registration_wait: RetryPolicy::new(Duration::from_secs(1), 180),
            immediate_retry_budget: 3,
            denial_backoff: DenialBackoff::default(),
            sim_ready_poll: RetryPolicy::new(Duration::from_millis(100), 30),
            command_capacity: 8,
            stop_grace: Duration::from_secs(5),
        }
    }
}

impl ControllerConfig {
    /// Returns the command channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn command_capacity_clamped(&self) -> usize {
        self.command_capacity.max(1)
    }
}

//! # Connection events emitted by the engine.
//!
//! [`ConnectionEvent`] classifies everything the engine reports to its
//! observer:
//!
//! - **Transitions**: the state machine moved (or, in the steady
//!   `Connected` state, ticked in place).
//! - **Retries**: a failed step was re-armed after a delay.
//! - **Terminal failures**: the engine gave up and went idle.
//!
//! ## Delivery and ordering
//! Events are delivered synchronously from the engine task, in tick order,
//! one at a time. The observer's boolean return value is the cooperative
//! cancellation channel: `false` stops all further ticking (see
//! [`Observe`](crate::Observe)).
//!
//! ## Example
//! ```rust
//! use cellvisor::{CellularState, ConnectionEvent, FailureReason};
//!
//! fn describe(ev: &ConnectionEvent) -> String {
//!     match ev {
//!         ConnectionEvent::Transitioned { from, to } => format!("{from} -> {to}"),
//!         ConnectionEvent::RetryScheduled { state, attempt, delay } => {
//!             format!("retry {attempt} of {state} in {delay:?}")
//!         }
//!         ConnectionEvent::Failed { state, reason } => format!("{state}: {reason}"),
//!     }
//! }
//!
//! let ev = ConnectionEvent::Failed {
//!     state: CellularState::ConnectNetwork,
//!     reason: FailureReason::Connect,
//! };
//! assert_eq!(describe(&ev), "connect_network: network connect failed");
//! ```

use std::time::Duration;

use crate::error::FailureReason;
use crate::state::CellularState;

/// One notification from the engine to its observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The state machine committed a transition.
    ///
    /// The steady state reports itself as `Transitioned { Connected, Connected }`
    /// on every tick it receives.
    Transitioned {
        /// State the tick started in.
        from: CellularState,
        /// State the next tick will run in.
        to: CellularState,
    },

    /// A failed step was re-armed for another attempt.
    RetryScheduled {
        /// State being retried.
        state: CellularState,
        /// Consecutive failures of this state so far (1-based).
        attempt: u32,
        /// Delay before the next attempt.
        delay: Duration,
    },

    /// The engine gave up on this bring-up attempt and went idle.
    ///
    /// Reported exactly once per terminal failure. The engine stays idle
    /// until the owner rewinds it with
    /// [`Controller::continue_to_state`](crate::Controller::continue_to_state).
    Failed {
        /// State that failed.
        state: CellularState,
        /// Why bring-up was abandoned.
        reason: FailureReason,
    },
}

impl ConnectionEvent {
    /// Returns a short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConnectionEvent::Transitioned { .. } => "transitioned",
            ConnectionEvent::RetryScheduled { .. } => "retry_scheduled",
            ConnectionEvent::Failed { .. } => "failed",
        }
    }

    /// The state this event concerns.
    pub fn state(&self) -> CellularState {
        match self {
            ConnectionEvent::Transitioned { from, .. } => *from,
            ConnectionEvent::RetryScheduled { state, .. } => *state,
            ConnectionEvent::Failed { state, .. } => *state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_reports_where_the_event_happened() {
        let transitioned = ConnectionEvent::Transitioned {
            from: CellularState::PowerOn,
            to: CellularState::DeviceReady,
        };
        let retried = ConnectionEvent::RetryScheduled {
            state: CellularState::SimPin,
            attempt: 2,
            delay: Duration::from_secs(1),
        };
        let failed = ConnectionEvent::Failed {
            state: CellularState::ConnectNetwork,
            reason: FailureReason::Connect,
        };

        // A transition is attributed to the state the tick started in.
        assert_eq!(transitioned.state(), CellularState::PowerOn);
        assert_eq!(retried.state(), CellularState::SimPin);
        assert_eq!(failed.state(), CellularState::ConnectNetwork);
    }

    #[test]
    fn labels_are_stable() {
        let ev = ConnectionEvent::Transitioned {
            from: CellularState::Connected,
            to: CellularState::Connected,
        };
        assert_eq!(ev.as_label(), "transitioned");
    }
}

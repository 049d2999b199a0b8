//! Error types used by the cellvisor engine and capability drivers.
//!
//! This module defines three error enums:
//!
//! - [`CapabilityError`] — failures returned by the modem drivers themselves.
//! - [`ResourceError`] — failures of the orchestration plumbing (handle open,
//!   engine start, command submission).
//! - [`FailureReason`] — terminal bring-up failures reported to the owner
//!   through [`ConnectionEvent::Failed`](crate::ConnectionEvent::Failed).
//!
//! All three provide `as_label()` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by capability drivers.
///
/// Every modem operation is fallible; these are ordinary return values, not
/// panics. [`CapabilityError::Unsupported`] is special-cased by the engine:
/// power-on treats it as success, and registration queries skip a type that
/// reports it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The modem does not implement this operation.
    #[error("operation not supported by this modem")]
    Unsupported,

    /// The modem did not answer within the configured AT timeout.
    #[error("modem did not respond within {timeout:?}")]
    Timeout {
        /// The AT timeout that was exceeded.
        timeout: Duration,
    },

    /// Any other driver-level failure (bad response, channel error, ...).
    #[error("device error: {0}")]
    Device(String),
}

impl CapabilityError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CapabilityError::Unsupported => "cap_unsupported",
            CapabilityError::Timeout { .. } => "cap_timeout",
            CapabilityError::Device(_) => "cap_device",
        }
    }
}

/// # Errors produced by the orchestration plumbing.
///
/// Surfaced synchronously from [`Controller::init`](crate::Controller::init),
/// [`Controller::start_dispatch`](crate::Controller::start_dispatch) and
/// [`Controller::continue_to_state`](crate::Controller::continue_to_state).
/// Each of these tears down whatever it had set up before returning.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Opening a capability handle through the device failed.
    #[error("failed to open {what} handle: {source}")]
    HandleOpen {
        /// Which handle could not be opened ("power", "network", "sim").
        what: &'static str,
        /// The driver error.
        #[source]
        source: CapabilityError,
    },

    /// The controller was used before [`init`](crate::Controller::init) completed.
    #[error("controller not initialized")]
    NotInitialized,

    /// The engine task is already running.
    #[error("dispatch already running")]
    AlreadyRunning,

    /// A command could not be submitted to the engine (task gone or queue closed).
    #[error("failed to submit command to the engine")]
    Dispatch,
}

impl ResourceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cellvisor::ResourceError;
    ///
    /// assert_eq!(ResourceError::Dispatch.as_label(), "resource_dispatch");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ResourceError::HandleOpen { .. } => "resource_handle_open",
            ResourceError::NotInitialized => "resource_not_initialized",
            ResourceError::AlreadyRunning => "resource_already_running",
            ResourceError::Dispatch => "resource_dispatch",
        }
    }
}

/// # Terminal bring-up failures.
///
/// After one of these is reported the engine goes idle; it stays idle until
/// the owner rewinds it with
/// [`Controller::continue_to_state`](crate::Controller::continue_to_state)
/// (in practice, back to [`PowerOn`](crate::CellularState::PowerOn)).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Power-on or AT-mode entry kept failing past its retry budget.
    #[error("modem power-on failed")]
    Power,

    /// The SIM never became ready (or refused the configured PIN).
    #[error("entering SIM PIN failed")]
    SimPin,

    /// The explicit registration command kept failing past its retry budget.
    #[error("network registration failed")]
    Registration,

    /// Bringing up the data bearer failed (never retried).
    #[error("network connect failed")]
    Connect,

    /// The shared immediate-retry budget for attach commands ran out.
    #[error("retry budget exhausted")]
    RetriesExhausted,
}

impl FailureReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureReason::Power => "failure_power",
            FailureReason::SimPin => "failure_sim_pin",
            FailureReason::Registration => "failure_registration",
            FailureReason::Connect => "failure_connect",
            FailureReason::RetriesExhausted => "failure_retries_exhausted",
        }
    }
}

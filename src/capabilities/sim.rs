//! # SIM capability.
//!
//! [`Sim`] exposes SIM readiness and PIN submission. PIN handling policy
//! (when to submit, how long to wait for the SIM to settle) belongs to the
//! engine; the driver only performs single queries and submissions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capabilities::types::SimState;
use crate::error::CapabilityError;

/// Shared handle to a [`Sim`] implementation.
pub type SimRef = Arc<dyn Sim>;

/// SIM state queries and PIN submission.
#[async_trait]
pub trait Sim: Send + Sync + 'static {
    /// Queries the current SIM state.
    async fn get_sim_state(&self) -> Result<SimState, CapabilityError>;

    /// Submits the PIN code to unlock the SIM.
    ///
    /// A wrong PIN is a driver error, not a panic; repeated wrong PINs
    /// eventually move the SIM to [`SimState::PukNeeded`].
    async fn set_pin(&self, pin: &str) -> Result<(), CapabilityError>;
}

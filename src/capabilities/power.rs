//! # Radio power capability.
//!
//! [`Power`] controls the modem's power rail and its transition into
//! AT-command mode. Both steps may take several driver-side retries on real
//! hardware; the trait exposes each attempt as one fallible call and leaves
//! retry policy to the engine.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CapabilityError;

/// Shared handle to a [`Power`] implementation.
pub type PowerRef = Arc<dyn Power>;

/// Controls modem power and AT-mode entry.
///
/// A driver that has no software power control should return
/// [`CapabilityError::Unsupported`] from [`on`](Power::on) /
/// [`off`](Power::off); the engine treats that as success.
#[async_trait]
pub trait Power: Send + Sync + 'static {
    /// Powers the radio module on.
    async fn on(&self) -> Result<(), CapabilityError>;

    /// Powers the radio module off.
    ///
    /// Used as a best-effort fallback when [`on`](Power::on) fails, so the
    /// next attempt starts from a clean rail.
    async fn off(&self) -> Result<(), CapabilityError>;

    /// Switches the modem into AT-command mode.
    ///
    /// Succeeds only once the modem is actually ready to take commands;
    /// until then drivers report a retryable error.
    async fn set_at_mode(&self) -> Result<(), CapabilityError>;
}

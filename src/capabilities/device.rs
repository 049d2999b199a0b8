//! # Device capability: factory and lifecycle.
//!
//! [`Device`] is the single entry point to a physical modem channel. It
//! hands out the narrower capability handles, owns the AT timeout applied to
//! subsequent operations, and is the only place handles are closed.
//!
//! ## Rules
//! - `open_*` calls are **idempotent**: opening an already-open handle
//!   returns the existing one.
//! - One [`Controller`](crate::Controller) exclusively owns one `Device`
//!   (and the handles opened from it) for its whole lifetime.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::capabilities::{InformationRef, NetworkRef, PowerRef, SimRef};
use crate::error::CapabilityError;

/// Shared handle to a [`Device`] implementation.
pub type DeviceRef = Arc<dyn Device>;

/// Factory and lifecycle interface over one physical modem channel.
#[async_trait]
pub trait Device: Send + Sync + 'static {
    /// Opens (or returns the already-open) power handle.
    async fn open_power(&self) -> Result<PowerRef, CapabilityError>;

    /// Opens (or returns the already-open) network handle.
    async fn open_network(&self) -> Result<NetworkRef, CapabilityError>;

    /// Opens (or returns the already-open) SIM handle.
    async fn open_sim(&self) -> Result<SimRef, CapabilityError>;

    /// Opens (or returns the already-open) information handle.
    async fn open_information(&self) -> Result<InformationRef, CapabilityError>;

    /// Sets the AT response timeout applied to subsequent operations.
    fn set_timeout(&self, timeout: Duration);

    /// Closes the power handle. No-op if it was never opened.
    async fn close_power(&self);

    /// Closes the network handle. No-op if it was never opened.
    async fn close_network(&self);
}

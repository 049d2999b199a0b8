//! # Network capability: registration, attach, bearer.
//!
//! [`Network`] covers the three network-side phases of bring-up:
//!
//! 1. **Registration** — establishing the modem on the operator's signaling
//!    plane ([`set_registration`](Network::set_registration),
//!    [`get_registration_status`](Network::get_registration_status));
//! 2. **Attach** — obtaining packet-data capability
//!    ([`set_attach`](Network::set_attach), [`get_attach`](Network::get_attach));
//! 3. **Connect** — bringing up the actual data bearer
//!    ([`connect`](Network::connect)).
//!
//! The engine decides when to call what; the driver only translates each
//! call into the matching AT exchange.

use std::sync::Arc;

use async_trait::async_trait;

use crate::capabilities::types::{AttachStatus, RegistrationStatus, RegistrationType};
use crate::error::CapabilityError;

/// Shared handle to a [`Network`] implementation.
pub type NetworkRef = Arc<dyn Network>;

/// Registration, packet-data attach, and bearer control.
#[async_trait]
pub trait Network: Send + Sync + 'static {
    /// Requests registration.
    ///
    /// `plmn = Some(..)` forces registration to that operator;
    /// `None` selects automatic registration.
    async fn set_registration(&self, plmn: Option<&str>) -> Result<(), CapabilityError>;

    /// Queries registration status for one technology.
    ///
    /// Drivers return [`CapabilityError::Unsupported`] for technologies the
    /// modem does not implement; the engine skips those.
    async fn get_registration_status(
        &self,
        reg_type: RegistrationType,
    ) -> Result<RegistrationStatus, CapabilityError>;

    /// Queries the packet-data attach status.
    async fn get_attach(&self) -> Result<AttachStatus, CapabilityError>;

    /// Requests a packet-data attach.
    async fn set_attach(&self) -> Result<(), CapabilityError>;

    /// Brings up the data bearer (PPP or native IP).
    async fn connect(&self) -> Result<(), CapabilityError>;
}

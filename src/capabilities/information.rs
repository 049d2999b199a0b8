//! # Device-information capability (best-effort).
//!
//! [`Information`] reports identity strings. The engine only uses it for
//! logging once the modem is ready; any failure here is logged and ignored,
//! never retried, and never affects bring-up.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CapabilityError;

/// Shared handle to an [`Information`] implementation.
pub type InformationRef = Arc<dyn Information>;

/// Modem identity strings.
#[async_trait]
pub trait Information: Send + Sync + 'static {
    /// Returns the manufacturer string (e.g. from `AT+CGMI`).
    async fn manufacturer(&self) -> Result<String, CapabilityError>;

    /// Returns the model string (e.g. from `AT+CGMM`).
    async fn model(&self) -> Result<String, CapabilityError>;

    /// Returns the firmware revision string (e.g. from `AT+CGMR`).
    async fn revision(&self) -> Result<String, CapabilityError>;
}

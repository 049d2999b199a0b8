//! # Core observer trait.
//!
//! `Observe` is the extension point for reacting to bring-up progress. It is
//! called from the engine task between capability calls, so implementations
//! should avoid blocking the runtime (prefer async I/O and short work).
//!
//! ## Contract
//! - Events arrive **in tick order**, one at a time; the engine awaits the
//!   observer before doing anything else.
//! - Returning `false` is a **cooperative cancellation request**: the engine
//!   schedules no further ticks and performs no other cleanup (handles stay
//!   open until [`Controller::stop`](crate::Controller::stop)).
//! - The return value of a [`Failed`](crate::ConnectionEvent::Failed)
//!   notification is ignored; the engine idles after a terminal failure
//!   regardless.

use async_trait::async_trait;
use std::sync::Arc;

use crate::events::ConnectionEvent;

/// Shared handle to an [`Observe`] implementation.
pub type ObserverRef = Arc<dyn Observe>;

/// Contract for bring-up observers.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// Return `true` to let the engine continue scheduling ticks, `false` to
    /// stop it cooperatively.
    async fn on_event(&self, event: &ConnectionEvent) -> bool;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

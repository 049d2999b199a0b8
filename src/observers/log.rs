//! # Tracing-backed observer for demos and debugging.
//!
//! [`LogObserver`] logs every event and never cancels. It is the observer a
//! controller starts with until the owner installs its own via
//! [`Controller::set_observer`](crate::Controller::set_observer).
//!
//! ## Output shape
//! ```text
//! INFO  transition from=power_on to=device_ready
//! WARN  retry state=power_on attempt=3 delay=1s
//! ERROR bring-up failed state=connect_network reason=failure_connect
//! ```

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::ConnectionEvent;
use crate::observers::observe::Observe;

/// Logs all events via `tracing`; always continues.
#[derive(Debug, Default)]
pub struct LogObserver;

#[async_trait]
impl Observe for LogObserver {
    async fn on_event(&self, event: &ConnectionEvent) -> bool {
        match event {
            ConnectionEvent::Transitioned { from, to } => {
                info!(from = from.as_label(), to = to.as_label(), "transition");
            }
            ConnectionEvent::RetryScheduled {
                state,
                attempt,
                delay,
            } => {
                warn!(state = state.as_label(), attempt, ?delay, "retry");
            }
            ConnectionEvent::Failed { state, reason } => {
                error!(
                    state = state.as_label(),
                    reason = reason.as_label(),
                    "bring-up failed"
                );
            }
        }
        true
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

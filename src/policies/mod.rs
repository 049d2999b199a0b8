//! Retry and backoff policies.
//!
//! This module groups the knobs that control **how many times** a bring-up
//! step is retried and **how long** to wait between attempts.
//!
//! ## Contents
//! - [`RetryPolicy`] fixed delay + bounded attempt count (declarative)
//! - [`RetryCounter`] the stateful counter driving one policy
//! - [`DenialBackoff`] growing delay for registration denials (first / factor / max)
//! - [`JitterPolicy`]  randomization to avoid synchronized retries across a fleet
//!
//! ## Quick wiring
//! ```text
//! ControllerConfig { power_retry, sim_retry, register_retry, ... : RetryPolicy }
//!      └─► core::counters::RetryCounters builds one RetryCounter per policy
//!           └─► core::engine ticks call counter.next():
//!                - Some(delay) → re-arm the same state after `delay`
//!                - None        → retry budget exhausted → terminal failure
//! ```
//!
//! ## Counter ownership
//! All counters are owned by the engine instance and reset whenever the owner
//! rewinds to [`PowerOn`](crate::CellularState::PowerOn). Two controllers, or
//! two consecutive bring-up attempts on one controller, never share counts.

mod backoff;
mod jitter;
mod retry;

pub use backoff::DenialBackoff;
pub use jitter::JitterPolicy;
pub use retry::{RetryCounter, RetryPolicy};

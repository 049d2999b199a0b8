//! Owner-facing notification events.
//!
//! The engine reports everything it does over one channel: the
//! [`Observe`](crate::Observe) trait receives [`ConnectionEvent`]s. The event
//! is a tagged sum type, so owners pattern-match transitions, retries and
//! terminal failures instead of inferring them from an (old, new) pair.

mod event;

pub use event::ConnectionEvent;

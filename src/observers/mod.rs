//! Observers: the owner's view of bring-up progress.
//!
//! The engine delivers every [`ConnectionEvent`](crate::ConnectionEvent) to
//! exactly one [`Observe`] implementation, synchronously, in tick order. The
//! observer's boolean return value doubles as the cooperative cancellation
//! channel.
//!
//! ## Contents
//! - [`Observe`] the owner-facing trait
//! - [`LogObserver`] a tracing-backed implementation for demos and tests

mod log;
mod observe;

pub use log::LogObserver;
pub use observe::{Observe, ObserverRef};

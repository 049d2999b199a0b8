//! Runtime core: the controller and its engine.
//!
//! This module contains the bring-up runtime. The public API from this
//! module is [`Controller`] plus its [`ControllerConfig`]; the engine that
//! actually walks the state machine is internal.
//!
//! Internal modules:
//! - [`engine`]: the single-task tick loop — one capability call per tick,
//!   retry/backoff decisions, observer notification;
//! - [`counters`]: instance-owned retry/backoff counters;
//! - [`controller`]: the owner-facing handle (init/start/stop/rewind/accessors);
//! - [`config`]: all tunable policies and the historical defaults.
//!
//! ## System wiring
//! ```text
//! Owner thread                         Engine task (tokio)
//! ────────────                         ───────────────────
//! Controller::init() ──► Device::open_* (power/network/sim)
//! Controller::start_dispatch() ──────► tokio::spawn(Engine::run)
//! Controller::continue_to_state(s) ──► mpsc ──► rewind: state = min(state, s)
//!                                               └─► tick ── capability call
//!                                                    │
//!                                                    ├─ observer.on_event(..) ─► bool
//!                                                    ├─ watch: publish state
//!                                                    └─ sleep(delay) / idle
//! Controller::stop() ───► cancel token, join (grace), Device::close_*
//! ```

mod config;
mod controller;
mod counters;
mod engine;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ControllerConfig;
pub use controller::Controller;

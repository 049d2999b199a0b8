//! Capability contracts consumed by the engine.
//!
//! These traits are the boundary between the orchestration logic and the
//! modem drivers proper (AT transport, framing, vendor quirks). Everything
//! behind them may block for one synchronous AT round trip and may fail;
//! failures are ordinary [`CapabilityError`](crate::CapabilityError) values.
//!
//! ## Contents
//! - [`Device`] — factory/lifecycle: opens and closes the other handles,
//!   owns the per-operation AT timeout.
//! - [`Power`] — radio power and AT-mode entry.
//! - [`Network`] — registration, packet-data attach, bearer connect.
//! - [`Sim`] — SIM state queries and PIN submission.
//! - [`Information`] — best-effort identity strings (manufacturer/model/revision).
//! - [`types`] — the status enums those operations report.
//!
//! ## Quick wiring
//! ```text
//! Controller::init() ──► Device::open_power / open_network / open_sim
//! Engine tick        ──► Device::set_timeout + exactly ONE call on
//!                        Power / Network / Sim / Information
//! Controller::stop() ──► Device::close_power / close_network
//! ```

mod device;
mod information;
mod network;
mod power;
mod sim;
pub mod types;

pub use device::{Device, DeviceRef};
pub use information::{Information, InformationRef};
pub use network::{Network, NetworkRef};
pub use power::{Power, PowerRef};
pub use sim::{Sim, SimRef};

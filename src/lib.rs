//! # cellvisor
//!
//! **Cellvisor** is a bring-up orchestrator for cellular modems.
//!
//! It walks one modem from powered-off to data-connected through an ordered
//! state chain, with per-step retry budgets, registration-denial backoff and
//! an owner callback that can veto any step. The crate is transport-agnostic:
//! the actual AT plumbing lives behind the capability traits in
//! [`capabilities`], and cellvisor only decides *what to ask the modem next*.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌──────────────────────────────────────────────────────────────────┐
//!  │  Controller (owner-facing handle)                                │
//!  │  - opens/closes capability handles through Device                │
//!  │  - spawns the engine task, stops it cooperatively                │
//!  │  - continue_to_state(..) ──► bounded command channel             │
//!  └──────┬───────────────────────────────────────────────▲───────────┘
//!         │ Command::Rewind(state)                        │ watch<CellularState>
//!         ▼                                               │
//!  ┌──────────────────────────────────────────────────────┴───────────┐
//!  │  Engine (one tokio task, strictly sequential ticks)              │
//!  │  - one capability call per tick                                  │
//!  │  - RetryCounters (per-state budgets + denial backoff)            │
//!  │  - notifies the Observe callback before committing a transition  │
//!  └──────┬──────────────┬──────────────┬──────────────┬──────────────┘
//!         ▼              ▼              ▼              ▼
//!      Power          Network          Sim        Information
//!   (on/off/AT)   (register/attach  (state/PIN)  (identity, best
//!                  /connect)                       effort logs)
//! ```
//!
//! ### State chain
//! ```text
//! PowerOn ─► DeviceReady ─► StartCellular ─► SimPin ─► RegisteringNetwork
//!                                                            │        ▲
//!                                                            ▼        │
//!                                                      RegisterNetwork┘
//!                                                            │
//!   Connected ◄─ ConnectNetwork ◄─ AttachingNetwork ◄─ AttachNetwork
//!
//! - transitions only move forward; the owner can rewind to
//!   min(current, requested) at any time
//! - rewinding to PowerOn resets every retry/backoff counter
//! - registration denial backs off 1s, 2s, 4s, ... before re-registering
//! ```
//!
//! ## Features
//! | Area             | Description                                                   | Key types / traits                       |
//! |------------------|---------------------------------------------------------------|------------------------------------------|
//! | **Orchestration**| Drive one modem through the bring-up chain.                   | [`Controller`], [`ControllerConfig`]     |
//! | **Capabilities** | Trait seams for the modem drivers (power, network, SIM, ...). | [`Device`], [`Power`], [`Network`], [`Sim`] |
//! | **Observer API** | Veto-capable callback on every transition, retry and failure. | [`Observe`], [`ConnectionEvent`]         |
//! | **Policies**     | Retry budgets and denial backoff.                             | [`RetryPolicy`], [`DenialBackoff`]       |
//! | **Errors**       | Typed errors for drivers, plumbing and terminal failures.     | [`CapabilityError`], [`ResourceError`], [`FailureReason`] |
//!
//! ## Example
//! ```no_run
//! use cellvisor::{CellularState, Controller, ControllerConfig, DeviceRef};
//!
//! async fn bring_up(device: DeviceRef) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut controller = Controller::new(device, ControllerConfig::default());
//!     controller.set_sim_pin("1234");
//!
//!     controller.init().await?;
//!     controller.start_dispatch()?;
//!     controller.continue_to_state(CellularState::Connected).await?;
//!
//!     // ... the engine ticks in the background; watch progress through an
//!     // observer or poll controller.state() ...
//!
//!     controller.stop().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod observers;
mod policies;
mod state;

pub mod capabilities;

// ---- Public re-exports ----

pub use crate::core::{Controller, ControllerConfig};
pub use capabilities::{
    Device, DeviceRef, Information, InformationRef, Network, NetworkRef, Power, PowerRef, Sim,
    SimRef,
};
pub use error::{CapabilityError, FailureReason, ResourceError};
pub use events::ConnectionEvent;
pub use observers::{LogObserver, Observe, ObserverRef};
pub use policies::{DenialBackoff, JitterPolicy, RetryCounter, RetryPolicy};
pub use state::CellularState;

//! # Controller: the owner-facing handle.
//!
//! One [`Controller`] exclusively owns one modem channel for its lifetime.
//! The owner configures it (PIN, PLMN, observer), opens the capability
//! handles with [`init`](Controller::init), starts the engine task with
//! [`start_dispatch`](Controller::start_dispatch) and then drives bring-up
//! with [`continue_to_state`](Controller::continue_to_state).
//!
//! ## Lifecycle
//! ```text
//! new ──► init ──► start_dispatch ──► continue_to_state(PowerOn) ──► ... ──► stop
//!          │                │                      │
//!          │                │                      └─ rewind any time; back to
//!          │                │                         PowerOn = fresh attempt
//!          │                └─ spawns the engine task (idle until first rewind)
//!          └─ opens power/network/sim handles; failure closes the partial set
//! ```
//!
//! ## Thread safety
//! Owner calls are marshaled to the engine over a bounded command channel,
//! never by touching engine state directly; the engine publishes its current
//! state over a `watch` channel for lock-free reads.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capabilities::{DeviceRef, NetworkRef, PowerRef, SimRef};
use crate::core::config::ControllerConfig;
use crate::core::engine::{Command, Engine};
use crate::error::ResourceError;
use crate::observers::{LogObserver, ObserverRef};
use crate::state::CellularState;

/// Capability handles opened by [`Controller::init`].
#[derive(Clone)]
struct Handles {
    power: PowerRef,
    network: NetworkRef,
    sim: SimRef,
}

/// Plumbing of a running engine task.
struct EngineHandle {
    commands: mpsc::Sender<Command>,
    token: CancellationToken,
    join: JoinHandle<()>,
}

/// Drives one modem from powered-off to data-connected.
///
/// ## Example
/// ```no_run
/// use cellvisor::{CellularState, Controller, ControllerConfig, DeviceRef};
///
/// # async fn bring_up(device: DeviceRef) -> Result<(), Box<dyn std::error::Error>> {
/// let mut controller = Controller::new(device, ControllerConfig::default());
/// controller.set_sim_pin("1234");
///
/// controller.init().await?;
/// controller.start_dispatch()?;
/// controller.continue_to_state(CellularState::PowerOn).await?;
/// // ... the observer sees every transition, retry and failure ...
/// controller.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct Controller {
    cfg: ControllerConfig,
    device: DeviceRef,
    observer: ObserverRef,
    handles: Option<Handles>,
    engine: Option<EngineHandle>,
    state_tx: watch::Sender<CellularState>,
    state_rx: watch::Receiver<CellularState>,
}

impl Controller {
    /// Creates a controller over one modem channel.
    ///
    /// Starts with a [`LogObserver`]; install the real one with
    /// [`set_observer`](Controller::set_observer) before
    /// [`start_dispatch`](Controller::start_dispatch).
    pub fn new(device: DeviceRef, cfg: ControllerConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(CellularState::PowerOn);
        Self {
            cfg,
            device,
            observer: std::sync::Arc::new(LogObserver),
            handles: None,
            engine: None,
            state_tx,
            state_rx,
        }
    }

    /// Sets the PIN submitted when the SIM requires one.
    ///
    /// Takes effect on engines started afterwards.
    pub fn set_sim_pin(&mut self, pin: impl Into<String>) {
        self.cfg.sim_pin = Some(pin.into());
    }

    /// Forces registration to the given operator instead of automatic
    /// selection.
    ///
    /// Takes effect on engines started afterwards.
    pub fn set_plmn(&mut self, plmn: impl Into<String>) {
        self.cfg.plmn = Some(plmn.into());
    }

    /// Installs the observer that receives every
    /// [`ConnectionEvent`](crate::ConnectionEvent).
    ///
    /// Takes effect on engines started afterwards.
    pub fn set_observer(&mut self, observer: ObserverRef) {
        self.observer = observer;
    }

    /// Opens the power, network and SIM handles.
    ///
    /// Does not start any state processing. On failure, whatever was opened
    /// is closed again and a [`ResourceError::HandleOpen`] is returned.
    pub async fn init(&mut self) -> Result<(), ResourceError> {
        let power = match self.device.open_power().await {
            Ok(power) => power,
            Err(source) => {
                self.close_handles().await;
                return Err(ResourceError::HandleOpen {
                    what: "power",
                    source,
                });
            }
        };
        let network = match self.device.open_network().await {
            Ok(network) => network,
            Err(source) => {
                self.close_handles().await;
                return Err(ResourceError::HandleOpen {
                    what: "network",
                    source,
                });
            }
        };
        let sim = match self.device.open_sim().await {
            Ok(sim) => sim,
            Err(source) => {
                self.close_handles().await;
                return Err(ResourceError::HandleOpen {
                    what: "sim",
                    source,
                });
            }
        };

        self.handles = Some(Handles {
            power,
            network,
            sim,
        });
        info!("controller initialized");
        Ok(())
    }

    /// Spawns the engine task. The engine idles until the first
    /// [`continue_to_state`](Controller::continue_to_state).
    ///
    /// Fails with [`ResourceError::NotInitialized`] before
    /// [`init`](Controller::init) and [`ResourceError::AlreadyRunning`] if
    /// the engine is already up; neither tears anything down.
    pub fn start_dispatch(&mut self) -> Result<(), ResourceError> {
        if self.engine.is_some() {
            return Err(ResourceError::AlreadyRunning);
        }
        let handles = self.handles.clone().ok_or(ResourceError::NotInitialized)?;

        let (commands, command_rx) = mpsc::channel(self.cfg.command_capacity_clamped());
        let token = CancellationToken::new();
        let engine = Engine::new(
            self.cfg.clone(),
            self.device.clone(),
            handles.power,
            handles.network,
            handles.sim,
            self.observer.clone(),
            self.state_tx.clone(),
        );
        let join = tokio::spawn(engine.run(command_rx, token.clone()));
        self.engine = Some(EngineHandle {
            commands,
            token,
            join,
        });
        info!("dispatch started");
        Ok(())
    }

    /// Rewinds to `min(current_state, state)` and ticks immediately.
    ///
    /// Never advances the state: requesting a later state only re-ticks the
    /// current one. Rewinding to [`CellularState::PowerOn`] resets every
    /// retry/backoff counter (a fresh bring-up attempt).
    ///
    /// If the command cannot be submitted the controller tears itself down
    /// ([`stop`](Controller::stop)) and returns [`ResourceError::Dispatch`].
    pub async fn continue_to_state(&mut self, state: CellularState) -> Result<(), ResourceError> {
        let submitted = match &self.engine {
            Some(engine) => engine.commands.send(Command::Rewind(state)).await.is_ok(),
            None => false,
        };
        if !submitted {
            warn!(target_state = state.as_label(), "command submission failed");
            self.stop().await;
            return Err(ResourceError::Dispatch);
        }
        Ok(())
    }

    /// Stops the engine and closes the power and network handles.
    ///
    /// Cancellation is cooperative: the engine exits at its next safe point
    /// (between ticks or inside a retry sleep). If it does not exit within
    /// [`ControllerConfig::stop_grace`] — e.g. it is stuck inside a blocking
    /// capability call — the task is aborted, abandoning that call
    /// mid-operation.
    pub async fn stop(&mut self) {
        if let Some(engine) = self.engine.take() {
            engine.token.cancel();
            let mut join = engine.join;
            if time::timeout(self.cfg.stop_grace, &mut join).await.is_err() {
                warn!("engine did not stop within grace, aborting");
                join.abort();
            }
        }
        self.close_handles().await;
        debug!("controller stopped");
    }

    async fn close_handles(&mut self) {
        self.device.close_power().await;
        self.device.close_network().await;
        self.handles = None;
    }

    /// The most recently committed state.
    pub fn state(&self) -> CellularState {
        *self.state_rx.borrow()
    }

    /// The device this controller owns.
    pub fn device(&self) -> &DeviceRef {
        &self.device
    }

    /// The network handle, once [`init`](Controller::init) has opened it.
    pub fn network(&self) -> Option<NetworkRef> {
        self.handles.as_ref().map(|h| h.network.clone())
    }

    /// The SIM handle, once [`init`](Controller::init) has opened it.
    pub fn sim(&self) -> Option<SimRef> {
        self.handles.as_ref().map(|h| h.sim.clone())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        // Best-effort: the engine task must not outlive its controller.
        if let Some(engine) = self.engine.take() {
            engine.token.cancel();
        }
    }
}

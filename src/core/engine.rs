//! # Engine: the bring-up tick loop.
//!
//! One engine runs on one spawned tokio task and owns all mutable bring-up
//! state (current state, retry counters). Ticks are strictly sequential:
//! each tick performs **exactly one** capability call (the SIM-unlock tick
//! is the documented exception — query, PIN submission and settle-poll form
//! one logical step), decides the next state, and either re-arms itself or
//! goes idle.
//!
//! ## Tick flow
//! ```text
//! rewind command ──► state = min(state, requested); counters reset at PowerOn
//!        │
//!        ▼
//! tick(state) ──► one capability call ──► TickOutcome
//!        │
//!        ├─ Goto { next ≠ state }  → notify Transitioned → commit → re-arm(delay)
//!        │                           (observer `false` → halt, uncommitted)
//!        ├─ Goto { next = state, delay = 0 }  → shared immediate budget (cap 3)
//!        │                                      exhausted → Failed(RetriesExhausted)
//!        ├─ Goto { next = state, delay > 0 }  → re-arm(delay)
//!        ├─ Goto { next = state, no delay }   → idle (steady Connected)
//!        ├─ Terminal(reason)                  → notify Failed → idle
//!        └─ Halted                            → idle (observer cancelled)
//! ```
//!
//! A zero delay is *requested immediate retry* and is distinct from "no
//! delay requested": only the former consumes the shared immediate budget.
//!
//! ## Cancellation
//! The runtime token is checked between ticks and during retry sleeps. A
//! rewind command arriving mid-sleep aborts the sleep and ticks immediately.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::capabilities::types::{AttachStatus, RegistrationStatus, RegistrationType, SimState};
use crate::capabilities::{DeviceRef, NetworkRef, PowerRef, SimRef};
use crate::core::config::ControllerConfig;
use crate::core::counters::RetryCounters;
use crate::error::{CapabilityError, FailureReason};
use crate::events::ConnectionEvent;
use crate::observers::ObserverRef;
use crate::policies::RetryCounter;
use crate::state::CellularState;

/// AT timeout for power and AT-mode operations.
const TIMEOUT_POWER_ON: Duration = Duration::from_secs(1);
/// AT timeout for SIM operations.
const TIMEOUT_SIM_PIN: Duration = Duration::from_secs(1);
/// AT timeout for network queries, attach and connect.
const TIMEOUT_NETWORK: Duration = Duration::from_secs(10);
/// AT timeout for the explicit registration command.
const TIMEOUT_REGISTRATION: Duration = Duration::from_secs(180);

/// Owner→engine command.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Command {
    /// Rewind to `min(current, requested)` and tick immediately.
    Rewind(CellularState),
}

/// What one tick decided.
enum TickOutcome {
    /// Head to `next` (possibly the current state). `delay` is the requested
    /// re-arm delay; `Some(0)` means immediate retry, `None` means the branch
    /// requested no delay.
    Goto {
        next: CellularState,
        delay: Option<Duration>,
    },
    /// Give up: report the failure and go idle.
    Terminal(FailureReason),
    /// The observer cancelled mid-tick; go idle without reporting.
    Halted,
}

/// What the generic post-tick logic decided.
enum AfterTick {
    /// Run the next tick after this delay.
    Rearm(Duration),
    /// Stop ticking until the next rewind command.
    Idle,
}

/// Single-task bring-up engine. See the module docs for the tick contract.
pub(crate) struct Engine {
    cfg: ControllerConfig,
    device: DeviceRef,
    power: PowerRef,
    network: NetworkRef,
    sim: SimRef,
    observer: ObserverRef,
    state: CellularState,
    counters: RetryCounters,
    state_tx: watch::Sender<CellularState>,
}

impl Engine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        cfg: ControllerConfig,
        device: DeviceRef,
        power: PowerRef,
        network: NetworkRef,
        sim: SimRef,
        observer: ObserverRef,
        state_tx: watch::Sender<CellularState>,
    ) -> Self {
        let counters = RetryCounters::new(&cfg);
        let state = *state_tx.borrow();
        Self {
            cfg,
            device,
            power,
            network,
            sim,
            observer,
            state,
            counters,
            state_tx,
        }
    }

    /// Runs the engine until the token is cancelled or the command channel
    /// closes. Idles (no ticking) until the first rewind command arrives and
    /// after every halt or terminal failure.
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        token: CancellationToken,
    ) {
        let mut armed = false;
        let mut wait = Duration::ZERO;

        loop {
            if !armed {
                tokio::select! {
                    _ = token.cancelled() => return,
                    cmd = commands.recv() => match cmd {
                        Some(Command::Rewind(target)) => {
                            self.apply_rewind(target);
                            armed = true;
                            wait = Duration::ZERO;
                        }
                        None => return,
                    },
                }
            } else if !wait.is_zero() {
                tokio::select! {
                    _ = token.cancelled() => return,
                    cmd = commands.recv() => match cmd {
                        // A rewind aborts the pending delay and ticks now.
                        Some(Command::Rewind(target)) => {
                            self.apply_rewind(target);
                            wait = Duration::ZERO;
                        }
                        None => return,
                    },
                    _ = time::sleep(wait) => {
                        wait = Duration::ZERO;
                    }
                }
            } else {
                if token.is_cancelled() {
                    return;
                }
                match self.run_tick().await {
                    AfterTick::Rearm(delay) => wait = delay,
                    AfterTick::Idle => armed = false,
                }
            }
        }
    }

    /// Applies the rewind rule. Rewinding to [`CellularState::PowerOn`]
    /// starts a fresh bring-up attempt: all retry/backoff counters reset.
    fn apply_rewind(&mut self, target: CellularState) {
        let next = self.state.rewound_to(target);
        if next != self.state {
            info!(from = self.state.as_label(), to = next.as_label(), "rewind");
        }
        if next == CellularState::PowerOn {
            self.counters.reset();
        }
        self.commit(next);
    }

    fn commit(&mut self, next: CellularState) {
        self.state = next;
        self.state_tx.send_replace(next);
    }

    async fn notify(&self, event: &ConnectionEvent) -> bool {
        self.observer.on_event(event).await
    }

    /// One tick plus the generic post-tick logic.
    async fn run_tick(&mut self) -> AfterTick {
        let outcome = match self.state {
            CellularState::PowerOn => self.tick_power_on().await,
            CellularState::DeviceReady => self.tick_device_ready().await,
            CellularState::StartCellular => self.tick_start_cellular().await,
            CellularState::SimPin => self.tick_sim_pin().await,
            CellularState::RegisteringNetwork => self.tick_registering().await,
            CellularState::RegisterNetwork => self.tick_register().await,
            CellularState::AttachingNetwork => self.tick_attaching().await,
            CellularState::AttachNetwork => self.tick_attach().await,
            CellularState::ConnectNetwork => self.tick_connect().await,
            CellularState::Connected => self.tick_connected().await,
        };

        match outcome {
            TickOutcome::Halted => AfterTick::Idle,
            TickOutcome::Terminal(reason) => {
                error!(
                    state = self.state.as_label(),
                    reason = reason.as_label(),
                    "bring-up failed; idling until rewound"
                );
                // Terminal failures are reported exactly once; the observer's
                // answer cannot un-idle the engine.
                let _ = self
                    .notify(&ConnectionEvent::Failed {
                        state: self.state,
                        reason,
                    })
                    .await;
                AfterTick::Idle
            }
            TickOutcome::Goto { next, delay } => {
                if next != self.state {
                    info!(
                        from = self.state.as_label(),
                        to = next.as_label(),
                        "state transition"
                    );
                    let keep_going = self
                        .notify(&ConnectionEvent::Transitioned {
                            from: self.state,
                            to: next,
                        })
                        .await;
                    if !keep_going {
                        // Cancelled before commit: the transition never happened.
                        return AfterTick::Idle;
                    }
                    self.commit(next);
                    AfterTick::Rearm(delay.unwrap_or(Duration::ZERO))
                } else {
                    match delay {
                        Some(delay) if delay.is_zero() => match self.counters.immediate.next() {
                            Some(_) => {
                                debug!(state = self.state.as_label(), "immediate retry");
                                AfterTick::Rearm(Duration::ZERO)
                            }
                            None => {
                                let _ = self
                                    .notify(&ConnectionEvent::Failed {
                                        state: self.state,
                                        reason: FailureReason::RetriesExhausted,
                                    })
                                    .await;
                                error!(
                                    state = self.state.as_label(),
                                    "immediate retry budget exhausted"
                                );
                                AfterTick::Idle
                            }
                        },
                        Some(delay) => AfterTick::Rearm(delay),
                        None => AfterTick::Idle,
                    }
                }
            }
        }
    }

    /// Consumes one retry from a per-state budget: notifies the observer and
    /// stays in the current state, or escalates to `terminal` once the
    /// budget is gone.
    async fn retry_or(
        &mut self,
        counter: fn(&mut RetryCounters) -> &mut RetryCounter,
        terminal: FailureReason,
    ) -> TickOutcome {
        let (delay, attempt) = {
            let counter = counter(&mut self.counters);
            match counter.next() {
                Some(delay) => (delay, counter.attempt()),
                None => return TickOutcome::Terminal(terminal),
            }
        };
        warn!(
            state = self.state.as_label(),
            attempt,
            ?delay,
            "step failed, retrying"
        );
        if !self
            .notify(&ConnectionEvent::RetryScheduled {
                state: self.state,
                attempt,
                delay,
            })
            .await
        {
            return TickOutcome::Halted;
        }
        TickOutcome::Goto {
            next: self.state,
            delay: Some(delay),
        }
    }

    async fn tick_power_on(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_POWER_ON);
        info!("powering modem on");
        match self.power.on().await {
            // No software power control still means the rail is up.
            Ok(()) | Err(CapabilityError::Unsupported) => TickOutcome::Goto {
                next: CellularState::DeviceReady,
                delay: None,
            },
            Err(err) => {
                warn!(error = %err, "power-on failed, cycling power");
                match self.power.off().await {
                    Ok(()) | Err(CapabilityError::Unsupported) => {}
                    Err(off_err) => error!(error = %off_err, "power-down failed"),
                }
                self.retry_or(|c| &mut c.power, FailureReason::Power).await
            }
        }
    }

    async fn tick_device_ready(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_POWER_ON);
        match self.power.set_at_mode().await {
            Ok(()) => {
                info!("modem ready for AT commands");
                self.log_device_info().await;
                TickOutcome::Goto {
                    next: CellularState::StartCellular,
                    delay: None,
                }
            }
            Err(err) => {
                debug!(error = %err, "modem not ready yet");
                self.retry_or(|c| &mut c.device_ready, FailureReason::Power)
                    .await
            }
        }
    }

    /// Best-effort identity logging once the modem answers AT commands.
    async fn log_device_info(&self) {
        let info = match self.device.open_information().await {
            Ok(info) => info,
            Err(err) => {
                debug!(error = %err, "information handle unavailable");
                return;
            }
        };
        if let Ok(manufacturer) = info.manufacturer().await {
            info!(%manufacturer, "modem manufacturer");
        }
        if let Ok(model) = info.model().await {
            info!(%model, "modem model");
        }
        if let Ok(revision) = info.revision().await {
            info!(%revision, "modem revision");
        }
    }

    async fn tick_start_cellular(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_NETWORK);
        info!("starting cellular");
        // Idempotent: re-opening returns the handle opened at init.
        match self.device.open_network().await {
            Ok(network) => self.network = network,
            Err(err) => debug!(error = %err, "network re-open failed, keeping handle"),
        }
        TickOutcome::Goto {
            next: CellularState::SimPin,
            delay: None,
        }
    }

    async fn tick_sim_pin(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_SIM_PIN);
        match self.unlock_sim().await {
            Ok(true) => {
                info!("SIM ready, checking network registration");
                TickOutcome::Goto {
                    next: CellularState::RegisteringNetwork,
                    delay: None,
                }
            }
            Ok(false) => self.retry_or(|c| &mut c.sim, FailureReason::SimPin).await,
            Err(err) => {
                debug!(error = %err, "SIM not readable");
                self.retry_or(|c| &mut c.sim, FailureReason::SimPin).await
            }
        }
    }

    /// Reads the SIM state and, when a PIN is configured and required,
    /// submits it and polls for the SIM to settle. Returns whether the SIM
    /// ended up ready.
    async fn unlock_sim(&mut self) -> Result<bool, CapabilityError> {
        let mut state = self.sim.get_sim_state().await?;
        if state == SimState::Unknown {
            debug!("waiting for SIM");
            return Ok(false);
        }

        match &self.cfg.sim_pin {
            Some(pin) if state == SimState::PinNeeded => {
                info!("SIM PIN required, submitting");
                self.sim.set_pin(pin).await?;
                // The SIM needs a moment after PIN entry before it reports
                // ready; read errors during settling are tolerated.
                for _ in 0..self.cfg.sim_ready_poll.max_attempts {
                    if let Ok(polled) = self.sim.get_sim_state().await {
                        state = polled;
                        if state == SimState::Ready {
                            break;
                        }
                    }
                    time::sleep(self.cfg.sim_ready_poll.delay).await;
                }
            }
            Some(_) => {}
            None => debug!("no SIM PIN configured"),
        }

        Ok(state == SimState::Ready)
    }

    async fn tick_registering(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_NETWORK);
        let mut waiting = false;

        for reg_type in RegistrationType::ALL {
            let status = match self.network.get_registration_status(reg_type).await {
                Ok(status) => status,
                Err(CapabilityError::Unsupported) => continue,
                Err(err) => {
                    warn!(%reg_type, error = %err, "registration query failed");
                    continue;
                }
            };
            debug!(%reg_type, ?status, "registration status");

            if status.is_registered() {
                if status.is_degraded() {
                    warn!(%reg_type, ?status, "degraded network registration");
                }
                if status.is_roaming() {
                    warn!(%reg_type, "roaming cellular network");
                }
                info!(%reg_type, ?status, "registered to cellular network");
                return TickOutcome::Goto {
                    next: CellularState::AttachNetwork,
                    delay: None,
                };
            }

            match status {
                RegistrationStatus::Denied => {
                    let backoff = self.cfg.denial_backoff.delay_for(self.counters.denials);
                    self.counters.denials += 1;
                    warn!(%reg_type, ?backoff, "registration denied, backing off");
                    if !self
                        .notify(&ConnectionEvent::RetryScheduled {
                            state: self.state,
                            attempt: self.counters.denials,
                            delay: backoff,
                        })
                        .await
                    {
                        return TickOutcome::Halted;
                    }
                    return TickOutcome::Goto {
                        next: CellularState::RegisterNetwork,
                        delay: Some(backoff),
                    };
                }
                // Not yet searching on this technology.
                RegistrationStatus::NotRegistered => {}
                // Searching or transient.
                _ => waiting = true,
            }
        }

        // The wait budget is consumed once per tick, not once per technology.
        if waiting {
            match self.counters.registration_wait.next() {
                Some(poll_delay) => {
                    debug!(
                        waited = self.counters.registration_wait.attempt(),
                        "waiting for registration"
                    );
                    return TickOutcome::Goto {
                        next: CellularState::RegisteringNetwork,
                        delay: Some(poll_delay),
                    };
                }
                None => {
                    info!("registration wait exhausted, forcing registration");
                    self.counters.registration_wait.reset();
                }
            }
        }

        // Escalate to an explicit registration command.
        TickOutcome::Goto {
            next: CellularState::RegisterNetwork,
            delay: None,
        }
    }

    async fn tick_register(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_REGISTRATION);
        info!(plmn = self.cfg.plmn.as_deref(), "registering to network");
        match self.network.set_registration(self.cfg.plmn.as_deref()).await {
            Ok(()) => TickOutcome::Goto {
                next: CellularState::RegisteringNetwork,
                delay: None,
            },
            Err(err) => {
                warn!(error = %err, "registration command failed");
                self.retry_or(|c| &mut c.register, FailureReason::Registration)
                    .await
            }
        }
    }

    async fn tick_attaching(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_NETWORK);
        match self.network.get_attach().await {
            Ok(AttachStatus::Attached) => TickOutcome::Goto {
                next: CellularState::ConnectNetwork,
                delay: None,
            },
            Ok(AttachStatus::Detached) => TickOutcome::Goto {
                next: CellularState::AttachNetwork,
                delay: None,
            },
            Err(err) => {
                debug!(error = %err, "attach query failed");
                TickOutcome::Goto {
                    next: self.state,
                    delay: Some(Duration::ZERO),
                }
            }
        }
    }

    async fn tick_attach(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_NETWORK);
        info!("attaching to packet domain");
        match self.network.set_attach().await {
            Ok(()) => TickOutcome::Goto {
                next: CellularState::AttachingNetwork,
                delay: None,
            },
            Err(err) => {
                debug!(error = %err, "attach command failed");
                TickOutcome::Goto {
                    next: self.state,
                    delay: Some(Duration::ZERO),
                }
            }
        }
    }

    async fn tick_connect(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_NETWORK);
        info!("connecting data bearer");
        match self.network.connect().await {
            Ok(()) => TickOutcome::Goto {
                next: CellularState::Connected,
                delay: None,
            },
            // A bearer failure is never retried from here; the owner decides
            // whether to rewind.
            Err(err) => {
                error!(error = %err, "bearer connect failed");
                TickOutcome::Terminal(FailureReason::Connect)
            }
        }
    }

    async fn tick_connected(&mut self) -> TickOutcome {
        self.device.set_timeout(TIMEOUT_NETWORK);
        debug!("cellular connected");
        // Steady state: report aliveness; the answer is moot because the
        // engine idles here either way.
        let _ = self
            .notify(&ConnectionEvent::Transitioned {
                from: CellularState::Connected,
                to: CellularState::Connected,
            })
            .await;
        TickOutcome::Goto {
            next: CellularState::Connected,
            delay: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::task::JoinHandle;

    use super::*;
    use crate::capabilities::DeviceRef;
    use crate::core::testing::{Recorder, StubDevice};
    use crate::policies::RetryPolicy;

    use CellularState::*;
    use ConnectionEvent::{Failed, RetryScheduled};

    fn dev_err() -> CapabilityError {
        CapabilityError::Device("scripted failure".into())
    }

    const FULL_CHAIN: [(CellularState, CellularState); 8] = [
        (PowerOn, DeviceReady),
        (DeviceReady, StartCellular),
        (StartCellular, SimPin),
        (SimPin, RegisteringNetwork),
        (RegisteringNetwork, AttachNetwork),
        (AttachNetwork, AttachingNetwork),
        (AttachingNetwork, ConnectNetwork),
        (ConnectNetwork, Connected),
    ];

    struct Harness {
        commands: mpsc::Sender<Command>,
        state_rx: watch::Receiver<CellularState>,
        _join: JoinHandle<()>,
    }

    impl Harness {
        fn spawn(cfg: ControllerConfig, device: &Arc<StubDevice>, recorder: &Arc<Recorder>) -> Self {
            let (state_tx, state_rx) = watch::channel(PowerOn);
            let engine = Engine::new(
                cfg,
                device.clone() as DeviceRef,
                device.power.clone(),
                device.network.clone(),
                device.sim.clone(),
                recorder.clone(),
                state_tx,
            );
            let (commands, command_rx) = mpsc::channel(8);
            let token = CancellationToken::new();
            let join = tokio::spawn(engine.run(command_rx, token));
            Self {
                commands,
                state_rx,
                _join: join,
            }
        }

        async fn rewind(&self, target: CellularState) {
            self.commands.send(Command::Rewind(target)).await.unwrap();
        }

        /// Sleeps far past every scheduled retry. The paused test clock
        /// auto-advances, so this drains the engine deterministically.
        async fn settle(&self) {
            time::sleep(Duration::from_secs(3600)).await;
        }

        fn state(&self) -> CellularState {
            *self.state_rx.borrow()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn happy_path_walks_the_full_chain() {
        let device = StubDevice::arc();
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(recorder.transitions(), FULL_CHAIN);
        // Steady state announces itself once, then the engine idles.
        assert_eq!(
            recorder.events().last(),
            Some(&ConnectionEvent::Transitioned {
                from: Connected,
                to: Connected
            })
        );
        assert!(recorder.retries().is_empty());
        assert!(recorder.failures().is_empty());

        // Every tick re-arms the AT timeout; the first one is the power step.
        let timeouts = device.timeouts.lock().unwrap();
        assert_eq!(timeouts[0], TIMEOUT_POWER_ON);
        // Nine ticks: the eight transitions plus the steady Connected tick.
        assert_eq!(timeouts.len(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn requesting_a_later_state_never_skips_ahead() {
        let device = StubDevice::arc();
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        // The engine is at PowerOn; asking for SimPin must not jump there.
        h.rewind(SimPin).await;
        h.settle().await;

        assert_eq!(recorder.transitions()[0], (PowerOn, DeviceReady));
        assert_eq!(h.state(), Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn rewind_reruns_the_tail_of_the_chain() {
        let device = StubDevice::arc();
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;
        h.rewind(SimPin).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(
            recorder.transitions()[8..],
            [
                (SimPin, RegisteringNetwork),
                (RegisteringNetwork, AttachNetwork),
                (AttachNetwork, AttachingNetwork),
                (AttachingNetwork, ConnectNetwork),
                (ConnectNetwork, Connected),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn power_failures_cycle_power_and_retry() {
        let device = StubDevice::arc();
        device.power.on.push(Err(dev_err()), 10);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(device.power.on.calls(), 11);
        // Every failed power-on is followed by a power-down.
        assert_eq!(device.power.off.calls(), 10);

        let retries = recorder.retries();
        assert_eq!(retries.len(), 10);
        assert_eq!(
            retries[0],
            RetryScheduled {
                state: PowerOn,
                attempt: 1,
                delay: Duration::from_secs(1),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn power_budget_exhaustion_is_terminal() {
        let device = StubDevice::arc();
        device.power.on.push(Err(dev_err()), 11);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(
            recorder.failures(),
            [Failed {
                state: PowerOn,
                reason: FailureReason::Power,
            }]
        );
        assert_eq!(h.state(), PowerOn);
        assert_eq!(device.power.on.calls(), 11);
        // Idle after the terminal failure: nothing past power is touched.
        assert_eq!(device.power.at_mode.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_power_control_counts_as_powered() {
        let device = StubDevice::arc();
        device.power.on.push(Err(CapabilityError::Unsupported), 1);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(device.power.off.calls(), 0);
        assert!(recorder.retries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rewinding_to_power_on_restores_the_retry_budgets() {
        let device = StubDevice::arc();
        device.power.on.push(Err(dev_err()), 11);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;
        assert_eq!(recorder.failures().len(), 1);

        // A fresh attempt must absorb ten more consecutive failures.
        device.power.on.push(Err(dev_err()), 10);
        h.rewind(PowerOn).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(device.power.on.calls(), 22);
        assert_eq!(recorder.failures().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sim_pin_is_submitted_when_required() {
        let device = StubDevice::arc();
        device.sim.state.push(Ok(SimState::PinNeeded), 1);
        let recorder = Recorder::arc();
        let cfg = ControllerConfig {
            sim_pin: Some("1234".into()),
            ..ControllerConfig::default()
        };
        let h = Harness::spawn(cfg, &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(device.sim.pins_seen.lock().unwrap().as_slice(), ["1234"]);
        // One initial query plus one settle poll that saw the SIM ready.
        assert_eq!(device.sim.state.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sim_that_never_settles_is_terminal() {
        let device = StubDevice::arc();
        device.sim.state.set_fallback(Ok(SimState::Unknown));
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(
            recorder.failures(),
            [Failed {
                state: SimPin,
                reason: FailureReason::SimPin,
            }]
        );
        assert_eq!(h.state(), SimPin);
        assert_eq!(recorder.retries().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn registration_command_budget_exhaustion_is_terminal() {
        let device = StubDevice::arc();
        device
            .network
            .registration_status
            .set_fallback(Ok(RegistrationStatus::NotRegistered));
        device.network.set_registration.push(Err(dev_err()), 4);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(
            recorder.failures(),
            [Failed {
                state: RegisterNetwork,
                reason: FailureReason::Registration,
            }]
        );
        assert_eq!(h.state(), RegisterNetwork);
        assert_eq!(recorder.retries().len(), 3);
        assert_eq!(device.network.set_registration.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_registration_types_are_skipped() {
        let device = StubDevice::arc();
        device
            .network
            .registration_status
            .push(Err(CapabilityError::Unsupported), 2);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert!(recorder.retries().is_empty());
        // Two unsupported technologies, then the supported one answered.
        assert_eq!(device.network.registration_status.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn degraded_registration_still_proceeds_to_attach() {
        let device = StubDevice::arc();
        // SMS-only still means the signaling plane is up; bring-up continues.
        device
            .network
            .registration_status
            .push(Ok(RegistrationStatus::SmsOnlyHome), 1);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(recorder.transitions(), FULL_CHAIN);
        // No waiting, no register command: the first answer counted.
        assert_eq!(device.network.registration_status.calls(), 1);
        assert_eq!(device.network.set_registration.calls(), 0);
        assert!(recorder.retries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn denial_backoff_doubles_between_attempts() {
        let device = StubDevice::arc();
        device
            .network
            .registration_status
            .push(Ok(RegistrationStatus::Denied), 3);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(
            recorder.retries(),
            [
                RetryScheduled {
                    state: RegisteringNetwork,
                    attempt: 1,
                    delay: Duration::from_secs(1),
                },
                RetryScheduled {
                    state: RegisteringNetwork,
                    attempt: 2,
                    delay: Duration::from_secs(2),
                },
                RetryScheduled {
                    state: RegisteringNetwork,
                    attempt: 3,
                    delay: Duration::from_secs(4),
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn registration_wait_exhaustion_forces_a_register_command() {
        let device = StubDevice::arc();
        // Every technology reports "searching" for three whole ticks.
        device
            .network
            .registration_status
            .push(Ok(RegistrationStatus::Searching), 9);
        let recorder = Recorder::arc();
        let cfg = ControllerConfig {
            registration_wait: RetryPolicy::new(Duration::from_secs(1), 2),
            ..ControllerConfig::default()
        };
        let h = Harness::spawn(cfg, &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert!(recorder
            .transitions()
            .contains(&(RegisteringNetwork, RegisterNetwork)));
        // Two waited ticks, one exhausted tick, one registered tick.
        assert_eq!(device.network.registration_status.calls(), 10);
        assert_eq!(device.network.set_registration.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn attach_query_errors_retry_immediately_then_recover() {
        let device = StubDevice::arc();
        device.network.attach_status.push(Err(dev_err()), 2);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), Connected);
        assert_eq!(device.network.attach_status.calls(), 3);
        assert!(recorder.failures().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn attach_command_exhausts_the_immediate_budget() {
        let device = StubDevice::arc();
        device.network.set_attach.push(Err(dev_err()), 4);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(
            recorder.failures(),
            [Failed {
                state: AttachNetwork,
                reason: FailureReason::RetriesExhausted,
            }]
        );
        assert_eq!(h.state(), AttachNetwork);
        assert_eq!(device.network.set_attach.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_failure_is_terminal_without_retry() {
        let device = StubDevice::arc();
        device.network.connect.push(Err(dev_err()), 1);
        let recorder = Recorder::arc();
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(
            recorder.failures(),
            [Failed {
                state: ConnectNetwork,
                reason: FailureReason::Connect,
            }]
        );
        assert_eq!(h.state(), ConnectNetwork);
        assert_eq!(device.network.connect.calls(), 1);
        assert!(recorder.retries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn observer_false_cancels_the_transition_before_commit() {
        let device = StubDevice::arc();
        let recorder = Recorder::arc();
        recorder.push_reply(false);
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        // The PowerOn→DeviceReady transition was announced but never
        // committed, and nothing past power was touched.
        assert_eq!(h.state(), PowerOn);
        assert_eq!(recorder.events().len(), 1);
        assert_eq!(device.power.at_mode.calls(), 0);

        // Halted, not dead: a fresh command resumes bring-up.
        h.rewind(PowerOn).await;
        h.settle().await;
        assert_eq!(h.state(), Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn observer_false_on_retry_halts_the_engine() {
        let device = StubDevice::arc();
        device.power.on.push(Err(dev_err()), 2);
        let recorder = Recorder::arc();
        recorder.push_reply(false);
        let h = Harness::spawn(ControllerConfig::default(), &device, &recorder);

        h.rewind(Connected).await;
        h.settle().await;

        assert_eq!(h.state(), PowerOn);
        assert_eq!(device.power.on.calls(), 1);
    }
}

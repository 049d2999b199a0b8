//! Scripted capability stubs and a recording observer for engine tests.
//!
//! A [`Script`] hands out queued results front-to-back and falls back to a
//! fixed result once the queue is drained, so a test reads as "fail N times,
//! then behave like this forever".

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::capabilities::types::{AttachStatus, RegistrationStatus, RegistrationType, SimState};
use crate::capabilities::{
    Device, Information, InformationRef, Network, NetworkRef, Power, PowerRef, Sim, SimRef,
};
use crate::error::CapabilityError;
use crate::events::ConnectionEvent;
use crate::observers::Observe;

/// Queue of scripted results with a fallback once drained.
pub(crate) struct Script<T: Clone> {
    queue: Mutex<VecDeque<T>>,
    fallback: Mutex<T>,
    calls: AtomicU32,
}

impl<T: Clone> Script<T> {
    pub(crate) fn new(fallback: T) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            calls: AtomicU32::new(0),
        }
    }

    /// Queues `value` for the next `times` calls.
    pub(crate) fn push(&self, value: T, times: usize) {
        let mut queue = self.queue.lock().unwrap();
        for _ in 0..times {
            queue.push_back(value.clone());
        }
    }

    /// Replaces the result handed out once the queue is drained.
    pub(crate) fn set_fallback(&self, value: T) {
        *self.fallback.lock().unwrap() = value;
    }

    pub(crate) fn take(&self) -> T {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.queue.lock().unwrap().pop_front() {
            Some(value) => value,
            None => self.fallback.lock().unwrap().clone(),
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

type OpScript = Script<Result<(), CapabilityError>>;

fn ok_op() -> OpScript {
    Script::new(Ok(()))
}

pub(crate) struct StubPower {
    pub on: OpScript,
    pub off: OpScript,
    pub at_mode: OpScript,
}

impl Default for StubPower {
    fn default() -> Self {
        Self {
            on: ok_op(),
            off: ok_op(),
            at_mode: ok_op(),
        }
    }
}

#[async_trait]
impl Power for StubPower {
    async fn on(&self) -> Result<(), CapabilityError> {
        self.on.take()
    }
    async fn off(&self) -> Result<(), CapabilityError> {
        self.off.take()
    }
    async fn set_at_mode(&self) -> Result<(), CapabilityError> {
        self.at_mode.take()
    }
}

pub(crate) struct StubNetwork {
    pub registration_status: Script<Result<RegistrationStatus, CapabilityError>>,
    pub set_registration: OpScript,
    pub attach_status: Script<Result<AttachStatus, CapabilityError>>,
    pub set_attach: OpScript,
    pub connect: OpScript,
}

impl Default for StubNetwork {
    fn default() -> Self {
        Self {
            registration_status: Script::new(Ok(RegistrationStatus::RegisteredHome)),
            set_registration: ok_op(),
            attach_status: Script::new(Ok(AttachStatus::Attached)),
            set_attach: ok_op(),
            connect: ok_op(),
        }
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn set_registration(&self, _plmn: Option<&str>) -> Result<(), CapabilityError> {
        self.set_registration.take()
    }
    async fn get_registration_status(
        &self,
        _reg_type: RegistrationType,
    ) -> Result<RegistrationStatus, CapabilityError> {
        self.registration_status.take()
    }
    async fn get_attach(&self) -> Result<AttachStatus, CapabilityError> {
        self.attach_status.take()
    }
    async fn set_attach(&self) -> Result<(), CapabilityError> {
        self.set_attach.take()
    }
    async fn connect(&self) -> Result<(), CapabilityError> {
        self.connect.take()
    }
}

pub(crate) struct StubSim {
    pub state: Script<Result<SimState, CapabilityError>>,
    pub set_pin: OpScript,
    pub pins_seen: Mutex<Vec<String>>,
}

impl Default for StubSim {
    fn default() -> Self {
        Self {
            state: Script::new(Ok(SimState::Ready)),
            set_pin: ok_op(),
            pins_seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Sim for StubSim {
    async fn get_sim_state(&self) -> Result<SimState, CapabilityError> {
        self.state.take()
    }
    async fn set_pin(&self, pin: &str) -> Result<(), CapabilityError> {
        self.pins_seen.lock().unwrap().push(pin.to_string());
        self.set_pin.take()
    }
}

pub(crate) struct StubInformation;

#[async_trait]
impl Information for StubInformation {
    async fn manufacturer(&self) -> Result<String, CapabilityError> {
        Ok("Scripted Systems".into())
    }
    async fn model(&self) -> Result<String, CapabilityError> {
        Ok("SS-100".into())
    }
    async fn revision(&self) -> Result<String, CapabilityError> {
        Ok("r1".into())
    }
}

/// A scripted modem: one device plus its capability stubs.
pub(crate) struct StubDevice {
    pub power: Arc<StubPower>,
    pub network: Arc<StubNetwork>,
    pub sim: Arc<StubSim>,
    pub open_power: OpScript,
    pub open_network: OpScript,
    pub open_sim: OpScript,
    pub power_closes: AtomicUsize,
    pub network_closes: AtomicUsize,
    pub timeouts: Mutex<Vec<Duration>>,
}

impl Default for StubDevice {
    fn default() -> Self {
        Self {
            power: Arc::new(StubPower::default()),
            network: Arc::new(StubNetwork::default()),
            sim: Arc::new(StubSim::default()),
            open_power: ok_op(),
            open_network: ok_op(),
            open_sim: ok_op(),
            power_closes: AtomicUsize::new(0),
            network_closes: AtomicUsize::new(0),
            timeouts: Mutex::new(Vec::new()),
        }
    }
}

impl StubDevice {
    pub(crate) fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl Device for StubDevice {
    async fn open_power(&self) -> Result<PowerRef, CapabilityError> {
        self.open_power.take().map(|()| self.power.clone() as PowerRef)
    }
    async fn open_network(&self) -> Result<NetworkRef, CapabilityError> {
        self.open_network
            .take()
            .map(|()| self.network.clone() as NetworkRef)
    }
    async fn open_sim(&self) -> Result<SimRef, CapabilityError> {
        self.open_sim.take().map(|()| self.sim.clone() as SimRef)
    }
    async fn open_information(&self) -> Result<InformationRef, CapabilityError> {
        Ok(Arc::new(StubInformation))
    }
    fn set_timeout(&self, timeout: Duration) {
        self.timeouts.lock().unwrap().push(timeout);
    }
    async fn close_power(&self) {
        self.power_closes.fetch_add(1, Ordering::SeqCst);
    }
    async fn close_network(&self) {
        self.network_closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records every event; answers `true` unless a scripted reply says otherwise.
pub(crate) struct Recorder {
    events: Mutex<Vec<ConnectionEvent>>,
    replies: Mutex<VecDeque<bool>>,
}

impl Recorder {
    pub(crate) fn arc() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
        })
    }

    /// Queues explicit replies consumed before the default `true`.
    pub(crate) fn push_reply(&self, reply: bool) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn events(&self) -> Vec<ConnectionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn transitions(&self) -> Vec<(crate::CellularState, crate::CellularState)> {
        self.events()
            .into_iter()
            .filter_map(|ev| match ev {
                ConnectionEvent::Transitioned { from, to } if from != to => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn retries(&self) -> Vec<ConnectionEvent> {
        self.events()
            .into_iter()
            .filter(|ev| matches!(ev, ConnectionEvent::RetryScheduled { .. }))
            .collect()
    }

    pub(crate) fn failures(&self) -> Vec<ConnectionEvent> {
        self.events()
            .into_iter()
            .filter(|ev| matches!(ev, ConnectionEvent::Failed { .. }))
            .collect()
    }
}

#[async_trait]
impl Observe for Recorder {
    async fn on_event(&self, event: &ConnectionEvent) -> bool {
        self.events.lock().unwrap().push(event.clone());
        self.replies.lock().unwrap().pop_front().unwrap_or(true)
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

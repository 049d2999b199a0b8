//! Drives a scripted in-memory modem from powered-off to connected.
//!
//! Run with: `cargo run --example bringup`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use cellvisor::capabilities::types::{
    AttachStatus, RegistrationStatus, RegistrationType, SimState,
};
use cellvisor::{
    CapabilityError, CellularState, ConnectionEvent, Controller, ControllerConfig, Device,
    DeviceRef, Information, InformationRef, Network, NetworkRef, Observe, Power, PowerRef, Sim,
    SimRef,
};

/// A modem that needs two power-on attempts, wants its PIN, and spends a few
/// polls searching before it registers.
struct FakeModem {
    power_attempts: AtomicU32,
    reg_polls: AtomicU32,
    attached: AtomicU32,
    pin_entered: AtomicU32,
}

impl FakeModem {
    fn arc() -> Arc<Self> {
        Arc::new(Self {
            power_attempts: AtomicU32::new(0),
            reg_polls: AtomicU32::new(0),
            attached: AtomicU32::new(0),
            pin_entered: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl Power for FakeModem {
    async fn on(&self) -> Result<(), CapabilityError> {
        if self.power_attempts.fetch_add(1, Ordering::SeqCst) < 2 {
            return Err(CapabilityError::Device("power rail glitch".into()));
        }
        Ok(())
    }

    async fn off(&self) -> Result<(), CapabilityError> {
        Ok(())
    }

    async fn set_at_mode(&self) -> Result<(), CapabilityError> {
        Ok(())
    }
}

#[async_trait]
impl Network for FakeModem {
    async fn set_registration(&self, _plmn: Option<&str>) -> Result<(), CapabilityError> {
        Ok(())
    }

    async fn get_registration_status(
        &self,
        reg_type: RegistrationType,
    ) -> Result<RegistrationStatus, CapabilityError> {
        if reg_type != RegistrationType::Ereg {
            return Err(CapabilityError::Unsupported);
        }
        if self.reg_polls.fetch_add(1, Ordering::SeqCst) < 3 {
            Ok(RegistrationStatus::Searching)
        } else {
            Ok(RegistrationStatus::RegisteredHome)
        }
    }

    async fn get_attach(&self) -> Result<AttachStatus, CapabilityError> {
        if self.attached.load(Ordering::SeqCst) > 0 {
            Ok(AttachStatus::Attached)
        } else {
            Ok(AttachStatus::Detached)
        }
    }

    async fn set_attach(&self) -> Result<(), CapabilityError> {
        self.attached.store(1, Ordering::SeqCst);
        Ok(())
    }

    async fn connect(&self) -> Result<(), CapabilityError> {
        Ok(())
    }
}

#[async_trait]
impl Sim for FakeModem {
    async fn get_sim_state(&self) -> Result<SimState, CapabilityError> {
        if self.pin_entered.load(Ordering::SeqCst) > 0 {
            Ok(SimState::Ready)
        } else {
            Ok(SimState::PinNeeded)
        }
    }

    async fn set_pin(&self, pin: &str) -> Result<(), CapabilityError> {
        if pin == "1234" {
            self.pin_entered.store(1, Ordering::SeqCst);
            Ok(())
        } else {
            Err(CapabilityError::Device("wrong PIN".into()))
        }
    }
}

#[async_trait]
impl Information for FakeModem {
    async fn manufacturer(&self) -> Result<String, CapabilityError> {
        Ok("Fake Wireless".into())
    }

    async fn model(&self) -> Result<String, CapabilityError> {
        Ok("FW-9000".into())
    }

    async fn revision(&self) -> Result<String, CapabilityError> {
        Ok("01.00".into())
    }
}

/// Hands out the fake modem behind every capability handle.
struct FakeDevice(Arc<FakeModem>);

#[async_trait]
impl Device for FakeDevice {
    async fn open_power(&self) -> Result<PowerRef, CapabilityError> {
        Ok(self.0.clone())
    }

    async fn open_network(&self) -> Result<NetworkRef, CapabilityError> {
        Ok(self.0.clone())
    }

    async fn open_sim(&self) -> Result<SimRef, CapabilityError> {
        Ok(self.0.clone())
    }

    async fn open_information(&self) -> Result<InformationRef, CapabilityError> {
        Ok(self.0.clone())
    }

    fn set_timeout(&self, _timeout: Duration) {}

    async fn close_power(&self) {}

    async fn close_network(&self) {}
}

/// Prints every event and lets bring-up continue.
struct Printer;

#[async_trait]
impl Observe for Printer {
    async fn on_event(&self, event: &ConnectionEvent) -> bool {
        match event {
            ConnectionEvent::Transitioned { from, to } => println!("  {from} -> {to}"),
            ConnectionEvent::RetryScheduled {
                state,
                attempt,
                delay,
            } => println!("  retry #{attempt} in {state} after {delay:?}"),
            ConnectionEvent::Failed { state, reason } => {
                println!("  FAILED in {state}: {reason}")
            }
        }
        true
    }

    fn name(&self) -> &'static str {
        "printer"
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cellvisor=info".into()),
        )
        .init();

    let modem = FakeModem::arc();
    let device = Arc::new(FakeDevice(modem.clone())) as DeviceRef;
    let mut controller = Controller::new(device, ControllerConfig::default());
    controller.set_observer(Arc::new(Printer));
    controller.set_sim_pin("1234");

    println!("bringing the modem up:");
    controller.init().await?;
    controller.start_dispatch()?;
    controller.continue_to_state(CellularState::Connected).await?;

    // Poll until the engine reaches steady state.
    while controller.state() != CellularState::Connected {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    println!("connected, state = {}", controller.state());

    controller.stop().await;
    Ok(())
}

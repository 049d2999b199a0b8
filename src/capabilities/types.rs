//! Status types reported by the capability drivers.
//!
//! These mirror what the modem itself reports over AT: SIM readiness,
//! per-technology registration status, and packet-data attach status. The
//! engine only ever *reads* these; producing them is driver territory.

use std::fmt;

/// Readiness of the SIM card.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    /// SIM is unlocked and usable.
    Ready,
    /// SIM requires the PIN code.
    PinNeeded,
    /// SIM requires the PUK code (too many wrong PINs).
    PukNeeded,
    /// SIM state could not be determined.
    Unknown,
}

/// Registration technology to query.
///
/// The engine polls these in declaration order; a driver that does not
/// support a type reports
/// [`CapabilityError::Unsupported`](crate::CapabilityError::Unsupported)
/// and the type is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationType {
    /// EPS registration (+CEREG).
    Ereg,
    /// GPRS registration (+CGREG).
    Greg,
    /// CS registration (+CREG).
    Reg,
}

impl RegistrationType {
    /// All supported registration types, in polling order.
    pub const ALL: [RegistrationType; 3] = [
        RegistrationType::Ereg,
        RegistrationType::Greg,
        RegistrationType::Reg,
    ];
}

/// Per-technology registration status as reported by the modem.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Not registered and not currently searching.
    NotRegistered,
    /// Registered on the home network.
    RegisteredHome,
    /// Not registered, but the modem is searching for an operator.
    Searching,
    /// Registration was explicitly denied by the network.
    Denied,
    /// Status could not be determined.
    Unknown,
    /// Registered on a visited network.
    RegisteredRoaming,
    /// Registered for SMS only, home network.
    SmsOnlyHome,
    /// Registered for SMS only, roaming.
    SmsOnlyRoaming,
    /// Attached for emergency bearer services only.
    EmergencyOnly,
    /// Registered, CSFB not preferred, home network.
    CsfbNotPreferredHome,
    /// Registered, CSFB not preferred, roaming.
    CsfbNotPreferredRoaming,
}

impl RegistrationStatus {
    /// Whether this status counts as registered for bring-up purposes.
    ///
    /// SMS-only and CSFB-not-preferred variants count: the signaling plane is
    /// up even though service is degraded (the engine logs the degradation).
    pub fn is_registered(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::RegisteredHome
                | RegistrationStatus::RegisteredRoaming
                | RegistrationStatus::SmsOnlyHome
                | RegistrationStatus::SmsOnlyRoaming
                | RegistrationStatus::CsfbNotPreferredHome
                | RegistrationStatus::CsfbNotPreferredRoaming
        )
    }

    /// Whether this status indicates a visited (roaming) network.
    pub fn is_roaming(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::RegisteredRoaming
                | RegistrationStatus::SmsOnlyRoaming
                | RegistrationStatus::CsfbNotPreferredRoaming
        )
    }

    /// Whether this status is registered but with degraded service.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::SmsOnlyHome
                | RegistrationStatus::SmsOnlyRoaming
                | RegistrationStatus::CsfbNotPreferredHome
                | RegistrationStatus::CsfbNotPreferredRoaming
        )
    }
}

/// Packet-data attach status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachStatus {
    /// Not attached to the packet domain.
    Detached,
    /// Attached; a bearer can be connected.
    Attached,
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationType::Ereg => f.write_str("CEREG"),
            RegistrationType::Greg => f.write_str("CGREG"),
            RegistrationType::Reg => f.write_str("CREG"),
        }
    }
}

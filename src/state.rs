//! # Bring-up states of a cellular modem.
//!
//! [`CellularState`] enumerates the strict sequence a modem walks through on
//! its way from powered-off to data-connected. The declaration order **is**
//! the protocol order, and the derived `Ord` is load-bearing:
//!
//! - **Rewinding** to an earlier state is a supported operation
//!   ([`CellularState::rewound_to`], used by
//!   [`Controller::continue_to_state`](crate::Controller::continue_to_state)).
//! - **Jumping forward** is not: the engine only ever advances one decision
//!   at a time.
//!
//! ```text
//! PowerOn → DeviceReady → StartCellular → SimPin
//!        → RegisteringNetwork ⇄ RegisterNetwork
//!        → AttachingNetwork ⇄ AttachNetwork
//!        → ConnectNetwork → Connected
//! ```

use std::fmt;

/// One step in the modem bring-up sequence.
///
/// Totally ordered; `min` with a requested state implements the rewind rule.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellularState {
    /// Power the radio module on.
    PowerOn,
    /// Wait for the modem to accept AT commands.
    DeviceReady,
    /// Open the network capability on the device.
    StartCellular,
    /// Unlock the SIM (submit PIN if one is configured).
    SimPin,
    /// Poll registration status across registration types.
    RegisteringNetwork,
    /// Issue an explicit (re-)registration command.
    RegisterNetwork,
    /// Poll packet-data attach status.
    AttachingNetwork,
    /// Issue the packet-data attach command.
    AttachNetwork,
    /// Bring up the data bearer.
    ConnectNetwork,
    /// Steady state: data-connected.
    Connected,
}

impl CellularState {
    /// Returns a short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CellularState::PowerOn => "power_on",
            CellularState::DeviceReady => "device_ready",
            CellularState::StartCellular => "start_cellular",
            CellularState::SimPin => "sim_pin",
            CellularState::RegisteringNetwork => "registering_network",
            CellularState::RegisterNetwork => "register_network",
            CellularState::AttachingNetwork => "attaching_network",
            CellularState::AttachNetwork => "attach_network",
            CellularState::ConnectNetwork => "connect_network",
            CellularState::Connected => "connected",
        }
    }

    /// Applies the rewind rule: the resulting state never advances past `self`.
    ///
    /// ```
    /// use cellvisor::CellularState;
    ///
    /// let current = CellularState::PowerOn;
    /// assert_eq!(current.rewound_to(CellularState::Connected), CellularState::PowerOn);
    ///
    /// let current = CellularState::Connected;
    /// assert_eq!(current.rewound_to(CellularState::PowerOn), CellularState::PowerOn);
    /// ```
    #[inline]
    pub fn rewound_to(self, requested: CellularState) -> CellularState {
        self.min(requested)
    }
}

impl fmt::Display for CellularState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::CellularState::*;

    #[test]
    fn declaration_order_is_protocol_order() {
        let seq = [
            PowerOn,
            DeviceReady,
            StartCellular,
            SimPin,
            RegisteringNetwork,
            RegisterNetwork,
            AttachingNetwork,
            AttachNetwork,
            ConnectNetwork,
            Connected,
        ];
        for pair in seq.windows(2) {
            assert!(pair[0] < pair[1], "{} should precede {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn rewind_never_advances() {
        assert_eq!(PowerOn.rewound_to(Connected), PowerOn);
        assert_eq!(Connected.rewound_to(SimPin), SimPin);
        assert_eq!(SimPin.rewound_to(SimPin), SimPin);
    }
}

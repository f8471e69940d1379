//! Proxy port: the loopback interface pair on a circuit boundary switch.

use crate::{InterfaceId, SwitchId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operational status of a proxy port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortStatus {
    Up,
    Down,
}

impl PortStatus {
    /// Returns the string form used by the topology inventory.
    pub fn as_str(&self) -> &str {
        match self {
            PortStatus::Up => "UP",
            PortStatus::Down => "DOWN",
        }
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortStatus {
    type Err = crate::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" | "up" => Ok(PortStatus::Up),
            "DOWN" | "down" => Ok(PortStatus::Down),
            other => Err(crate::ParseError::InvalidPortStatus(other.to_string())),
        }
    }
}

/// The loopback pair a boundary switch uses to re-inject and extract
/// INT-tagged traffic.
///
/// Packets sent out `source_port` return through `destination_port` with
/// the INT operation applied. The pair lives on the switch hosting the
/// served UNI; its lifecycle is owned by topology management and it is
/// read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyPort {
    /// The UNI interface this proxy port serves.
    pub interface: InterfaceId,
    /// Loop port packets are sent out on.
    pub source_port: u32,
    /// Loop port packets come back in on.
    pub destination_port: u32,
    /// Operational status; must be UP for provisioning.
    pub status: PortStatus,
}

impl ProxyPort {
    /// Creates a new proxy port.
    pub fn new(
        interface: InterfaceId,
        source_port: u32,
        destination_port: u32,
        status: PortStatus,
    ) -> Self {
        ProxyPort {
            interface,
            source_port,
            destination_port,
            status,
        }
    }

    /// Returns the switch hosting the loop.
    pub fn switch(&self) -> &SwitchId {
        self.interface.switch()
    }

    /// Returns true if the loop is operational.
    pub fn is_up(&self) -> bool {
        self.status == PortStatus::Up
    }
}

//! Ethernet Virtual Circuit representation.

use crate::{CircuitId, InterfaceId, SwitchId, VlanTag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A User-Network Interface: one endpoint of a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uni {
    /// The switch interface this UNI is attached to.
    pub interface: InterfaceId,
    /// Customer VLAN tag, when the circuit is tagged at this endpoint.
    pub tag: Option<VlanTag>,
}

impl Uni {
    /// Creates a new UNI.
    pub fn new(interface: InterfaceId, tag: Option<VlanTag>) -> Self {
        Uni { interface, tag }
    }

    /// Returns the switch hosting this UNI.
    pub fn switch(&self) -> &SwitchId {
        self.interface.switch()
    }
}

/// One switch on a circuit's path, with the ports the circuit traverses.
///
/// Hops are ordered from UNI A to UNI Z. `ingress` is the port facing the
/// previous element (the UNI A port for the first hop), `egress` the port
/// facing the next (the UNI Z port for the last hop). Reversing the
/// direction reverses the hop list and swaps ingress/egress per hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathHop {
    /// The switch at this position of the path.
    pub switch: SwitchId,
    /// Port where the circuit's traffic enters this switch (A to Z).
    pub ingress: u32,
    /// Port where the circuit's traffic leaves this switch (A to Z).
    pub egress: u32,
}

impl PathHop {
    /// Creates a new path hop.
    pub fn new(switch: SwitchId, ingress: u32, egress: u32) -> Self {
        PathHop {
            switch,
            ingress,
            egress,
        }
    }

    /// Returns this hop oriented for the opposite direction.
    pub fn reversed(&self) -> PathHop {
        PathHop {
            switch: self.switch.clone(),
            ingress: self.egress,
            egress: self.ingress,
        }
    }
}

/// Direction coverage recorded in a circuit's telemetry metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryDirection {
    /// INT flows installed for both directions of the circuit.
    Bidirectional,
    /// INT flows installed for a single direction (legacy deployments).
    Unidirectional,
}

impl TelemetryDirection {
    /// Returns the string form used in stored metadata.
    pub fn as_str(&self) -> &str {
        match self {
            TelemetryDirection::Bidirectional => "bidirectional",
            TelemetryDirection::Unidirectional => "unidirectional",
        }
    }
}

impl fmt::Display for TelemetryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TelemetryDirection {
    type Err = crate::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bidirectional" => Ok(TelemetryDirection::Bidirectional),
            "unidirectional" => Ok(TelemetryDirection::Unidirectional),
            other => Err(crate::ParseError::InvalidDirection(other.to_string())),
        }
    }
}

/// Telemetry state stored as circuit metadata by the inventory.
///
/// Presence of this metadata on a circuit means INT is enabled on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryMetadata {
    /// Which directions carry INT flows.
    pub direction: TelemetryDirection,
    /// When INT was enabled on the circuit.
    pub enabled_at: DateTime<Utc>,
}

impl TelemetryMetadata {
    /// Metadata for a freshly provisioned bidirectional circuit.
    pub fn bidirectional() -> Self {
        TelemetryMetadata {
            direction: TelemetryDirection::Bidirectional,
            enabled_at: Utc::now(),
        }
    }
}

/// An Ethernet Virtual Circuit as read from the controller inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    /// Inventory-assigned circuit id.
    pub id: CircuitId,
    /// Human-readable circuit name.
    pub name: String,
    /// Endpoint A.
    pub uni_a: Uni,
    /// Endpoint Z.
    pub uni_z: Uni,
    /// Ordered switch path from UNI A to UNI Z, endpoints included.
    pub path: Vec<PathHop>,
    /// Telemetry metadata; `Some` iff INT is enabled on this circuit.
    pub telemetry: Option<TelemetryMetadata>,
}

impl Circuit {
    /// Returns true if INT is enabled on this circuit.
    pub fn has_int_enabled(&self) -> bool {
        self.telemetry.is_some()
    }

    /// Returns the first switch of the path (the UNI A side).
    pub fn source_switch(&self) -> Option<&SwitchId> {
        self.path.first().map(|hop| &hop.switch)
    }

    /// Returns the last switch of the path (the UNI Z side).
    pub fn sink_switch(&self) -> Option<&SwitchId> {
        self.path.last().map(|hop| &hop.switch)
    }

    /// Returns the switches on the path, in A to Z order.
    pub fn switches(&self) -> impl Iterator<Item = &SwitchId> {
        self.path.iter().map(|hop| &hop.switch)
    }

    /// Checks the path against the circuit's endpoints.
    ///
    /// Returns a human-readable reason when the topology cannot carry INT:
    /// an empty path, endpoints on the same switch, or a path whose first
    /// or last switch disagrees with the UNIs.
    pub fn topology_error(&self) -> Option<String> {
        let (first, last) = match (self.path.first(), self.path.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Some("circuit has an empty path".to_string()),
        };

        if self.path.len() < 2 || first.switch == last.switch {
            return Some("source and sink are the same switch".to_string());
        }
        if first.switch != *self.uni_a.switch() {
            return Some(format!(
                "path starts at '{}' but UNI A is on '{}'",
                first.switch,
                self.uni_a.switch()
            ));
        }
        if last.switch != *self.uni_z.switch() {
            return Some(format!(
                "path ends at '{}' but UNI Z is on '{}'",
                last.switch,
                self.uni_z.switch()
            ));
        }
        None
    }
}

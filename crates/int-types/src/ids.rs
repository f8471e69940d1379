//! Identity newtypes with validation.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an Ethernet Virtual Circuit.
///
/// Circuit ids are opaque strings assigned by the controller's circuit
/// inventory. The only local invariant is non-emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CircuitId(String);

impl CircuitId {
    /// Creates a new circuit id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ParseError::InvalidCircuitId);
        }
        Ok(CircuitId(id))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CircuitId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CircuitId::new(s)
    }
}

impl TryFrom<String> for CircuitId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CircuitId::new(value)
    }
}

impl From<CircuitId> for String {
    fn from(id: CircuitId) -> Self {
        id.0
    }
}

/// Identifier of a switch (datapath id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SwitchId(String);

impl SwitchId {
    /// Creates a new switch id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ParseError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ParseError::InvalidSwitchId);
        }
        Ok(SwitchId(id))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SwitchId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SwitchId::new(s)
    }
}

impl TryFrom<String> for SwitchId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SwitchId::new(value)
    }
}

impl From<SwitchId> for String {
    fn from(id: SwitchId) -> Self {
        id.0
    }
}

/// Identifier of a switch interface, rendered as `<switch>:<port>`.
///
/// The port number is the OpenFlow port on the owning switch. The last
/// colon separates switch from port, so switch ids may themselves contain
/// colons (datapath ids usually do).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InterfaceId {
    switch: SwitchId,
    port: u32,
}

impl InterfaceId {
    /// Creates a new interface id.
    pub fn new(switch: SwitchId, port: u32) -> Self {
        InterfaceId { switch, port }
    }

    /// Returns the owning switch.
    pub fn switch(&self) -> &SwitchId {
        &self.switch
    }

    /// Returns the port number on the owning switch.
    pub fn port(&self) -> u32 {
        self.port
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.switch, self.port)
    }
}

impl FromStr for InterfaceId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (switch, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseError::InvalidInterfaceId(s.to_string()))?;
        let port = port
            .parse()
            .map_err(|_| ParseError::InvalidInterfaceId(s.to_string()))?;
        let switch =
            SwitchId::new(switch).map_err(|_| ParseError::InvalidInterfaceId(s.to_string()))?;
        Ok(InterfaceId { switch, port })
    }
}

impl TryFrom<String> for InterfaceId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InterfaceId> for String {
    fn from(id: InterfaceId) -> Self {
        id.to_string()
    }
}

/// IEEE 802.1Q VLAN tag (1-4094).
///
/// VLAN 0 is reserved (priority tagged frames), VLAN 4095 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanTag(u16);

impl VlanTag {
    /// Minimum valid VLAN tag.
    pub const MIN: u16 = 1;

    /// Maximum valid VLAN tag.
    pub const MAX: u16 = 4094;

    /// Creates a new VLAN tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is not in the valid range (1-4094).
    pub const fn new(tag: u16) -> Result<Self, ParseError> {
        if tag >= Self::MIN && tag <= Self::MAX {
            Ok(VlanTag(tag))
        } else {
            Err(ParseError::InvalidVlanTag(tag))
        }
    }

    /// Returns the tag as a u16.
    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VlanTag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag: u16 = s.parse().map_err(|_| ParseError::InvalidVlanTag(0))?;
        VlanTag::new(tag)
    }
}

impl TryFrom<u16> for VlanTag {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        VlanTag::new(value)
    }
}

impl From<VlanTag> for u16 {
    fn from(tag: VlanTag) -> Self {
        tag.0
    }
}

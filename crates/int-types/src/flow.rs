//! INT flow rule specifications.

use crate::{CircuitId, SwitchId, VlanTag};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of traffic along a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntDirection {
    /// UNI A is the ingress, UNI Z the egress.
    AToZ,
    /// UNI Z is the ingress, UNI A the egress.
    ZToA,
}

impl IntDirection {
    /// Both circuit directions, in provisioning order.
    pub const BOTH: [IntDirection; 2] = [IntDirection::ZToA, IntDirection::AToZ];

    /// Returns the string form.
    pub fn as_str(&self) -> &str {
        match self {
            IntDirection::AToZ => "a_to_z",
            IntDirection::ZToA => "z_to_a",
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(&self) -> IntDirection {
        match self {
            IntDirection::AToZ => IntDirection::ZToA,
            IntDirection::ZToA => IntDirection::AToZ,
        }
    }
}

impl fmt::Display for IntDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntDirection {
    type Err = crate::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a_to_z" => Ok(IntDirection::AToZ),
            "z_to_a" => Ok(IntDirection::ZToA),
            other => Err(crate::ParseError::InvalidDirection(other.to_string())),
        }
    }
}

/// INT behavior a flow rule implements on its switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntRole {
    /// Ingress switch: adds INT metadata to matching traffic.
    Source,
    /// Interior switch: forwards INT-tagged traffic, metadata intact.
    Hop,
    /// Egress switch: strips INT metadata and restores the original frame.
    Sink,
}

impl IntRole {
    /// Returns the string form.
    pub fn as_str(&self) -> &str {
        match self {
            IntRole::Source => "source",
            IntRole::Hop => "hop",
            IntRole::Sink => "sink",
        }
    }
}

impl fmt::Display for IntRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match fields of an INT flow rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMatch {
    /// Ingress port the rule matches on.
    pub in_port: u32,
    /// VLAN tag to match, when the traffic is tagged.
    pub dl_vlan: Option<VlanTag>,
    /// Whether the rule matches only INT-tagged traffic.
    pub int_tagged: bool,
}

impl FlowMatch {
    /// Match on untagged-by-INT traffic entering `in_port`.
    pub fn ingress(in_port: u32, dl_vlan: Option<VlanTag>) -> Self {
        FlowMatch {
            in_port,
            dl_vlan,
            int_tagged: false,
        }
    }

    /// Match on INT-tagged traffic entering `in_port`.
    pub fn int_tagged(in_port: u32, dl_vlan: Option<VlanTag>) -> Self {
        FlowMatch {
            in_port,
            dl_vlan,
            int_tagged: true,
        }
    }
}

/// A single action of an INT flow rule.
///
/// The orchestrator treats actions as opaque payload; the concrete INT
/// header layout is the installation backend's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    /// Push an INT header onto the packet.
    PushInt,
    /// Populate per-hop INT metadata fields.
    AddIntMetadata,
    /// Strip the INT header, restoring the original frame.
    PopInt,
    /// Rewrite the VLAN tag.
    SetVlan(VlanTag),
    /// Forward out the given port.
    Output(u32),
}

/// A flow rule targeted at one switch, owned by one circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRule {
    /// Switch the rule is installed on.
    pub switch: SwitchId,
    /// Circuit the rule belongs to; used to locate rules on removal.
    pub owner: CircuitId,
    /// Circuit direction this rule serves.
    pub direction: IntDirection,
    /// INT role the rule implements.
    pub role: IntRole,
    /// Pipeline table the rule goes into.
    pub table_id: u8,
    /// Rule priority; INT rules outrank the circuit's base forwarding rules.
    pub priority: u16,
    /// Match fields.
    pub match_fields: FlowMatch,
    /// Ordered action list.
    pub actions: Vec<FlowAction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_direction_reversed() {
        assert_eq!(IntDirection::AToZ.reversed(), IntDirection::ZToA);
        assert_eq!(IntDirection::ZToA.reversed(), IntDirection::AToZ);
    }

    #[test]
    fn test_direction_roundtrip() {
        for dir in IntDirection::BOTH {
            assert_eq!(dir.as_str().parse::<IntDirection>().unwrap(), dir);
        }
        assert!("up".parse::<IntDirection>().is_err());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(IntRole::Source.to_string(), "source");
        assert_eq!(IntRole::Hop.to_string(), "hop");
        assert_eq!(IntRole::Sink.to_string(), "sink");
    }

    #[test]
    fn test_flow_match_ctors() {
        let m = FlowMatch::ingress(3, None);
        assert!(!m.int_tagged);
        assert_eq!(m.in_port, 3);

        let m = FlowMatch::int_tagged(7, Some(VlanTag::new(200).unwrap()));
        assert!(m.int_tagged);
        assert_eq!(m.dl_vlan.unwrap().as_u16(), 200);
    }

    #[test]
    fn test_flow_rule_serde_roundtrip() {
        let rule = FlowRule {
            switch: SwitchId::new("s1").unwrap(),
            owner: CircuitId::new("c1").unwrap(),
            direction: IntDirection::AToZ,
            role: IntRole::Source,
            table_id: 0,
            priority: 20100,
            match_fields: FlowMatch::ingress(1, Some(VlanTag::new(100).unwrap())),
            actions: vec![FlowAction::PushInt, FlowAction::Output(5)],
        };

        let json = serde_json::to_string(&rule).unwrap();
        let back: FlowRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }
}

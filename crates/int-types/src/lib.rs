//! Common domain types for EVC in-band telemetry provisioning.
//!
//! This crate provides type-safe representations of the entities the INT
//! control plane works with:
//!
//! - [`CircuitId`], [`SwitchId`], [`InterfaceId`]: validated identities
//! - [`VlanTag`]: IEEE 802.1Q VLAN identifiers
//! - [`Circuit`]: an Ethernet Virtual Circuit with its UNIs and switch path
//! - [`ProxyPort`]: the loopback interface pair on a circuit boundary switch
//! - [`FlowRule`]: a per-switch INT flow specification (source/hop/sink)

mod circuit;
mod flow;
mod ids;
mod proxy_port;

pub use circuit::{Circuit, PathHop, TelemetryDirection, TelemetryMetadata, Uni};
pub use flow::{FlowAction, FlowMatch, FlowRule, IntDirection, IntRole};
pub use ids::{CircuitId, InterfaceId, SwitchId, VlanTag};
pub use proxy_port::{PortStatus, ProxyPort};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid circuit id: must not be empty")]
    InvalidCircuitId,

    #[error("invalid switch id: must not be empty")]
    InvalidSwitchId,

    #[error("invalid interface id: {0} (expected <switch>:<port>)")]
    InvalidInterfaceId(String),

    #[error("invalid VLAN tag: {0} (must be 1-4094)")]
    InvalidVlanTag(u16),

    #[error("invalid INT direction: {0}")]
    InvalidDirection(String),

    #[error("invalid port status: {0}")]
    InvalidPortStatus(String),
}

//! Traits toward the orchestrator's external collaborators.
//!
//! The INT manager performs every side effect through these seams: flow
//! installation on switches, the controller's circuit inventory, and the
//! topology service resolving proxy ports. Implementations wrap the real
//! controller APIs in production and in-memory state in tests.
//!
//! Implementations signal communication failures as
//! [`IntError::Transient`](crate::IntError::Transient) (the caller retries
//! under its policy) and malformed-payload refusals as
//! [`IntError::Rejected`](crate::IntError::Rejected) (terminal).

use crate::error::IntResult;
use async_trait::async_trait;
use int_types::{Circuit, CircuitId, FlowRule, InterfaceId, ProxyPort, SwitchId, TelemetryMetadata};

/// Flow-rule installation backend on physical/virtual switches.
///
/// One call targets exactly one switch; the backend is expected to apply
/// a batch atomically per switch. Rules carry their owning circuit id so
/// concurrent batches from different circuits do not clobber each other.
#[async_trait]
pub trait FlowBackend: Send + Sync {
    /// Installs a batch of flow rules on one switch.
    async fn install(&self, switch: &SwitchId, flows: Vec<FlowRule>) -> IntResult<()>;

    /// Removes all flow rules owned by `circuit` from one switch.
    async fn remove(&self, switch: &SwitchId, circuit: &CircuitId) -> IntResult<()>;

    /// Returns the flow rules owned by `circuit` installed on one switch.
    ///
    /// Used for decommission precondition checks and flow audits.
    async fn fetch(&self, switch: &SwitchId, circuit: &CircuitId) -> IntResult<Vec<FlowRule>>;
}

/// The controller's circuit (EVC) inventory.
#[async_trait]
pub trait CircuitInventory: Send + Sync {
    /// Resolves a single circuit by id; `None` if the inventory has no
    /// such circuit.
    async fn resolve(&self, id: &CircuitId) -> IntResult<Option<Circuit>>;

    /// Returns every circuit the inventory knows about.
    async fn resolve_all(&self) -> IntResult<Vec<Circuit>>;

    /// Writes back the circuit's telemetry metadata.
    ///
    /// `Some` marks the circuit INT-enabled, `None` clears the marker.
    async fn set_telemetry(
        &self,
        id: &CircuitId,
        metadata: Option<TelemetryMetadata>,
    ) -> IntResult<()>;
}

/// Resolves the proxy port serving a UNI interface.
///
/// Proxy port lifecycle is owned by topology management; this seam is the
/// natural subscription point for future topology-change eventing.
#[async_trait]
pub trait ProxyPortResolver: Send + Sync {
    /// Returns the proxy port for the interface, or `None` when no loop
    /// is configured for it.
    async fn resolve(&self, interface: &InterfaceId) -> IntResult<Option<ProxyPort>>;
}

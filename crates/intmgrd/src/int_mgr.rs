//! IntManager - bulk INT provisioning/decommissioning orchestrator.
//!
//! Drives per-circuit validation, flow generation, batched dispatch, and
//! failure classification across a bulk request. Circuits are independent
//! units of work: one circuit's failure never aborts the others, and the
//! result always covers every requested circuit.

use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use int_common::{
    CircuitInventory, FlowBackend, IntError, IntResult, ProxyPortResolver, RetryPolicy,
};
use int_types::{Circuit, CircuitId, FlowRule, ProxyPort, SwitchId, TelemetryMetadata, Uni};

use crate::dispatch::{self, group_by_switch};
use crate::flow_gen;

/// Terminal outcome of one circuit within a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitOutcome {
    /// INT flows installed on every path switch, metadata written back.
    Enabled,
    /// INT flows removed from every path switch, metadata cleared.
    Disabled,
    /// The circuit failed with a classified error.
    Failed(IntError),
}

impl CircuitOutcome {
    /// Returns true if this outcome is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, CircuitOutcome::Failed(_))
    }

    /// Returns the classified error, when failed.
    pub fn error(&self) -> Option<&IntError> {
        match self {
            CircuitOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Per-circuit outcomes of a bulk enable/disable call.
///
/// Always holds exactly one entry per requested circuit; the bulk call
/// itself never fails atomically.
pub type BulkReport = BTreeMap<CircuitId, CircuitOutcome>;

/// A circuit whose installed flows disagree with its telemetry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowDiscrepancy {
    /// The INT-enabled circuit with inconsistent flow state.
    pub circuit: CircuitId,
    /// Path switches holding none of the circuit's rules.
    pub missing: Vec<SwitchId>,
    /// Path switches that could not be queried within the retry budget.
    pub unreachable: Vec<SwitchId>,
}

/// The INT provisioning orchestrator.
///
/// Constructed once per hosting-service lifecycle with its collaborators
/// injected; holds no global state.
#[derive(Clone)]
pub struct IntManager {
    inventory: Arc<dyn CircuitInventory>,
    proxy_ports: Arc<dyn ProxyPortResolver>,
    backend: Arc<dyn FlowBackend>,
    retry: RetryPolicy,
}

impl IntManager {
    /// Creates a manager with the default retry policy.
    pub fn new(
        inventory: Arc<dyn CircuitInventory>,
        proxy_ports: Arc<dyn ProxyPortResolver>,
        backend: Arc<dyn FlowBackend>,
    ) -> Self {
        Self {
            inventory,
            proxy_ports,
            backend,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enables INT on every requested circuit, both directions.
    ///
    /// `None` entries stand for circuit ids that were requested but not
    /// found upstream; they fail with `CircuitNotFound`. Re-enabling an
    /// already-INT circuit fails with `AlreadyEnabled` unless `force` is
    /// set. Circuits are processed concurrently.
    #[instrument(skip(self, requests), fields(circuits = requests.len()))]
    pub async fn enable_int(
        &self,
        requests: BTreeMap<CircuitId, Option<Circuit>>,
        force: bool,
    ) -> BulkReport {
        let tasks = requests.into_iter().map(|(id, circuit)| {
            let mgr = self.clone();
            async move {
                let outcome = match mgr.enable_circuit(&id, circuit, force).await {
                    Ok(()) => CircuitOutcome::Enabled,
                    Err(err) => {
                        warn!(circuit = %id, error = %err, "INT enable failed");
                        CircuitOutcome::Failed(err)
                    }
                };
                (id, outcome)
            }
        });
        join_all(tasks).await.into_iter().collect()
    }

    /// Disables INT on every requested circuit.
    ///
    /// Disabling a non-INT circuit fails with `NotEnabled` unless `force`
    /// is set; with `force`, absent flows count as already-satisfied
    /// removal.
    #[instrument(skip(self, requests), fields(circuits = requests.len()))]
    pub async fn disable_int(
        &self,
        requests: BTreeMap<CircuitId, Option<Circuit>>,
        force: bool,
    ) -> BulkReport {
        let tasks = requests.into_iter().map(|(id, circuit)| {
            let mgr = self.clone();
            async move {
                let outcome = match mgr.disable_circuit(&id, circuit, force).await {
                    Ok(()) => CircuitOutcome::Disabled,
                    Err(err) => {
                        warn!(circuit = %id, error = %err, "INT disable failed");
                        CircuitOutcome::Failed(err)
                    }
                };
                (id, outcome)
            }
        });
        join_all(tasks).await.into_iter().collect()
    }

    /// Resolves the requested ids and enables INT on them.
    ///
    /// An empty id list means "all circuits currently without INT".
    pub async fn enable_by_ids(&self, ids: &[CircuitId], force: bool) -> IntResult<BulkReport> {
        let targets = self.select_targets(ids, false).await?;
        Ok(self.enable_int(targets, force).await)
    }

    /// Resolves the requested ids and disables INT on them.
    ///
    /// An empty id list means "all circuits currently with INT enabled".
    pub async fn disable_by_ids(&self, ids: &[CircuitId], force: bool) -> IntResult<BulkReport> {
        let targets = self.select_targets(ids, true).await?;
        Ok(self.disable_int(targets, force).await)
    }

    /// Returns every circuit currently INT-enabled, metadata included.
    pub async fn enabled_circuits(&self) -> IntResult<Vec<Circuit>> {
        Ok(self
            .resolve_all()
            .await?
            .into_iter()
            .filter(|circuit| circuit.has_int_enabled())
            .collect())
    }

    /// Compares installed flows against telemetry metadata.
    ///
    /// For every INT-enabled circuit, queries each path switch for the
    /// circuit's rules and reports switches holding none, plus switches
    /// that stayed unreachable through the retry budget. Read-only; the
    /// report is the operator's reconciliation work list.
    #[instrument(skip(self))]
    pub async fn audit_flows(&self) -> IntResult<Vec<FlowDiscrepancy>> {
        let mut report = Vec::new();

        for circuit in self.enabled_circuits().await? {
            let mut missing = Vec::new();
            let mut unreachable = Vec::new();

            for switch in circuit.switches() {
                match self.fetch_flows(&circuit.id, switch).await {
                    Ok(flows) if flows.is_empty() => missing.push(switch.clone()),
                    Ok(_) => {}
                    Err(err) => {
                        warn!(circuit = %circuit.id, %switch, error = %err,
                              "flow audit could not query switch");
                        unreachable.push(switch.clone());
                    }
                }
            }

            if !missing.is_empty() || !unreachable.is_empty() {
                report.push(FlowDiscrepancy {
                    circuit: circuit.id.clone(),
                    missing,
                    unreachable,
                });
            }
        }

        Ok(report)
    }

    async fn enable_circuit(
        &self,
        id: &CircuitId,
        circuit: Option<Circuit>,
        force: bool,
    ) -> IntResult<()> {
        let circuit = circuit.ok_or_else(|| IntError::CircuitNotFound {
            circuit: id.clone(),
        })?;

        if circuit.has_int_enabled() && !force {
            return Err(IntError::AlreadyEnabled {
                circuit: id.clone(),
            });
        }
        if let Some(reason) = circuit.topology_error() {
            return Err(IntError::InvalidTopology {
                circuit: id.clone(),
                reason,
            });
        }

        let proxy_a = self.resolve_proxy_port(id, &circuit.uni_a).await?;
        let proxy_z = self.resolve_proxy_port(id, &circuit.uni_z).await?;

        // Both directions are generated before any dispatch so shared
        // switches receive one combined batch.
        let flows = flow_gen::generate_circuit(&circuit, &proxy_a, &proxy_z);
        let batches = group_by_switch(flows);
        debug!(circuit = %id, switches = batches.len(), "dispatching INT install batches");

        let backend = Arc::clone(&self.backend);
        self.retry
            .run("int flow install", || {
                dispatch::install_batches(Arc::clone(&backend), batches.clone())
            })
            .await?;

        self.write_back(id, Some(TelemetryMetadata::bidirectional()))
            .await?;
        info!(circuit = %id, "INT enabled");
        Ok(())
    }

    async fn disable_circuit(
        &self,
        id: &CircuitId,
        circuit: Option<Circuit>,
        force: bool,
    ) -> IntResult<()> {
        let circuit = circuit.ok_or_else(|| IntError::CircuitNotFound {
            circuit: id.clone(),
        })?;

        if !circuit.has_int_enabled() && !force {
            return Err(IntError::NotEnabled {
                circuit: id.clone(),
            });
        }

        let switches: Vec<SwitchId> = circuit.switches().cloned().collect();

        if !force {
            // Flow inventory precondition: every path switch must still
            // hold the circuit's rules.
            for switch in &switches {
                let flows = self.fetch_flows(id, switch).await?;
                if flows.is_empty() {
                    return Err(IntError::FlowsNotFound {
                        circuit: id.clone(),
                        switch: switch.clone(),
                    });
                }
            }
        }

        debug!(circuit = %id, switches = switches.len(), "dispatching INT removal batches");
        let backend = Arc::clone(&self.backend);
        let circuit_id = id.clone();
        self.retry
            .run("int flow removal", move || {
                dispatch::remove_batches(
                    Arc::clone(&backend),
                    circuit_id.clone(),
                    switches.clone(),
                )
            })
            .await?;

        self.write_back(id, None).await?;
        info!(circuit = %id, "INT disabled");
        Ok(())
    }

    /// Telemetry metadata write-back, inside the circuit's retry unit.
    ///
    /// Flows are already updated when this runs; exhausting the budget
    /// here leaves the circuit needing reconciliation, which is an
    /// internal inconsistency rather than plain unavailability.
    async fn write_back(
        &self,
        id: &CircuitId,
        metadata: Option<TelemetryMetadata>,
    ) -> IntResult<()> {
        let inventory = Arc::clone(&self.inventory);
        let result = self
            .retry
            .run("telemetry metadata write-back", || {
                let inventory = Arc::clone(&inventory);
                let id = id.clone();
                let metadata = metadata.clone();
                async move { inventory.set_telemetry(&id, metadata).await }
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(IntError::RetryExhausted { last, .. }) => Err(IntError::unrecoverable(format!(
                "flows updated for circuit '{id}' but metadata write-back kept failing ({last}); \
                 reconciliation required"
            ))),
            Err(other) => Err(other),
        }
    }

    async fn resolve_proxy_port(&self, id: &CircuitId, uni: &Uni) -> IntResult<ProxyPort> {
        let resolver = Arc::clone(&self.proxy_ports);
        let interface = uni.interface.clone();

        let resolved = self
            .retry
            .run("proxy port resolve", || {
                let resolver = Arc::clone(&resolver);
                let interface = interface.clone();
                async move { resolver.resolve(&interface).await }
            })
            .await?;

        let proxy = resolved.ok_or_else(|| IntError::ProxyPortNotFound {
            circuit: id.clone(),
            interface: interface.clone(),
        })?;

        // Hardware state cannot be forced.
        if !proxy.is_up() {
            return Err(IntError::ProxyPortDown {
                circuit: id.clone(),
                interface,
            });
        }
        Ok(proxy)
    }

    async fn fetch_flows(&self, id: &CircuitId, switch: &SwitchId) -> IntResult<Vec<FlowRule>> {
        let backend = Arc::clone(&self.backend);
        self.retry
            .run("int flow fetch", || {
                let backend = Arc::clone(&backend);
                let switch = switch.clone();
                let id = id.clone();
                async move { backend.fetch(&switch, &id).await }
            })
            .await
    }

    /// Builds the request map for a bulk call.
    ///
    /// A single id uses a point lookup; anything else resolves the whole
    /// inventory. With explicit ids, unknown ones map to `None` so the
    /// report covers them as not-found. With no ids the implicit filter
    /// applies: circuits whose INT state equals `with_int`.
    async fn select_targets(
        &self,
        ids: &[CircuitId],
        with_int: bool,
    ) -> IntResult<BTreeMap<CircuitId, Option<Circuit>>> {
        if ids.len() == 1 {
            let id = &ids[0];
            let circuit = self.resolve_one(id).await?;
            return Ok(BTreeMap::from([(id.clone(), circuit)]));
        }

        let mut by_id: BTreeMap<CircuitId, Circuit> = self
            .resolve_all()
            .await?
            .into_iter()
            .map(|circuit| (circuit.id.clone(), circuit))
            .collect();

        if ids.is_empty() {
            Ok(by_id
                .into_iter()
                .filter(|(_, circuit)| circuit.has_int_enabled() == with_int)
                .map(|(id, circuit)| (id, Some(circuit)))
                .collect())
        } else {
            Ok(ids
                .iter()
                .map(|id| (id.clone(), by_id.remove(id)))
                .collect())
        }
    }

    async fn resolve_one(&self, id: &CircuitId) -> IntResult<Option<Circuit>> {
        let inventory = Arc::clone(&self.inventory);
        self.retry
            .run("circuit resolve", || {
                let inventory = Arc::clone(&inventory);
                let id = id.clone();
                async move { inventory.resolve(&id).await }
            })
            .await
    }

    async fn resolve_all(&self) -> IntResult<Vec<Circuit>> {
        let inventory = Arc::clone(&self.inventory);
        self.retry
            .run("circuit inventory resolve", || {
                let inventory = Arc::clone(&inventory);
                async move { inventory.resolve_all().await }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outcome_helpers() {
        assert!(!CircuitOutcome::Enabled.is_failure());
        assert!(!CircuitOutcome::Disabled.is_failure());

        let failed = CircuitOutcome::Failed(IntError::unrecoverable("boom"));
        assert!(failed.is_failure());
        assert!(matches!(
            failed.error(),
            Some(IntError::Unrecoverable { .. })
        ));
        assert_eq!(CircuitOutcome::Enabled.error(), None);
    }
}

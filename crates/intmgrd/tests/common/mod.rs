//! In-memory doubles for the INT manager's external collaborators.

use async_trait::async_trait;
use int_common::{CircuitInventory, FlowBackend, IntError, IntResult, ProxyPortResolver, RetryPolicy};
use int_types::{
    Circuit, CircuitId, FlowRule, InterfaceId, PathHop, PortStatus, ProxyPort, SwitchId,
    TelemetryMetadata, Uni, VlanTag,
};
use intmgrd::IntManager;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub fn switch(name: &str) -> SwitchId {
    name.parse().unwrap()
}

pub fn circuit_id(id: &str) -> CircuitId {
    id.parse().unwrap()
}

/// Builds a linear circuit over the named switches.
///
/// UNI ports are port 1 on the first and last switch; inter-switch links
/// use ports 2 (egress) and 3 (ingress).
pub fn circuit_with_path(id: &str, switches: &[&str]) -> Circuit {
    assert!(!switches.is_empty());
    let first = switch(switches[0]);
    let last = switch(switches[switches.len() - 1]);

    let path = switches
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let ingress = if i == 0 { 1 } else { 3 };
            let egress = if i == switches.len() - 1 { 1 } else { 2 };
            PathHop::new(switch(name), ingress, egress)
        })
        .collect();

    Circuit {
        id: circuit_id(id),
        name: format!("circuit {id}"),
        uni_a: Uni::new(InterfaceId::new(first, 1), Some(VlanTag::new(100).unwrap())),
        uni_z: Uni::new(InterfaceId::new(last, 1), Some(VlanTag::new(100).unwrap())),
        path,
        telemetry: None,
    }
}

/// In-memory switch fabric: installed rules plus failure injection.
#[derive(Default)]
pub struct MockFabric {
    flows: Mutex<HashMap<SwitchId, Vec<FlowRule>>>,
    install_calls: Mutex<Vec<(SwitchId, usize)>>,
    transient_installs: Mutex<HashMap<SwitchId, u32>>,
    rejecting: Mutex<HashSet<SwitchId>>,
    fetch_failing: Mutex<HashSet<SwitchId>>,
}

impl MockFabric {
    /// Fails the next `times` install calls on `switch` transiently.
    pub fn fail_install(&self, switch: &SwitchId, times: u32) {
        self.transient_installs
            .lock()
            .unwrap()
            .insert(switch.clone(), times);
    }

    /// Makes `switch` reject every install as malformed.
    pub fn reject_switch(&self, switch: &SwitchId) {
        self.rejecting.lock().unwrap().insert(switch.clone());
    }

    /// Makes flow queries against `switch` fail transiently, forever.
    pub fn fail_fetch(&self, switch: &SwitchId) {
        self.fetch_failing.lock().unwrap().insert(switch.clone());
    }

    /// Drops every rule owned by `circuit` on `switch` (out-of-band loss).
    pub fn drop_rules(&self, switch: &SwitchId, circuit: &CircuitId) {
        if let Some(rules) = self.flows.lock().unwrap().get_mut(switch) {
            rules.retain(|rule| rule.owner != *circuit);
        }
    }

    /// Number of rules owned by `circuit` on `switch`.
    pub fn rules_on(&self, switch: &SwitchId, circuit: &CircuitId) -> usize {
        self.flows
            .lock()
            .unwrap()
            .get(switch)
            .map(|rules| rules.iter().filter(|r| r.owner == *circuit).count())
            .unwrap_or(0)
    }

    /// Total rules owned by `circuit` across all switches.
    pub fn total_rules(&self, circuit: &CircuitId) -> usize {
        self.flows
            .lock()
            .unwrap()
            .values()
            .flatten()
            .filter(|r| r.owner == *circuit)
            .count()
    }

    /// Install calls recorded so far, as (switch, batch size).
    pub fn install_calls(&self) -> Vec<(SwitchId, usize)> {
        self.install_calls.lock().unwrap().clone()
    }

    /// Install calls that targeted `switch`.
    pub fn install_calls_on(&self, switch: &SwitchId) -> usize {
        self.install_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == switch)
            .count()
    }
}

#[async_trait]
impl FlowBackend for MockFabric {
    async fn install(&self, switch: &SwitchId, flows: Vec<FlowRule>) -> IntResult<()> {
        self.install_calls
            .lock()
            .unwrap()
            .push((switch.clone(), flows.len()));

        if self.rejecting.lock().unwrap().contains(switch) {
            return Err(IntError::rejected(switch.clone(), "install", "bad payload"));
        }

        {
            let mut transient = self.transient_installs.lock().unwrap();
            if let Some(remaining) = transient.get_mut(switch) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(IntError::transient("install", "connection reset"));
                }
            }
        }

        // Batches are applied per owner, replacing any prior rules, the way
        // a cookie-scoped backend overwrite behaves.
        let mut store = self.flows.lock().unwrap();
        let rules = store.entry(switch.clone()).or_default();
        if let Some(owner) = flows.first().map(|f| f.owner.clone()) {
            rules.retain(|rule| rule.owner != owner);
        }
        rules.extend(flows);
        Ok(())
    }

    async fn remove(&self, switch: &SwitchId, circuit: &CircuitId) -> IntResult<()> {
        if let Some(rules) = self.flows.lock().unwrap().get_mut(switch) {
            rules.retain(|rule| rule.owner != *circuit);
        }
        Ok(())
    }

    async fn fetch(&self, switch: &SwitchId, circuit: &CircuitId) -> IntResult<Vec<FlowRule>> {
        if self.fetch_failing.lock().unwrap().contains(switch) {
            return Err(IntError::transient("fetch", "connection reset"));
        }
        Ok(self
            .flows
            .lock()
            .unwrap()
            .get(switch)
            .map(|rules| {
                rules
                    .iter()
                    .filter(|r| r.owner == *circuit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// In-memory circuit inventory.
#[derive(Default)]
pub struct MockInventory {
    circuits: Mutex<BTreeMap<CircuitId, Circuit>>,
    resolve_failures: AtomicU32,
    write_back_failures: AtomicU32,
}

impl MockInventory {
    pub fn insert(&self, circuit: Circuit) {
        self.circuits
            .lock()
            .unwrap()
            .insert(circuit.id.clone(), circuit);
    }

    pub fn get(&self, id: &CircuitId) -> Option<Circuit> {
        self.circuits.lock().unwrap().get(id).cloned()
    }

    pub fn telemetry_of(&self, id: &CircuitId) -> Option<TelemetryMetadata> {
        self.get(id).and_then(|circuit| circuit.telemetry)
    }

    /// Fails the next `times` resolve calls transiently.
    pub fn fail_resolves(&self, times: u32) {
        self.resolve_failures.store(times, Ordering::SeqCst);
    }

    /// Fails the next `times` telemetry write-backs transiently.
    pub fn fail_write_backs(&self, times: u32) {
        self.write_back_failures.store(times, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl CircuitInventory for MockInventory {
    async fn resolve(&self, id: &CircuitId) -> IntResult<Option<Circuit>> {
        if Self::take_failure(&self.resolve_failures) {
            return Err(IntError::transient("resolve", "inventory unavailable"));
        }
        Ok(self.get(id))
    }

    async fn resolve_all(&self) -> IntResult<Vec<Circuit>> {
        if Self::take_failure(&self.resolve_failures) {
            return Err(IntError::transient("resolve_all", "inventory unavailable"));
        }
        Ok(self.circuits.lock().unwrap().values().cloned().collect())
    }

    async fn set_telemetry(
        &self,
        id: &CircuitId,
        metadata: Option<TelemetryMetadata>,
    ) -> IntResult<()> {
        if Self::take_failure(&self.write_back_failures) {
            return Err(IntError::transient(
                "set_telemetry",
                "inventory unavailable",
            ));
        }
        let mut circuits = self.circuits.lock().unwrap();
        match circuits.get_mut(id) {
            Some(circuit) => {
                circuit.telemetry = metadata;
                Ok(())
            }
            None => Err(IntError::unrecoverable(format!(
                "write-back for unknown circuit '{id}'"
            ))),
        }
    }
}

/// In-memory proxy port resolver.
#[derive(Default)]
pub struct MockProxyPorts {
    ports: Mutex<HashMap<InterfaceId, ProxyPort>>,
}

impl MockProxyPorts {
    pub fn add(&self, proxy: ProxyPort) {
        self.ports
            .lock()
            .unwrap()
            .insert(proxy.interface.clone(), proxy);
    }

    pub fn remove(&self, interface: &InterfaceId) {
        self.ports.lock().unwrap().remove(interface);
    }

    pub fn set_status(&self, interface: &InterfaceId, status: PortStatus) {
        if let Some(proxy) = self.ports.lock().unwrap().get_mut(interface) {
            proxy.status = status;
        }
    }
}

#[async_trait]
impl ProxyPortResolver for MockProxyPorts {
    async fn resolve(&self, interface: &InterfaceId) -> IntResult<Option<ProxyPort>> {
        Ok(self.ports.lock().unwrap().get(interface).cloned())
    }
}

/// Fully wired manager over the in-memory doubles.
pub struct TestEnv {
    pub fabric: Arc<MockFabric>,
    pub inventory: Arc<MockInventory>,
    pub proxies: Arc<MockProxyPorts>,
    pub manager: IntManager,
}

impl TestEnv {
    pub fn new() -> Self {
        let fabric = Arc::new(MockFabric::default());
        let inventory = Arc::new(MockInventory::default());
        let proxies = Arc::new(MockProxyPorts::default());
        let manager = IntManager::new(
            inventory.clone(),
            proxies.clone(),
            fabric.clone(),
        )
        .with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 4,
        });
        Self {
            fabric,
            inventory,
            proxies,
            manager,
        }
    }

    /// Registers a circuit in the inventory with UP proxy ports on both
    /// endpoints, and returns it.
    pub fn add_circuit(&self, id: &str, switches: &[&str]) -> Circuit {
        let circuit = circuit_with_path(id, switches);
        for uni in [&circuit.uni_a, &circuit.uni_z] {
            self.proxies.add(ProxyPort::new(
                uni.interface.clone(),
                10,
                11,
                PortStatus::Up,
            ));
        }
        self.inventory.insert(circuit.clone());
        circuit
    }

    /// Request map for an explicit-id bulk call, resolved via the mock
    /// inventory the way the transport layer would.
    pub fn requests(&self, ids: &[&str]) -> BTreeMap<CircuitId, Option<Circuit>> {
        ids.iter()
            .map(|id| {
                let id = circuit_id(id);
                let circuit = self.inventory.get(&id);
                (id, circuit)
            })
            .collect()
    }
}

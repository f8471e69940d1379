//! Switch-grouped batch dispatch toward the flow installation backend.
//!
//! All rules targeting one switch within a provisioning pass go out in a
//! single backend call, never split, so a switch is not left with a
//! partially-applied rule set. Independent switch calls run concurrently;
//! a failure on one switch does not cancel calls already in flight to
//! others.

use int_common::{FlowBackend, IntError, IntResult};
use int_types::{CircuitId, FlowRule, SwitchId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Flow rules grouped by target switch, per-switch order preserved.
pub type SwitchFlowBatch = BTreeMap<SwitchId, Vec<FlowRule>>;

/// Groups a flattened rule sequence by target switch.
///
/// Rules keep their generation order within each switch's batch.
pub fn group_by_switch(flows: impl IntoIterator<Item = FlowRule>) -> SwitchFlowBatch {
    let mut batches = SwitchFlowBatch::new();
    for flow in flows {
        batches.entry(flow.switch.clone()).or_default().push(flow);
    }
    batches
}

/// Installs every batch, one backend call per switch, concurrently.
///
/// Returns the combined outcome: terminal failures (rejected payloads)
/// dominate transient ones, so the caller's retry policy only re-runs
/// passes that can actually succeed.
pub async fn install_batches(
    backend: Arc<dyn FlowBackend>,
    batches: SwitchFlowBatch,
) -> IntResult<()> {
    let mut tasks = JoinSet::new();
    for (switch, flows) in batches {
        let backend = Arc::clone(&backend);
        tasks.spawn(async move {
            let result = backend.install(&switch, flows).await;
            (switch, result)
        });
    }
    combine("install", tasks).await
}

/// Removes one circuit's rules from every listed switch, concurrently.
pub async fn remove_batches(
    backend: Arc<dyn FlowBackend>,
    circuit: CircuitId,
    switches: Vec<SwitchId>,
) -> IntResult<()> {
    let mut tasks = JoinSet::new();
    for switch in switches {
        let backend = Arc::clone(&backend);
        let circuit = circuit.clone();
        tasks.spawn(async move {
            let result = backend.remove(&switch, &circuit).await;
            (switch, result)
        });
    }
    combine("remove", tasks).await
}

async fn combine(operation: &str, mut tasks: JoinSet<(SwitchId, IntResult<()>)>) -> IntResult<()> {
    let mut transient: Option<IntError> = None;
    let mut terminal: Option<IntError> = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((switch, Ok(()))) => {
                debug!(%switch, operation, "switch batch applied");
            }
            Ok((switch, Err(err))) => {
                warn!(%switch, operation, error = %err, "switch batch failed");
                if err.is_retryable() {
                    transient.get_or_insert(err);
                } else {
                    terminal.get_or_insert(err);
                }
            }
            Err(join_err) => {
                terminal.get_or_insert(IntError::unrecoverable(format!(
                    "{operation} dispatch task failed: {join_err}"
                )));
            }
        }
    }

    if let Some(err) = terminal {
        return Err(err);
    }
    if let Some(err) = transient {
        return Err(err);
    }
    Ok(())
}

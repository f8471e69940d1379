//! Pure INT flow generation for source, hop, and sink switches.
//!
//! Generation is deterministic and never suspends: the same circuit,
//! direction, and proxy ports always yield the same ordered rule list.
//! Validation (topology, proxy port health) happens upstream in the
//! manager; the generator only turns an already-validated circuit into
//! flow specifications.

use int_types::{
    Circuit, FlowAction, FlowMatch, FlowRule, IntDirection, IntRole, PathHop, ProxyPort, Uni,
};
use itertools::chain;

/// Priority of source-role rules; outranks the circuit's base forwarding.
pub const SOURCE_PRIORITY: u16 = 20_100;

/// Priority of sink-role rules.
pub const SINK_PRIORITY: u16 = 20_050;

/// Priority of hop-role rules.
pub const HOP_PRIORITY: u16 = 20_000;

/// Pipeline table INT rules are installed into.
pub const INT_TABLE_ID: u8 = 0;

/// Returns the circuit path oriented for the given direction.
///
/// For Z to A the hop list is reversed and each hop's ingress/egress
/// ports are swapped.
pub fn oriented_path(circuit: &Circuit, direction: IntDirection) -> Vec<PathHop> {
    match direction {
        IntDirection::AToZ => circuit.path.clone(),
        IntDirection::ZToA => circuit.path.iter().rev().map(PathHop::reversed).collect(),
    }
}

/// Generates the ordered INT rule list for one direction of a circuit:
/// source rules, then one rule per interior hop, then sink rules.
///
/// `source_proxy` is the loop on the direction's ingress switch,
/// `sink_proxy` the loop on its egress switch. A two-switch path yields
/// an empty hop segment. Degenerate paths (fewer than two switches) are
/// rejected upstream and produce no rules here.
pub fn generate_direction(
    circuit: &Circuit,
    direction: IntDirection,
    source_proxy: &ProxyPort,
    sink_proxy: &ProxyPort,
) -> Vec<FlowRule> {
    let path = oriented_path(circuit, direction);
    if path.len() < 2 {
        return Vec::new();
    }

    let (ingress_uni, egress_uni) = match direction {
        IntDirection::AToZ => (&circuit.uni_a, &circuit.uni_z),
        IntDirection::ZToA => (&circuit.uni_z, &circuit.uni_a),
    };

    let first = &path[0];
    let last = &path[path.len() - 1];
    let interior = &path[1..path.len() - 1];

    chain!(
        source_rules(circuit, direction, first, ingress_uni, source_proxy),
        hop_rules(circuit, direction, interior, ingress_uni),
        sink_rules(circuit, direction, last, ingress_uni, egress_uni, sink_proxy),
    )
    .collect()
}

/// Generates the full bidirectional rule set for a circuit.
///
/// Directions are generated in provisioning order (Z to A, then A to Z);
/// both are produced before any dispatch so shared interior switches get
/// one combined batch.
pub fn generate_circuit(
    circuit: &Circuit,
    proxy_a: &ProxyPort,
    proxy_z: &ProxyPort,
) -> Vec<FlowRule> {
    chain!(
        generate_direction(circuit, IntDirection::ZToA, proxy_z, proxy_a),
        generate_direction(circuit, IntDirection::AToZ, proxy_a, proxy_z),
    )
    .collect()
}

/// Source switch: tag ingress traffic with INT via the local proxy loop.
///
/// Rule 1 matches the UNI ingress and sends the packet out the loop to be
/// tagged; rule 2 matches the tagged packet returning from the loop and
/// forwards it down the path.
fn source_rules(
    circuit: &Circuit,
    direction: IntDirection,
    first: &PathHop,
    ingress_uni: &Uni,
    proxy: &ProxyPort,
) -> Vec<FlowRule> {
    vec![
        FlowRule {
            switch: first.switch.clone(),
            owner: circuit.id.clone(),
            direction,
            role: IntRole::Source,
            table_id: INT_TABLE_ID,
            priority: SOURCE_PRIORITY,
            match_fields: FlowMatch::ingress(first.ingress, ingress_uni.tag),
            actions: vec![
                FlowAction::PushInt,
                FlowAction::Output(proxy.source_port),
            ],
        },
        FlowRule {
            switch: first.switch.clone(),
            owner: circuit.id.clone(),
            direction,
            role: IntRole::Source,
            table_id: INT_TABLE_ID,
            priority: SOURCE_PRIORITY,
            match_fields: FlowMatch::int_tagged(proxy.destination_port, ingress_uni.tag),
            actions: vec![
                FlowAction::AddIntMetadata,
                FlowAction::Output(first.egress),
            ],
        },
    ]
}

/// Interior switches: forward INT-tagged traffic, metadata intact.
fn hop_rules(
    circuit: &Circuit,
    direction: IntDirection,
    interior: &[PathHop],
    ingress_uni: &Uni,
) -> Vec<FlowRule> {
    interior
        .iter()
        .map(|hop| FlowRule {
            switch: hop.switch.clone(),
            owner: circuit.id.clone(),
            direction,
            role: IntRole::Hop,
            table_id: INT_TABLE_ID,
            priority: HOP_PRIORITY,
            match_fields: FlowMatch::int_tagged(hop.ingress, ingress_uni.tag),
            actions: vec![FlowAction::Output(hop.egress)],
        })
        .collect()
}

/// Sink switch: strip INT via the local proxy loop and deliver the
/// original frame to the egress UNI.
fn sink_rules(
    circuit: &Circuit,
    direction: IntDirection,
    last: &PathHop,
    ingress_uni: &Uni,
    egress_uni: &Uni,
    proxy: &ProxyPort,
) -> Vec<FlowRule> {
    let mut deliver = vec![FlowAction::PopInt];
    match (ingress_uni.tag, egress_uni.tag) {
        (ingress_tag, Some(egress_tag)) if ingress_tag != Some(egress_tag) => {
            deliver.push(FlowAction::SetVlan(egress_tag));
        }
        _ => {}
    }
    deliver.push(FlowAction::Output(last.egress));

    vec![
        FlowRule {
            switch: last.switch.clone(),
            owner: circuit.id.clone(),
            direction,
            role: IntRole::Sink,
            table_id: INT_TABLE_ID,
            priority: SINK_PRIORITY,
            match_fields: FlowMatch::int_tagged(last.ingress, ingress_uni.tag),
            actions: vec![FlowAction::Output(proxy.source_port)],
        },
        FlowRule {
            switch: last.switch.clone(),
            owner: circuit.id.clone(),
            direction,
            role: IntRole::Sink,
            table_id: INT_TABLE_ID,
            priority: SINK_PRIORITY,
            match_fields: FlowMatch::int_tagged(proxy.destination_port, ingress_uni.tag),
            actions: deliver,
        },
    ]
}

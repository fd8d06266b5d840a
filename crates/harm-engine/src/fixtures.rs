//! Shared test fixtures: hand-built topology snapshots.

use harm_core::types::{
    DeviceAttrs, NodeKind, Privilege, Topology, TopologyNode, VulnerabilityAttrs,
};

pub(crate) fn device(name: &str, reachable: &[&str]) -> TopologyNode {
    TopologyNode {
        name: name.to_string(),
        kind: NodeKind::Device(DeviceAttrs {
            device_type: "server".to_string(),
            subnets: vec!["lan".to_string()],
            vulnerabilities: None,
        }),
        is_start: false,
        is_end: false,
        reachable: reachable.iter().map(|s| s.to_string()).collect(),
    }
}

pub(crate) fn vulnerability(
    name: &str,
    required: Privilege,
    postcondition: Option<Privilege>,
    reachable: &[&str],
) -> TopologyNode {
    TopologyNode {
        name: name.to_string(),
        kind: NodeKind::Vulnerability(VulnerabilityAttrs {
            vuln_id: name.to_string(),
            required_privilege: required,
            postcondition,
        }),
        is_start: false,
        is_end: false,
        reachable: reachable.iter().map(|s| s.to_string()).collect(),
    }
}

pub(crate) fn anchor(name: &str, reachable: &[&str]) -> TopologyNode {
    TopologyNode {
        name: name.to_string(),
        kind: NodeKind::Anchor,
        is_start: false,
        is_end: false,
        reachable: reachable.iter().map(|s| s.to_string()).collect(),
    }
}

pub(crate) fn topology(name: &str, nodes: Vec<TopologyNode>) -> Topology {
    Topology {
        name: name.to_string(),
        nodes,
    }
}

//! Two-layer HARM orchestration.
//!
//! Builds the upper-layer attack graph over the device topology, one
//! privilege-constrained attack tree per device from its nested
//! vulnerability network, attaches the trees to their graph nodes, and
//! enumerates attack paths.

use std::time::Instant;

use chrono::Utc;
use harm_core::types::{AttackPath, NodeKind, Topology};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::graph::AttackGraph;
use crate::traverse::PathSet;
use crate::tree::AttackTree;
use crate::types::{HarmRequest, HarmResult};

/// A fully constructed two-layer HARM instance.
#[derive(Debug, Clone)]
pub struct Harm {
    pub graph: AttackGraph,
}

impl Harm {
    /// Construct both layers from a topology snapshot.
    ///
    /// The upper layer is unconstrained; the lower-layer trees honor the
    /// request's privilege ceiling. Devices without correlated
    /// vulnerability data get no tree and stay untraversable.
    pub fn construct(topology: &Topology, request: &HarmRequest) -> Result<Self> {
        let mut graph = AttackGraph::build(topology, request.graph_value, None)?;

        for topo_node in &topology.nodes {
            let NodeKind::Device(attrs) = &topo_node.kind else {
                continue;
            };
            let Some(vuln_topology) = &attrs.vulnerabilities else {
                continue;
            };
            let tree = AttackTree::build(
                vuln_topology,
                request.tree_value,
                request.privilege_ceiling,
            )?;
            debug!(
                device = %topo_node.name,
                leaves = tree.leaves.len(),
                "attack tree attached"
            );
            graph.attach_tree(&topo_node.name, tree)?;
        }

        Ok(Self { graph })
    }

    /// Enumerate attack paths and package the full analysis result.
    pub fn analyze(&self) -> HarmResult {
        let started = Instant::now();
        let set = self.graph.enumerate_paths();
        let paths = self.attack_paths(&set);
        info!(
            paths = paths.len(),
            visits = set.visit_count,
            "attack path enumeration finished"
        );
        HarmResult {
            paths,
            stats: self.graph.stats(),
            visit_count: set.visit_count,
            computation_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Convert enumerated index paths into attack path records.
    pub fn attack_paths(&self, set: &PathSet) -> Vec<AttackPath> {
        set.paths
            .iter()
            .map(|path| {
                let steps: Vec<String> = path
                    .iter()
                    .map(|&i| self.graph.nodes[i].name().to_string())
                    .collect();
                AttackPath {
                    id: Uuid::new_v4(),
                    source: steps.first().cloned().unwrap_or_default(),
                    target: steps.last().cloned().unwrap_or_default(),
                    steps,
                    computed_at: Utc::now(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{anchor, device, topology, vulnerability};
    use harm_core::types::Privilege;

    /// The classic two-device enterprise shape: an external attacker
    /// reaches a workstation, which reaches the server holding the data.
    /// Each device ships a one-vulnerability network.
    fn enterprise_topology(workstation_post: Privilege) -> Topology {
        let mut attacker = anchor("attacker", &["workstation"]);
        attacker.is_start = true;

        let mut workstation = device("workstation", &["server"]);
        workstation.kind = NodeKind::Device(harm_core::types::DeviceAttrs {
            device_type: "workstation".to_string(),
            subnets: vec!["corp".to_string()],
            vulnerabilities: Some(topology(
                "workstation-vulns",
                vec![vulnerability(
                    "CVE-2024-100",
                    Privilege::None,
                    Some(workstation_post),
                    &[],
                )],
            )),
        });

        let mut server = device("server", &[]);
        server.is_end = true;
        server.kind = NodeKind::Device(harm_core::types::DeviceAttrs {
            device_type: "server".to_string(),
            subnets: vec!["corp".to_string()],
            vulnerabilities: Some(topology(
                "server-vulns",
                vec![vulnerability(
                    "CVE-2024-200",
                    Privilege::User,
                    Some(Privilege::Root),
                    &[],
                )],
            )),
        });

        topology("enterprise", vec![attacker, workstation, server])
    }

    #[test]
    fn constructs_two_layers_and_finds_the_path() {
        let topo = enterprise_topology(Privilege::User);
        let harm = Harm::construct(&topo, &HarmRequest::default()).unwrap();

        let workstation = harm.graph.node_index["workstation"];
        assert!(harm.graph.nodes[workstation].child().is_some());

        let set = harm.graph.enumerate_paths();
        assert_eq!(set.paths.len(), 1);

        let paths = harm.attack_paths(&set);
        assert_eq!(
            paths[0].steps,
            vec!["ag_attacker", "ag_workstation", "ag_server"]
        );
        assert_eq!(paths[0].source, "ag_attacker");
        assert_eq!(paths[0].target, "ag_server");
    }

    #[test]
    fn two_intermediate_devices_yield_two_paths() {
        let mut attacker = anchor("attacker", &["left", "right"]);
        attacker.is_start = true;
        let one_vuln = |name: &str| {
            Some(topology(
                &format!("{name}-vulns"),
                vec![vulnerability(
                    "CVE-2024-7",
                    Privilege::None,
                    Some(Privilege::Root),
                    &[],
                )],
            ))
        };
        let mut left = device("left", &["target"]);
        left.kind = NodeKind::Device(harm_core::types::DeviceAttrs {
            device_type: "server".to_string(),
            subnets: vec![],
            vulnerabilities: one_vuln("left"),
        });
        let mut right = device("right", &["target"]);
        right.kind = NodeKind::Device(harm_core::types::DeviceAttrs {
            device_type: "server".to_string(),
            subnets: vec![],
            vulnerabilities: one_vuln("right"),
        });
        let mut target = device("target", &[]);
        target.is_end = true;
        let topo = topology("fan", vec![attacker, left, right, target]);

        let harm = Harm::construct(&topo, &HarmRequest::default()).unwrap();
        let set = harm.graph.enumerate_paths();

        assert_eq!(set.paths.len(), 2);
        let paths = harm.attack_paths(&set);
        assert_eq!(paths[0].steps, vec!["ag_attacker", "ag_left", "ag_target"]);
        assert_eq!(paths[1].steps, vec!["ag_attacker", "ag_right", "ag_target"]);
    }

    #[test]
    fn analyze_packages_paths_and_stats() {
        let topo = enterprise_topology(Privilege::User);
        let harm = Harm::construct(&topo, &HarmRequest::default()).unwrap();
        let result = harm.analyze();

        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.stats.total_nodes, 3);
        assert!(result.stats.exploitable_count >= 1);

        let json = serde_json::to_string(&result).unwrap();
        let roundtrip: HarmResult = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.paths.len(), 1);
        assert_eq!(roundtrip.paths[0].steps, result.paths[0].steps);
    }
}

//! In-memory attack graph over a topology snapshot.
//!
//! Projects every topology node (device, anchor, vulnerability) into a
//! dense-index arena with adjacency lists, optimized for repeated
//! depth-first path enumeration. Nodes keep a non-owning back-reference to
//! the wrapped topology node by name; the snapshot itself is never touched.

use std::collections::HashMap;

use harm_core::types::{NodeKind, Privilege, Topology};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::tree::AttackTree;
use crate::types::GraphStats;

/// Prefix applied to attack graph node names to disambiguate them from the
/// source topology.
pub const GRAPH_PREFIX: &str = "ag_";

/// Traversal value carried by the attacker and target nodes.
pub const SENTINEL_VALUE: i64 = -1;

/// A device or anchor node wrapped into the attack graph.
#[derive(Debug, Clone)]
pub struct DeviceNode {
    /// Dense index (0..N-1) in the graph arena.
    pub index: usize,
    /// Prefixed display name.
    pub name: String,
    /// Identity of the wrapped topology node.
    pub topo_name: String,
    /// Traversal-cost placeholder; −1 for the attacker and target.
    pub value: i64,
    /// Device classification; `None` for anchors.
    pub device_type: Option<String>,
    /// Subnet tags of the wrapped device.
    pub subnets: Vec<String>,
    /// Lower-layer attack tree attached by the HARM orchestration.
    pub child: Option<AttackTree>,
}

/// A vulnerability wrapped into the attack graph.
#[derive(Debug, Clone)]
pub struct VulnerabilityNode {
    pub index: usize,
    pub name: String,
    pub topo_name: String,
    pub value: i64,
    /// Privilege required to exploit the wrapped vulnerability.
    pub required_privilege: Privilege,
    /// Privilege gained on successful exploitation.
    pub postcondition: Option<Privilege>,
}

/// One arena slot of the attack graph.
#[derive(Debug, Clone)]
pub enum GraphNode {
    Device(DeviceNode),
    Vulnerability(VulnerabilityNode),
}

impl GraphNode {
    pub fn index(&self) -> usize {
        match self {
            GraphNode::Device(n) => n.index,
            GraphNode::Vulnerability(n) => n.index,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GraphNode::Device(n) => &n.name,
            GraphNode::Vulnerability(n) => &n.name,
        }
    }

    /// Identity of the wrapped topology node.
    pub fn topo_name(&self) -> &str {
        match self {
            GraphNode::Device(n) => &n.topo_name,
            GraphNode::Vulnerability(n) => &n.topo_name,
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            GraphNode::Device(n) => n.value,
            GraphNode::Vulnerability(n) => n.value,
        }
    }

    /// The attached lower-layer attack tree, where present.
    pub fn child(&self) -> Option<&AttackTree> {
        match self {
            GraphNode::Device(n) => n.child.as_ref(),
            GraphNode::Vulnerability(_) => None,
        }
    }

    /// Whether a traversal may route through this node: a wrapped
    /// vulnerability is intrinsically exploitable; a device qualifies once
    /// a non-empty attack tree is attached.
    pub fn is_exploitable(&self) -> bool {
        match self {
            GraphNode::Vulnerability(_) => true,
            GraphNode::Device(n) => n.child.as_ref().is_some_and(|t| !t.is_empty()),
        }
    }
}

/// The attack graph for one topology snapshot.
///
/// Built once from the snapshot and never partially constructed: the
/// builder either returns a fully wired graph or an error.
#[derive(Debug, Clone)]
pub struct AttackGraph {
    /// All nodes, dense-indexed; includes the start and end anchors.
    pub nodes: Vec<GraphNode>,
    /// `adjacency[i]` = indices reachable from node `i`, in topology-declared order.
    pub adjacency: Vec<Vec<usize>>,
    /// Map from source topology name → dense index.
    pub node_index: HashMap<String, usize>,
    /// General node list: every node except the start and end anchors.
    pub members: Vec<usize>,
    /// Attacker entry node.
    pub start: usize,
    /// Attack target node.
    pub end: usize,
}

impl AttackGraph {
    /// Project a topology snapshot into an attack graph.
    ///
    /// `value` is the traversal-value constant assigned to ordinary nodes;
    /// the attacker and target carry the −1 sentinel regardless of kind.
    /// With a privilege `ceiling`, edges into vulnerabilities requiring
    /// more privilege than the ceiling are left out. Reachability entries
    /// naming nodes absent from the snapshot are skipped.
    pub fn build(topology: &Topology, value: i64, ceiling: Option<Privilege>) -> Result<Self> {
        topology.validate()?;

        let mut node_index = HashMap::with_capacity(topology.nodes.len());
        let mut nodes = Vec::with_capacity(topology.nodes.len());
        let mut start = None;
        let mut end = None;

        for (i, topo_node) in topology.nodes.iter().enumerate() {
            node_index.insert(topo_node.name.clone(), i);

            let node_value = if topo_node.is_start || topo_node.is_end {
                SENTINEL_VALUE
            } else {
                value
            };
            let name = format!("{GRAPH_PREFIX}{}", topo_node.name);

            let node = match &topo_node.kind {
                NodeKind::Vulnerability(attrs) => GraphNode::Vulnerability(VulnerabilityNode {
                    index: i,
                    name,
                    topo_name: topo_node.name.clone(),
                    value: node_value,
                    required_privilege: attrs.required_privilege,
                    postcondition: attrs.postcondition,
                }),
                NodeKind::Device(attrs) => GraphNode::Device(DeviceNode {
                    index: i,
                    name,
                    topo_name: topo_node.name.clone(),
                    value: node_value,
                    device_type: Some(attrs.device_type.clone()),
                    subnets: attrs.subnets.clone(),
                    child: None,
                }),
                NodeKind::Anchor => GraphNode::Device(DeviceNode {
                    index: i,
                    name,
                    topo_name: topo_node.name.clone(),
                    value: node_value,
                    device_type: None,
                    subnets: Vec::new(),
                    child: None,
                }),
            };

            if topo_node.is_start {
                start = Some(i);
            }
            if topo_node.is_end {
                end = Some(i);
            }
            nodes.push(node);
        }

        let start = start.ok_or_else(|| EngineError::NoStartNode {
            topology: topology.name.clone(),
        })?;
        let end = end.ok_or_else(|| EngineError::NoEndNode {
            topology: topology.name.clone(),
        })?;

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (i, topo_node) in topology.nodes.iter().enumerate() {
            for target_name in &topo_node.reachable {
                let Some(&target) = node_index.get(target_name.as_str()) else {
                    debug!(
                        node = %topo_node.name,
                        target = %target_name,
                        "reachability target not in snapshot, edge skipped"
                    );
                    continue;
                };
                if let Some(ceiling) = ceiling {
                    if let GraphNode::Vulnerability(v) = &nodes[target] {
                        if v.required_privilege > ceiling {
                            continue;
                        }
                    }
                }
                adjacency[i].push(target);
            }
        }

        let members: Vec<usize> = (0..nodes.len()).filter(|&i| i != start && i != end).collect();

        debug!(
            topology = %topology.name,
            nodes = nodes.len(),
            edges = adjacency.iter().map(Vec::len).sum::<usize>(),
            "attack graph constructed"
        );

        Ok(Self {
            nodes,
            adjacency,
            node_index,
            members,
            start,
            end,
        })
    }

    /// Attach a lower-layer attack tree to the named device node.
    pub fn attach_tree(&mut self, topo_name: &str, tree: AttackTree) -> Result<()> {
        let index = *self
            .node_index
            .get(topo_name)
            .ok_or_else(|| EngineError::NodeNotFound {
                name: topo_name.to_string(),
            })?;
        match &mut self.nodes[index] {
            GraphNode::Device(device) => {
                device.child = Some(tree);
                Ok(())
            }
            GraphNode::Vulnerability(_) => Err(EngineError::NodeNotFound {
                name: topo_name.to_string(),
            }),
        }
    }

    /// Number of nodes in the graph, anchors included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Number of nodes a traversal may route through.
    pub fn exploitable_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_exploitable()).count()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            exploitable_count: self.exploitable_count(),
        }
    }
}

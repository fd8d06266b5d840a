//! Attack tree construction: AND/OR composition of the vulnerabilities
//! leading to a target node.
//!
//! Leaves and gates live in two arenas; gate children are explicit index
//! lists, so the rewriting passes replace child lists instead of mutating
//! live iterators. Leaves keep a non-owning back-reference to the wrapped
//! topology node by name.

use harm_core::types::{NodeKind, Privilege, Topology};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Prefix applied to attack tree node names to disambiguate them from the
/// source topology.
pub const TREE_PREFIX: &str = "at_";

/// Snapshots below this size are a degenerate single-vulnerability case and
/// skip the rewriting pipeline entirely.
const DEGENERATE_NODE_LIMIT: usize = 4;

/// Boolean composition kind of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    And,
    Or,
}

/// Reference to a gate child: a leaf in the leaf arena or another gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRef {
    Leaf(usize),
    Gate(usize),
}

/// Whether a gate is live, or was emptied by target extraction and awaits
/// the deletion sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Active,
    Emptied,
}

/// A structural AND/OR node. Children keep insertion order.
#[derive(Debug, Clone)]
pub struct Gate {
    pub kind: GateKind,
    pub children: Vec<ChildRef>,
    pub state: GateState,
}

/// A device or anchor wrapped into an attack tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Prefixed display name.
    pub name: String,
    /// Identity of the wrapped topology node.
    pub topo_name: String,
    /// Traversal-cost placeholder; 0 for the enclosing network's anchors.
    pub value: i64,
    /// Marks the source/sink roles of the enclosing network.
    pub command: bool,
}

/// A vulnerability wrapped into an attack tree.
#[derive(Debug, Clone)]
pub struct VulnerabilityLeaf {
    pub name: String,
    pub topo_name: String,
    /// Identity of the originating vulnerability record, kept for lookups.
    pub vuln_id: String,
    pub value: i64,
    pub command: bool,
    /// Privilege gained on successful exploitation.
    pub postcondition: Option<Privilege>,
}

/// One slot of the leaf arena.
#[derive(Debug, Clone)]
pub enum TreeLeaf {
    Node(TreeNode),
    Vulnerability(VulnerabilityLeaf),
}

impl TreeLeaf {
    pub fn name(&self) -> &str {
        match self {
            TreeLeaf::Node(n) => &n.name,
            TreeLeaf::Vulnerability(v) => &v.name,
        }
    }

    pub fn topo_name(&self) -> &str {
        match self {
            TreeLeaf::Node(n) => &n.topo_name,
            TreeLeaf::Vulnerability(v) => &v.topo_name,
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            TreeLeaf::Node(n) => n.value,
            TreeLeaf::Vulnerability(v) => v.value,
        }
    }

    pub fn command(&self) -> bool {
        match self {
            TreeLeaf::Node(n) => n.command,
            TreeLeaf::Vulnerability(v) => v.command,
        }
    }
}

/// An attack tree for one topology snapshot.
///
/// Built in one pass, then rewritten in place by the simplify →
/// target-extraction → fold pipeline; afterwards it is only traversed.
#[derive(Debug, Clone)]
pub struct AttackTree {
    pub leaves: Vec<TreeLeaf>,
    pub gates: Vec<Gate>,
    /// Index of the root OR gate.
    pub root: usize,
    /// Construction-time adjacency: leaves reachable from each leaf, in
    /// topology-declared order.
    pub(crate) reachable: Vec<Vec<usize>>,
    pub(crate) start: Option<usize>,
    pub(crate) end: Option<usize>,
}

impl AttackTree {
    /// Build an attack tree from a topology snapshot.
    ///
    /// `value` is the traversal-value constant for ordinary nodes; the
    /// enclosing network's anchors carry 0 and the command flag. With a
    /// privilege `ceiling`, only edges into vulnerabilities whose
    /// postcondition is classified and ranks at or below the ceiling are
    /// wired; an unclassified postcondition never qualifies.
    pub fn build(topology: &Topology, value: i64, ceiling: Option<Privilege>) -> Result<Self> {
        topology.validate()?;
        let mut tree = Self::preprocess(topology, value, ceiling);

        // Degenerate snapshot, essentially a single vulnerability: one AND
        // gate holding every node under the OR root.
        if tree.leaves.len() < DEGENERATE_NODE_LIMIT {
            let children: Vec<ChildRef> = (0..tree.leaves.len()).map(ChildRef::Leaf).collect();
            let and = tree.new_gate(GateKind::And, children);
            tree.gates[tree.root].children.push(ChildRef::Gate(and));
            return Ok(tree);
        }

        let end = tree.end.ok_or_else(|| EngineError::NoEndNode {
            topology: topology.name.clone(),
        })?;
        if let Some(start) = tree.start {
            tree.gates[tree.root].children.push(ChildRef::Leaf(start));
        }

        let mut history = Vec::new();
        tree.simplify(tree.root, &mut history, end);
        tree.target_out(end);
        tree.fold(tree.root);

        debug!(
            topology = %topology.name,
            leaves = tree.leaves.len(),
            gates = tree.gates.len(),
            "attack tree constructed"
        );
        Ok(tree)
    }

    /// Instantiate leaves and wire the construction-time adjacency.
    fn preprocess(topology: &Topology, value: i64, ceiling: Option<Privilege>) -> Self {
        let mut leaves = Vec::with_capacity(topology.nodes.len());
        let mut start = None;
        let mut end = None;

        for (i, topo_node) in topology.nodes.iter().enumerate() {
            let anchor = topo_node.is_start || topo_node.is_end;
            let name = format!("{TREE_PREFIX}{}", topo_node.name);

            let leaf = match &topo_node.kind {
                NodeKind::Vulnerability(attrs) => TreeLeaf::Vulnerability(VulnerabilityLeaf {
                    name,
                    topo_name: topo_node.name.clone(),
                    vuln_id: attrs.vuln_id.clone(),
                    value: 0,
                    command: anchor,
                    postcondition: attrs.postcondition,
                }),
                NodeKind::Device(_) | NodeKind::Anchor => TreeLeaf::Node(TreeNode {
                    name,
                    topo_name: topo_node.name.clone(),
                    value: if anchor { 0 } else { value },
                    command: anchor,
                }),
            };

            if topo_node.is_start {
                start = Some(i);
            }
            if topo_node.is_end {
                end = Some(i);
            }
            leaves.push(leaf);
        }

        let mut reachable = vec![Vec::new(); leaves.len()];
        for (i, topo_node) in topology.nodes.iter().enumerate() {
            for target_name in &topo_node.reachable {
                let Some(target) = topology.nodes.iter().position(|n| &n.name == target_name)
                else {
                    debug!(
                        node = %topo_node.name,
                        target = %target_name,
                        "reachability target not in snapshot, edge skipped"
                    );
                    continue;
                };
                let qualifies = match ceiling {
                    None => true,
                    Some(ceiling) => matches!(
                        &leaves[target],
                        TreeLeaf::Vulnerability(v)
                            if v.postcondition.is_some_and(|p| p <= ceiling)
                    ),
                };
                if qualifies {
                    reachable[i].push(target);
                }
            }
        }

        let root_gate = Gate {
            kind: GateKind::Or,
            children: Vec::new(),
            state: GateState::Active,
        };

        Self {
            leaves,
            gates: vec![root_gate],
            root: 0,
            reachable,
            start,
            end,
        }
    }

    /// Allocate a gate in the arena and return its index.
    pub(crate) fn new_gate(&mut self, kind: GateKind, children: Vec<ChildRef>) -> usize {
        self.gates.push(Gate {
            kind,
            children,
            state: GateState::Active,
        });
        self.gates.len() - 1
    }

    /// Whether the root gate has no children.
    pub fn is_empty(&self) -> bool {
        self.gates[self.root].children.is_empty()
    }

    /// Look up a leaf by its source topology name.
    pub fn leaf(&self, topo_name: &str) -> Option<usize> {
        self.leaves.iter().position(|l| l.topo_name() == topo_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{anchor, topology, vulnerability};

    /// One-vulnerability network: entry anchor, the vulnerability, exit
    /// anchor.
    fn single_vulnerability_topology() -> Topology {
        let mut entry = anchor("entry", &["CVE-2024-9"]);
        entry.is_start = true;
        let vuln = vulnerability("CVE-2024-9", Privilege::None, Some(Privilege::Root), &["exit"]);
        let mut exit = anchor("exit", &[]);
        exit.is_end = true;
        topology("pc-vulns", vec![entry, vuln, exit])
    }

    #[test]
    fn degenerate_topology_builds_single_and_gate() {
        let tree = AttackTree::build(&single_vulnerability_topology(), 1, None).unwrap();

        let root = &tree.gates[tree.root];
        assert_eq!(root.kind, GateKind::Or);
        assert_eq!(root.children.len(), 1);

        let ChildRef::Gate(and) = root.children[0] else {
            panic!("root child should be a gate");
        };
        let and = &tree.gates[and];
        assert_eq!(and.kind, GateKind::And);
        // Every node of the snapshot lands in the AND gate.
        assert_eq!(and.children.len(), 3);
        assert!(and.children.iter().all(|c| matches!(c, ChildRef::Leaf(_))));
    }

    #[test]
    fn anchors_carry_command_flag_and_zero_value() {
        let tree = AttackTree::build(&single_vulnerability_topology(), 7, None).unwrap();

        let entry = tree.leaf("entry").unwrap();
        assert!(tree.leaves[entry].command());
        assert_eq!(tree.leaves[entry].value(), 0);

        let vuln = tree.leaf("CVE-2024-9").unwrap();
        assert!(!tree.leaves[vuln].command());
    }

    #[test]
    fn names_carry_tree_prefix() {
        let tree = AttackTree::build(&single_vulnerability_topology(), 1, None).unwrap();
        let vuln = tree.leaf("CVE-2024-9").unwrap();
        assert_eq!(tree.leaves[vuln].name(), "at_CVE-2024-9");
    }

    #[test]
    fn empty_topology_builds_trivial_root() {
        let tree = AttackTree::build(&topology("empty", vec![]), 1, None).unwrap();
        assert_eq!(tree.gates[tree.root].children.len(), 1);
    }

    #[test]
    fn ceiling_requires_classified_postcondition() {
        let mut entry = anchor("entry", &["v-classified", "v-unclassified"]);
        entry.is_start = true;
        let classified =
            vulnerability("v-classified", Privilege::None, Some(Privilege::User), &["exit"]);
        let unclassified = vulnerability("v-unclassified", Privilege::None, None, &["exit"]);
        let mut exit = anchor("exit", &[]);
        exit.is_end = true;
        let topo = topology("vulns", vec![entry, classified, unclassified, exit]);

        let unconstrained = AttackTree::preprocess(&topo, 1, None);
        let capped = AttackTree::preprocess(&topo, 1, Some(Privilege::Root));

        let entry_idx = 0;
        assert_eq!(unconstrained.reachable[entry_idx].len(), 2);
        // The unclassified postcondition never qualifies under a ceiling.
        assert_eq!(capped.reachable[entry_idx], vec![1]);
    }

    #[test]
    fn ceiling_filters_high_postconditions() {
        let mut entry = anchor("entry", &["v-root"]);
        entry.is_start = true;
        let v_root = vulnerability("v-root", Privilege::None, Some(Privilege::Root), &["exit"]);
        let mut exit = anchor("exit", &[]);
        exit.is_end = true;
        let topo = topology("vulns", vec![entry, v_root, exit]);

        let capped = AttackTree::preprocess(&topo, 1, Some(Privilege::User));
        assert!(capped.reachable[0].is_empty());

        let roomy = AttackTree::preprocess(&topo, 1, Some(Privilege::Root));
        assert_eq!(roomy.reachable[0], vec![1]);
    }

    #[test]
    fn missing_end_is_a_construction_error() {
        let mut entry = anchor("entry", &[]);
        entry.is_start = true;
        let nodes = vec![
            entry,
            vulnerability("v1", Privilege::None, Some(Privilege::User), &[]),
            vulnerability("v2", Privilege::None, Some(Privilege::User), &[]),
            vulnerability("v3", Privilege::None, Some(Privilege::User), &[]),
        ];
        let err = AttackTree::build(&topology("no-end", nodes), 1, None).unwrap_err();
        assert!(matches!(err, EngineError::NoEndNode { .. }));
    }

    #[test]
    fn dangling_reachability_is_skipped() {
        let mut entry = anchor("entry", &["ghost", "exit"]);
        entry.is_start = true;
        let mut exit = anchor("exit", &[]);
        exit.is_end = true;
        let tree = AttackTree::preprocess(&topology("dangling", vec![entry, exit]), 1, None);
        assert_eq!(tree.reachable[0], vec![1]);
    }
}

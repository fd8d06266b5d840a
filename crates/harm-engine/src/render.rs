//! Read-only textual dumps of graphs, paths, and trees.
//!
//! Console-oriented output for manual inspection and test fixtures; the
//! format is illustrative, not a wire contract. Rendering never touches
//! structure, so it can run before or after enumeration.

use std::fmt::Write;

use crate::graph::AttackGraph;
use crate::traverse::PathSet;
use crate::tree::{AttackTree, ChildRef, GateKind};

impl AttackGraph {
    /// Dump the graph structure: each member node with its outgoing
    /// connections, plus the attached attack tree where present. The edge
    /// into the target is left implicit, matching the path dumps.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Attack graph:");
        for (i, &index) in self.members.iter().enumerate() {
            let node = &self.nodes[index];
            let _ = writeln!(
                out,
                "{}: {} ({} connections)",
                i,
                node.name(),
                self.adjacency[index].len()
            );
            for &next in &self.adjacency[index] {
                if next != self.end {
                    let _ = writeln!(out, "  -> {}", self.nodes[next].name());
                }
            }
            if let Some(tree) = node.child() {
                let _ = writeln!(out, "  attack tree for {}:", node.name());
                for line in tree.render().lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
        }
        out
    }

    /// Dump enumerated paths, one block per path.
    pub fn render_paths(&self, set: &PathSet) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Attack paths ({}):", set.paths.len());
        for path in &set.paths {
            let _ = writeln!(out, "{}", "-".repeat(50));
            for &index in path {
                let _ = writeln!(out, "{}", self.nodes[index].name());
            }
        }
        out
    }
}

impl AttackTree {
    /// Dump the gate structure, root first, children indented below their
    /// gate.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_gate(self.root, 0, &mut out);
        out
    }

    fn render_gate(&self, gate: usize, depth: usize, out: &mut String) {
        let label = match self.gates[gate].kind {
            GateKind::And => "AND",
            GateKind::Or => "OR",
        };
        let _ = writeln!(out, "{:indent$}{label}", "", indent = depth * 2);
        for child in &self.gates[gate].children {
            match child {
                ChildRef::Leaf(leaf) => {
                    let _ = writeln!(
                        out,
                        "{:indent$}{}",
                        "",
                        self.leaves[*leaf].name(),
                        indent = (depth + 1) * 2
                    );
                }
                ChildRef::Gate(sub) => self.render_gate(*sub, depth + 1, out),
            }
        }
    }
}

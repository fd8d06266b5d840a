//! harm-engine: Attack graph and attack tree construction for HARM analysis.
//!
//! Projects a topology snapshot into an upper-layer attack graph, builds
//! per-device AND/OR attack trees over vulnerabilities (simplified,
//! target-extracted, folded), attaches the trees, and exhaustively
//! enumerates attacker-to-target paths. The engine is synchronous and
//! single-threaded; concurrent analyses must each construct their own
//! instance.

pub mod error;
#[cfg(test)]
mod fixtures;
pub mod graph;
pub mod harm;
pub mod render;
pub mod rewrite;
pub mod traverse;
pub mod tree;
pub mod types;

pub use error::EngineError;
pub use graph::AttackGraph;
pub use harm::Harm;
pub use tree::AttackTree;

use harm_core::types::{Privilege, Topology};

/// Build an attack graph from a topology snapshot.
///
/// Pass a `ceiling` to build a lower-layer, privilege-constrained graph;
/// without one the graph is the unconstrained upper layer.
pub fn build_attack_graph(
    topology: &Topology,
    value: i64,
    ceiling: Option<Privilege>,
) -> error::Result<AttackGraph> {
    AttackGraph::build(topology, value, ceiling)
}

/// Build an attack tree from a topology snapshot.
pub fn build_attack_tree(
    topology: &Topology,
    value: i64,
    ceiling: Option<Privilege>,
) -> error::Result<AttackTree> {
    AttackTree::build(topology, value, ceiling)
}

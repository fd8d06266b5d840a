//! Exhaustive attack path enumeration over an attack graph.
//!
//! Depth-first search from the attacker entry to the target, restricted to
//! exploitable nodes and the two anchors. Traversal state is threaded
//! through the call stack, so enumeration never mutates the graph and
//! repeated calls are independent.

use crate::graph::AttackGraph;

/// Every simple start→end path found by one enumeration, plus a
/// search-cost diagnostic.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    /// Paths as arena indices, attacker entry first, target last, in
    /// discovery order.
    pub paths: Vec<Vec<usize>>,
    /// Number of recursive visit calls made during the search.
    pub visit_count: usize,
}

impl AttackGraph {
    /// Enumerate every simple path from the attacker entry to the target.
    ///
    /// Only nodes that are exploitable (wrap a vulnerability, or carry a
    /// non-empty attack tree) and the start/end anchors may appear on a
    /// path. Outgoing edges are tried in topology-declared order, so
    /// discovery order is deterministic. Worst-case cost is exponential in
    /// the node count; acceptable for the small device counts of this
    /// domain.
    pub fn enumerate_paths(&self) -> PathSet {
        let mut set = PathSet::default();
        let mut visited = vec![false; self.nodes.len()];
        let mut path = vec![self.start];
        visited[self.start] = true;
        set.visit_count = self.visit(self.start, &mut path, &mut visited, &mut set.paths);
        set
    }

    /// Number of attack paths from the attacker entry to the target.
    pub fn path_count(&self) -> usize {
        self.enumerate_paths().paths.len()
    }

    fn visit(
        &self,
        node: usize,
        path: &mut Vec<usize>,
        visited: &mut [bool],
        out: &mut Vec<Vec<usize>>,
    ) -> usize {
        let mut calls = 0;
        for &next in &self.adjacency[node] {
            if visited[next] || !self.traversable(next) {
                continue;
            }
            path.push(next);
            visited[next] = true;

            if next == self.end {
                out.push(path.clone());
            } else {
                calls += 1 + self.visit(next, path, visited, out);
            }

            visited[next] = false;
            path.pop();
        }
        calls
    }

    fn traversable(&self, index: usize) -> bool {
        index == self.start || index == self.end || self.nodes[index].is_exploitable()
    }
}

//! Request and result types for HARM construction.

use harm_core::types::{AttackPath, Privilege};
use serde::{Deserialize, Serialize};

/// Parameters for a HARM construction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmRequest {
    /// Traversal-value constant assigned to ordinary upper-layer graph nodes.
    #[serde(default = "default_value")]
    pub graph_value: i64,

    /// Traversal-value constant assigned to ordinary lower-layer tree nodes.
    #[serde(default = "default_value")]
    pub tree_value: i64,

    /// Maximum privilege the attacker is assumed to already hold; bounds
    /// which vulnerabilities the lower layer may use. `None` leaves the
    /// lower layer unconstrained.
    #[serde(default)]
    pub privilege_ceiling: Option<Privilege>,
}

impl Default for HarmRequest {
    fn default() -> Self {
        Self {
            graph_value: default_value(),
            tree_value: default_value(),
            privilege_ceiling: None,
        }
    }
}

fn default_value() -> i64 {
    1
}

/// Complete result of a HARM analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmResult {
    pub paths: Vec<AttackPath>,
    pub stats: GraphStats,
    /// Recursive visit calls made by the enumeration (search-cost diagnostic).
    pub visit_count: usize,
    pub computation_ms: u64,
}

/// Statistics about a constructed attack graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub exploitable_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let request = HarmRequest::default();
        assert_eq!(request.graph_value, 1);
        assert_eq!(request.tree_value, 1);
        assert!(request.privilege_ceiling.is_none());
    }

    #[test]
    fn request_deserializes_with_missing_fields() {
        let request: HarmRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.graph_value, 1);
        assert!(request.privilege_ceiling.is_none());

        let request: HarmRequest =
            serde_json::from_str(r#"{"privilege_ceiling": "root"}"#).unwrap();
        assert_eq!(request.privilege_ceiling, Some(Privilege::Root));
    }

    #[test]
    fn stats_serialization_roundtrip() {
        let stats = GraphStats {
            total_nodes: 7,
            total_edges: 12,
            exploitable_count: 3,
        };
        let json = serde_json::to_string(&stats).unwrap();
        let deserialized: GraphStats = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.total_nodes, 7);
        assert_eq!(deserialized.total_edges, 12);
        assert_eq!(deserialized.exploitable_count, 3);
    }
}

//! Core domain types for HARM construction.
//!
//! These types describe the topology snapshot consumed by the construction
//! engine: a flat list of named nodes (devices, vulnerabilities, anchors)
//! with name-keyed reachability, plus the privilege model used to filter
//! edges and the attack path records produced by analysis.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarmError;

// ── Privilege Model ───────────────────────────────────────────────

/// Post-exploitation privilege levels, totally ordered `None < User < Root`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    None,
    User,
    Root,
}

impl Privilege {
    /// Integer rank used by upstream privilege ceilings: None=1, User=2, Root=3.
    pub fn rank(self) -> u8 {
        match self {
            Privilege::None => 1,
            Privilege::User => 2,
            Privilege::Root => 3,
        }
    }

    /// Inverse of [`Privilege::rank`].
    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Privilege::None),
            2 => Some(Privilege::User),
            3 => Some(Privilege::Root),
            _ => None,
        }
    }

    /// Parse an upstream postcondition string.
    ///
    /// Upstream classifiers emit `""`, `"None"`, `"User"`, or `"Root"`. The
    /// empty string (and anything unrecognized) means the postcondition was
    /// never classified; gaining no privilege is spelled `"None"`.
    pub fn parse_postcondition(raw: &str) -> Option<Self> {
        match raw {
            "None" => Some(Privilege::None),
            "User" => Some(Privilege::User),
            "Root" => Some(Privilege::Root),
            _ => None,
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privilege::None => write!(f, "None"),
            Privilege::User => write!(f, "User"),
            Privilege::Root => write!(f, "Root"),
        }
    }
}

// ── Topology Snapshot ─────────────────────────────────────────────

/// Attributes of a device node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAttrs {
    /// Device classification (e.g. "workstation", "server", "iot").
    pub device_type: String,

    /// Subnet tags this device belongs to.
    #[serde(default)]
    pub subnets: Vec<String>,

    /// Lower-layer snapshot: the device's own vulnerability network, when
    /// vulnerability data has been correlated for it.
    #[serde(default)]
    pub vulnerabilities: Option<Topology>,
}

/// Attributes of a vulnerability node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityAttrs {
    /// Identity of the source vulnerability record (CVE id or dataset key).
    pub vuln_id: String,

    /// Privilege the attacker must already hold to exploit this.
    pub required_privilege: Privilege,

    /// Privilege gained on successful exploitation. `None` when the
    /// upstream classifier never produced one.
    #[serde(default)]
    pub postcondition: Option<Privilege>,
}

/// Discriminates what a topology node is, with the attributes specific to
/// each kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    /// A network device (host, server, IoT unit).
    Device(DeviceAttrs),
    /// A known vulnerability on some device.
    Vulnerability(VulnerabilityAttrs),
    /// The attacker entry point or a bare target marker; carries no device
    /// or vulnerability data.
    Anchor,
}

/// One node of a topology snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyNode {
    /// Stable identity; every cross-reference in the snapshot is by name.
    pub name: String,

    #[serde(flatten)]
    pub kind: NodeKind,

    /// Marks the attacker entry node.
    #[serde(default)]
    pub is_start: bool,

    /// Marks the attack target node.
    #[serde(default)]
    pub is_end: bool,

    /// Names of nodes reachable from this one, in priority order.
    #[serde(default)]
    pub reachable: Vec<String>,
}

impl TopologyNode {
    pub fn is_device(&self) -> bool {
        matches!(self.kind, NodeKind::Device(_))
    }

    pub fn is_vulnerability(&self) -> bool {
        matches!(self.kind, NodeKind::Vulnerability(_))
    }

    /// The device attributes, when this node is a device.
    pub fn device(&self) -> Option<&DeviceAttrs> {
        match &self.kind {
            NodeKind::Device(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// The vulnerability attributes, when this node is a vulnerability.
    pub fn vulnerability(&self) -> Option<&VulnerabilityAttrs> {
        match &self.kind {
            NodeKind::Vulnerability(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// A read-only snapshot of one network, or of one device's vulnerability
/// network, as handed over by the topology layer.
///
/// The construction engine never mutates a snapshot; it only performs
/// name-keyed lookups into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub name: String,
    pub nodes: Vec<TopologyNode>,
}

impl Topology {
    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&TopologyNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// The attacker entry node, when one is marked.
    pub fn start(&self) -> Option<&TopologyNode> {
        self.nodes.iter().find(|n| n.is_start)
    }

    /// The attack target node, when one is marked.
    pub fn end(&self) -> Option<&TopologyNode> {
        self.nodes.iter().find(|n| n.is_end)
    }

    /// Check snapshot integrity: node names must be unique, since every
    /// downstream cross-reference resolves by name.
    pub fn validate(&self) -> Result<(), HarmError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.name.as_str()) {
                return Err(HarmError::Construction(format!(
                    "duplicate node name in topology {}: {}",
                    self.name, node.name
                )));
            }
        }
        Ok(())
    }
}

// ── Attack Path Records ───────────────────────────────────────────

/// A computed attack path through an attack graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackPath {
    pub id: Uuid,
    /// Node names along the path, attacker entry first, target last.
    pub steps: Vec<String>,
    pub source: String,
    pub target: String,
    pub computed_at: DateTime<Utc>,
}

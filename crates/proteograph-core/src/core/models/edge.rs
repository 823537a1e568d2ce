use super::node::{AttrMap, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Label identifying the geometric or chemical criterion that licensed an
/// edge.
///
/// A node pair may satisfy several criteria at once, so edges carry a set
/// of kinds rather than a single one. The enumeration covers the criteria
/// shipped by edge-construction collaborators; `Custom` keeps the set
/// extensible without stringly-typed attribute keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Below a plain Euclidean distance threshold.
    Distance,
    /// Sequential backbone connectivity.
    PeptideBond,
    /// Hydrogen bond donor/acceptor pairing.
    HydrogenBond,
    /// Salt bridge between oppositely charged residues.
    Ionic,
    /// Stacking between aromatic rings.
    Aromatic,
    /// Aromatic ring to sulphur contact.
    AromaticSulphur,
    /// Cation to aromatic ring contact.
    CationPi,
    /// Covalent disulfide bridge.
    Disulfide,
    /// Hydrophobic contact.
    Hydrophobic,
    /// K-nearest-neighbour adjacency.
    Knn,
    /// A criterion supplied by an external edge-construction function.
    Custom(String),
}

impl EdgeKind {
    /// Returns the canonical label used in logs and serialized output.
    pub fn label(&self) -> &str {
        match self {
            EdgeKind::Distance => "distance_threshold",
            EdgeKind::PeptideBond => "peptide_bond",
            EdgeKind::HydrogenBond => "hbond",
            EdgeKind::Ionic => "ionic",
            EdgeKind::Aromatic => "aromatic",
            EdgeKind::AromaticSulphur => "aromatic_sulphur",
            EdgeKind::CationPi => "cation_pi",
            EdgeKind::Disulfide => "disulfide",
            EdgeKind::Hydrophobic => "hydrophobic",
            EdgeKind::Knn => "knn",
            EdgeKind::Custom(label) => label,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The non-empty set of criteria justifying one contact.
pub type KindSet = BTreeSet<EdgeKind>;

/// An undirected edge of a structure graph.
///
/// The endpoint pair is stored in normalized (sorted) order so that a pair
/// has exactly one representation; a graph holds at most one edge per pair
/// and grows its kind set instead of duplicating the edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    u: NodeId,
    v: NodeId,
    /// Criteria satisfied by this node pair; never empty.
    pub kinds: KindSet,
    /// Annotation attributes added after edge construction.
    pub attrs: AttrMap,
}

impl Edge {
    /// Creates an edge between `a` and `b` with a single kind label,
    /// normalizing endpoint order.
    pub fn new(a: NodeId, b: NodeId, kind: EdgeKind) -> Self {
        let (u, v) = Self::normalize(a, b);
        let mut kinds = KindSet::new();
        kinds.insert(kind);
        Self {
            u,
            v,
            kinds,
            attrs: AttrMap::new(),
        }
    }

    /// Sorts an endpoint pair into its canonical representation.
    pub fn normalize(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// First endpoint in canonical order.
    pub fn u(&self) -> &NodeId {
        &self.u
    }

    /// Second endpoint in canonical order.
    pub fn v(&self) -> &NodeId {
        &self.v
    }

    /// Returns `true` if `id` is one of the endpoints.
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.u == id || &self.v == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_id(chain: char, number: isize) -> NodeId {
        NodeId {
            chain_id: chain,
            residue_name: "ALA".to_string(),
            residue_number: number,
            atom_name: None,
        }
    }

    #[test]
    fn endpoints_are_normalized_regardless_of_argument_order() {
        let forward = Edge::new(node_id('A', 1), node_id('A', 2), EdgeKind::Distance);
        let reverse = Edge::new(node_id('A', 2), node_id('A', 1), EdgeKind::Distance);
        assert_eq!(forward.u(), reverse.u());
        assert_eq!(forward.v(), reverse.v());
        assert_eq!(forward, reverse);
    }

    #[test]
    fn kind_set_starts_non_empty_and_grows() {
        let mut edge = Edge::new(node_id('A', 1), node_id('A', 2), EdgeKind::HydrogenBond);
        assert_eq!(edge.kinds.len(), 1);
        edge.kinds.insert(EdgeKind::Ionic);
        edge.kinds.insert(EdgeKind::HydrogenBond);
        assert_eq!(edge.kinds.len(), 2);
    }

    #[test]
    fn touches_matches_both_endpoints() {
        let edge = Edge::new(node_id('A', 1), node_id('B', 9), EdgeKind::Distance);
        assert!(edge.touches(&node_id('A', 1)));
        assert!(edge.touches(&node_id('B', 9)));
        assert!(!edge.touches(&node_id('A', 2)));
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(EdgeKind::Distance.label(), "distance_threshold");
        assert_eq!(EdgeKind::HydrogenBond.to_string(), "hbond");
        assert_eq!(EdgeKind::Custom("salt".to_string()).label(), "salt");
    }
}

use crate::core::models::edge::{EdgeKind, KindSet};
use crate::core::models::graph::GraphMeta;
use crate::core::models::node::NodeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// A node of a graph derived by grouping a finer graph's nodes.
///
/// Implementors carry whatever aggregate attributes their resolution
/// needs; the key is the grouping identity (chain id, segment id) that
/// edges are re-attached to.
pub trait DerivedNode {
    /// Grouping identity of the node.
    type Key: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display;

    fn key(&self) -> Self::Key;
}

/// One parallel edge of a derived multigraph.
///
/// Each source edge contributes one multigraph edge, so a node pair may
/// hold several parallel edges before collapse. Endpoints are stored in
/// normalized order; `provenance` records the source node pair the edge
/// was lifted from, when the derivation tracks it.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiEdge<K> {
    u: K,
    v: K,
    /// Kind set carried over from the source edge; never empty.
    pub kinds: KindSet,
    /// Source node pair this edge was derived from.
    pub provenance: Option<(NodeId, NodeId)>,
}

impl<K: Ord> MultiEdge<K> {
    /// Creates a multigraph edge, normalizing endpoint order.
    pub fn new(a: K, b: K, kinds: KindSet, provenance: Option<(NodeId, NodeId)>) -> Self {
        let (u, v) = if a <= b { (a, b) } else { (b, a) };
        Self {
            u,
            v,
            kinds,
            provenance,
        }
    }

    pub fn u(&self) -> &K {
        &self.u
    }

    pub fn v(&self) -> &K {
        &self.v
    }

    /// A self-loop connects a group to itself; at coarser resolutions
    /// these are intra-group contacts.
    pub fn is_self_loop(&self) -> bool {
        self.u == self.v
    }
}

/// A coarser graph derived from a [`StructureGraph`], in multigraph form.
///
/// Nodes appear in derivation order and a node pair may carry parallel
/// edges, one per contributing source edge. Metadata is shared by handle
/// with the source graph; derivations that need to change a field clone
/// the metadata and override it instead of mutating the source's.
#[derive(Debug, Clone)]
pub struct DerivedGraph<N: DerivedNode> {
    meta: Arc<GraphMeta>,
    resolution: &'static str,
    nodes: Vec<N>,
    node_index: HashMap<N::Key, usize>,
    edges: Vec<MultiEdge<N::Key>>,
}

impl<N: DerivedNode> DerivedGraph<N> {
    /// Creates an empty derived graph sharing `meta` with its source.
    pub fn new(meta: Arc<GraphMeta>, resolution: &'static str) -> Self {
        Self {
            meta,
            resolution,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// The metadata inherited from the source graph.
    pub fn meta(&self) -> &GraphMeta {
        &self.meta
    }

    /// The resolution tag of this derivation ("chain", "segment").
    pub fn resolution(&self) -> &'static str {
        self.resolution
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adds a node; the first node wins if a key is added twice.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.node_index.contains_key(&node.key()) {
            return false;
        }
        self.node_index.insert(node.key(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn node(&self, key: &N::Key) -> Option<&N> {
        self.node_index.get(key).map(|&i| &self.nodes[i])
    }

    /// Mutable lookup, used by derivations that accumulate into nodes.
    pub fn node_mut(&mut self, key: &N::Key) -> Option<&mut N> {
        let index = *self.node_index.get(key)?;
        self.nodes.get_mut(index)
    }

    pub fn contains_node(&self, key: &N::Key) -> bool {
        self.node_index.contains_key(key)
    }

    /// All nodes in derivation order.
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// All parallel edges in derivation order.
    pub fn edges(&self) -> &[MultiEdge<N::Key>] {
        &self.edges
    }

    /// Appends a parallel edge without merging.
    pub fn add_edge(&mut self, edge: MultiEdge<N::Key>) {
        self.edges.push(edge);
    }

    /// Deletes every edge whose endpoints are equal, returning how many
    /// were removed. Never increases the edge count.
    pub fn remove_self_loops(&mut self) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !e.is_self_loop());
        let removed = before - self.edges.len();
        if removed > 0 {
            debug!(removed, resolution = self.resolution, "removed self-loops");
        }
        removed
    }

    /// Collapses parallel edges into a weighted simple graph.
    ///
    /// For every node pair the collapsed edge carries:
    /// - `weight`: the sum over parallel edges of their kind-set sizes,
    /// - `kinds`: the union of the parallel edges' kind sets,
    /// - `kind_counts`: for each kind, the number of parallel edges whose
    ///   kind set contains it (not occurrences within one edge).
    ///
    /// The dual accounting is deliberate: the union answers "does this
    /// interaction type exist between the groups", the counts answer "how
    /// many separate contacts of this type are there".
    pub fn collapse(self) -> WeightedGraph<N> {
        let mut edges: Vec<WeightedEdge<N::Key>> = Vec::new();
        let mut edge_index: HashMap<(N::Key, N::Key), usize> = HashMap::new();

        for edge in &self.edges {
            let key = (edge.u().clone(), edge.v().clone());
            match edge_index.get(&key) {
                Some(&i) => {
                    let collapsed = &mut edges[i];
                    collapsed.weight += edge.kinds.len();
                    for kind in &edge.kinds {
                        *collapsed.kind_counts.entry(kind.clone()).or_insert(0) += 1;
                        collapsed.kinds.insert(kind.clone());
                    }
                }
                None => {
                    let mut kind_counts = BTreeMap::new();
                    for kind in &edge.kinds {
                        kind_counts.insert(kind.clone(), 1);
                    }
                    edge_index.insert(key, edges.len());
                    edges.push(WeightedEdge {
                        u: edge.u().clone(),
                        v: edge.v().clone(),
                        weight: edge.kinds.len(),
                        kinds: edge.kinds.clone(),
                        kind_counts,
                    });
                }
            }
        }

        debug!(
            pairs = edges.len(),
            parallel = self.edges.len(),
            resolution = self.resolution,
            "collapsed multigraph to weighted graph"
        );

        WeightedGraph {
            meta: self.meta,
            resolution: self.resolution,
            nodes: self.nodes,
            node_index: self.node_index,
            edges,
            edge_index,
        }
    }
}

/// The single aggregated edge of a collapsed node pair.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedEdge<K> {
    u: K,
    v: K,
    /// Sum of the parallel edges' kind-set sizes.
    pub weight: usize,
    /// Union of the parallel edges' kind sets.
    pub kinds: KindSet,
    /// Number of parallel edges carrying each kind.
    pub kind_counts: BTreeMap<EdgeKind, usize>,
}

impl<K> WeightedEdge<K> {
    pub fn u(&self) -> &K {
        &self.u
    }

    pub fn v(&self) -> &K {
        &self.v
    }
}

/// A derived graph after weighted collapse: simple, with one aggregated
/// edge per node pair.
#[derive(Debug, Clone)]
pub struct WeightedGraph<N: DerivedNode> {
    meta: Arc<GraphMeta>,
    resolution: &'static str,
    nodes: Vec<N>,
    node_index: HashMap<N::Key, usize>,
    edges: Vec<WeightedEdge<N::Key>>,
    edge_index: HashMap<(N::Key, N::Key), usize>,
}

impl<N: DerivedNode> WeightedGraph<N> {
    pub fn meta(&self) -> &GraphMeta {
        &self.meta
    }

    pub fn resolution(&self) -> &'static str {
        self.resolution
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn node(&self, key: &N::Key) -> Option<&N> {
        self.node_index.get(key).map(|&i| &self.nodes[i])
    }

    pub fn edges(&self) -> &[WeightedEdge<N::Key>] {
        &self.edges
    }

    /// Looks up the aggregated edge between two keys, in either order.
    pub fn edge(&self, a: &N::Key, b: &N::Key) -> Option<&WeightedEdge<N::Key>> {
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        self.edge_index.get(&key).map(|&i| &self.edges[i])
    }
}

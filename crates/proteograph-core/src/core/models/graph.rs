use super::edge::{Edge, EdgeKind, KindSet};
use super::node::{AttrMap, Node, NodeId};
use super::record::RecordTable;
use nalgebra::{DMatrix, Point3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// The resolution at which graph nodes are defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// One node per atom.
    Atom,
    /// One node per residue, positioned at the mean of its atom coordinates.
    Centroid,
    /// One node per residue, positioned at the named atom (e.g. "CA").
    NamedAtom(String),
}

impl Granularity {
    /// Convenience constructor for a named-atom granularity token.
    pub fn named(token: &str) -> Self {
        Granularity::NamedAtom(token.to_ascii_uppercase())
    }
}

impl FromStr for Granularity {
    type Err = ();

    /// Parses a granularity token. Unknown tokens are treated as atom
    /// names, mirroring how structure sources spell them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "atom" => Ok(Granularity::Atom),
            "centroid" | "centroids" => Ok(Granularity::Centroid),
            _ => Ok(Granularity::named(s)),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Atom => f.write_str("atom"),
            Granularity::Centroid => f.write_str("centroid"),
            Granularity::NamedAtom(token) => f.write_str(token),
        }
    }
}

/// Restriction of a structure to a subset of its chains.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChainSelection {
    /// Keep every chain.
    #[default]
    All,
    /// Keep only the listed chain identifiers.
    Chains(Vec<char>),
}

impl ChainSelection {
    /// Returns `true` if `chain_id` passes the selection.
    pub fn accepts(&self, chain_id: char) -> bool {
        match self {
            ChainSelection::All => true,
            ChainSelection::Chains(chains) => chains.contains(&chain_id),
        }
    }
}

impl FromStr for ChainSelection {
    type Err = ();

    /// Parses the conventional selection string: `"all"` keeps every
    /// chain, any other string is read as a list of chain characters
    /// (`"ACF"` selects chains A, C and F).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(ChainSelection::All)
        } else {
            Ok(ChainSelection::Chains(s.chars().collect()))
        }
    }
}

/// The cleanup and granularity policies a graph was constructed with.
///
/// Stored on the graph's metadata for traceability; the reducer consumes
/// these directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionOptions {
    /// Node resolution of the graph.
    pub granularity: Granularity,
    /// Drop proton rows before reduction.
    pub deprotonate: bool,
    /// Keep insertion and alternate-location duplicates instead of
    /// resolving them to one row.
    pub keep_insertions: bool,
    /// Heteroatom residue names to retain as nodes (e.g. "HOH", "HEM").
    pub keep_hets: Vec<String>,
}

impl Default for ConstructionOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::named("CA"),
            deprotonate: true,
            keep_insertions: false,
            keep_hets: Vec::new(),
        }
    }
}

/// Graph-level metadata populated during construction.
///
/// The metadata travels with the graph as a shared handle: graphs derived
/// from this one reference the same instance unless a derivation step
/// explicitly overrides a field. Distance matrices are cached here once by
/// the edge dispatcher and reused by every edge function; their rows are
/// indexed by the position of the corresponding row in `processed_table`
/// (or `raw_table` for the atomic matrix).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphMeta {
    /// Stable graph name, usable as a file stem by persistence collaborators.
    pub name: String,
    /// Remote accession the structure was fetched by, if any.
    pub accession: Option<String>,
    /// Local path the structure was read from, if any.
    pub path: Option<PathBuf>,
    /// Distinct chain identifiers in first-appearance order.
    pub chain_ids: Vec<char>,
    /// Per-chain one-letter sequence strings.
    pub sequences: BTreeMap<char, String>,
    /// The unreduced record table, kept for traceability and for the
    /// full-atom distance matrix.
    pub raw_table: RecordTable,
    /// The reduced table; one row per node, in node order.
    pub processed_table: RecordTable,
    /// Side-chain rows of the insertion-resolved raw table.
    pub sidechain_table: RecordTable,
    /// Node coordinates in node order.
    pub coords: Vec<Point3<f64>>,
    /// Pairwise distances over `processed_table`; primed by the edge
    /// dispatcher at residue-level granularities.
    pub dist_matrix: Option<DMatrix<f64>>,
    /// Pairwise distances over `raw_table`; primed at atomic granularity.
    pub atomic_dist_matrix: Option<DMatrix<f64>>,
    /// Policies the graph was constructed with.
    pub options: ConstructionOptions,
    /// Chain selection applied during reduction.
    pub chain_selection: ChainSelection,
    /// Graph-level annotation attributes.
    pub attrs: AttrMap,
}

impl GraphMeta {
    /// Creates metadata with a name and construction options; the
    /// assembler fills the remaining fields.
    pub fn new(name: &str, options: ConstructionOptions) -> Self {
        Self {
            name: name.to_string(),
            accession: None,
            path: None,
            chain_ids: Vec::new(),
            sequences: BTreeMap::new(),
            raw_table: RecordTable::new(),
            processed_table: RecordTable::new(),
            sidechain_table: RecordTable::new(),
            coords: Vec::new(),
            dist_matrix: None,
            atomic_dist_matrix: None,
            options,
            chain_selection: ChainSelection::All,
            attrs: AttrMap::new(),
        }
    }

    /// The node resolution the graph was built at.
    pub fn granularity(&self) -> &Granularity {
        &self.options.granularity
    }

    /// The per-chain sequence string, if the chain exists.
    pub fn sequence(&self, chain_id: char) -> Option<&str> {
        self.sequences.get(&chain_id).map(String::as_str)
    }
}

/// An attributed structure graph at a single resolution.
///
/// Nodes are stored in insertion order, which downstream derivations rely
/// on (run-length segmentation walks nodes in exactly this order). The
/// graph is simple: one edge per node pair, whose kind set grows when
/// several criteria license the same contact. After assembly the node set
/// is frozen; edge functions add edges and annotation functions add
/// attributes, but nothing removes nodes short of an explicit subsetting
/// operation.
#[derive(Debug, Clone)]
pub struct StructureGraph {
    meta: Arc<GraphMeta>,
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_index: HashMap<(NodeId, NodeId), usize>,
}

impl StructureGraph {
    /// Creates an empty graph carrying the given metadata.
    pub fn new(meta: GraphMeta) -> Self {
        Self {
            meta: Arc::new(meta),
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
        }
    }

    /// Immutable access to the graph metadata.
    pub fn meta(&self) -> &GraphMeta {
        &self.meta
    }

    /// Mutable access to the graph metadata.
    ///
    /// Construction stages own their graph exclusively, so this is a cheap
    /// in-place borrow; once the metadata handle has been shared with a
    /// derived graph, the first mutation clones it instead.
    pub fn meta_mut(&mut self) -> &mut GraphMeta {
        Arc::make_mut(&mut self.meta)
    }

    /// Returns the shared metadata handle for derivation.
    pub fn meta_handle(&self) -> Arc<GraphMeta> {
        Arc::clone(&self.meta)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adds a node, preserving insertion order.
    ///
    /// Node identifiers are unique within a graph; a duplicate is refused
    /// and logged, keeping the first occurrence. Duplicates reaching this
    /// point mean the reducer was configured to keep insertions while the
    /// assembler was not, so the refusal is a guard rather than a policy.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            warn!(node_id = %node.id, "duplicate node refused; keeping first occurrence");
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Looks up a node by identifier.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Mutable lookup of a node by identifier.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        let index = *self.node_index.get(id)?;
        self.nodes.get_mut(index)
    }

    /// Returns `true` if the node exists.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    /// The position of a node in insertion order, which is also its row in
    /// the processed table and the residue-level distance matrix.
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable iterator over nodes in insertion order.
    pub fn nodes_iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Adds `kind` to the edge between `a` and `b`, creating the edge if
    /// the pair is new.
    ///
    /// Edge construction never alters the node set: an endpoint that does
    /// not exist is logged and the edge is refused.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, kind: EdgeKind) -> bool {
        if !self.contains_node(&a) || !self.contains_node(&b) {
            warn!(u = %a, v = %b, "edge endpoint not in graph; edge refused");
            return false;
        }
        let key = Edge::normalize(a, b);
        match self.edge_index.get(&key) {
            Some(&i) => {
                self.edges[i].kinds.insert(kind);
            }
            None => {
                let edge = Edge::new(key.0.clone(), key.1.clone(), kind);
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(edge);
            }
        }
        true
    }

    /// Looks up the edge between `a` and `b`, if any.
    pub fn edge(&self, a: &NodeId, b: &NodeId) -> Option<&Edge> {
        let key = Edge::normalize(a.clone(), b.clone());
        self.edge_index.get(&key).map(|&i| &self.edges[i])
    }

    /// Mutable lookup of the edge between `a` and `b`.
    pub fn edge_mut(&mut self, a: &NodeId, b: &NodeId) -> Option<&mut Edge> {
        let key = Edge::normalize(a.clone(), b.clone());
        let index = *self.edge_index.get(&key)?;
        self.edges.get_mut(index)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Mutable iterator over edges in insertion order.
    pub fn edges_iter_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.iter_mut()
    }

    /// The kind sets of every edge, in edge order. Mostly a test aid.
    pub fn kind_sets(&self) -> Vec<&KindSet> {
        self.edges.iter().map(|e| &e.kinds).collect()
    }

    /// Produces a new graph restricted to `chains`.
    ///
    /// Pure subsetting: nodes whose chain id is listed survive in order,
    /// and edges survive when both endpoints do. The metadata handle is
    /// copied with the chain list and sequences overridden to the retained
    /// subset; record tables and distance caches carry over from the
    /// source unchanged and stay indexed by the source's tables.
    pub fn restrict_to_chains(&self, chains: &[char]) -> StructureGraph {
        let mut meta = (*self.meta).clone();
        meta.chain_ids = meta
            .chain_ids
            .iter()
            .copied()
            .filter(|c| chains.contains(c))
            .collect();
        meta.sequences = std::mem::take(&mut meta.sequences)
            .into_iter()
            .filter(|(c, _)| chains.contains(c))
            .collect();
        meta.chain_selection = ChainSelection::Chains(chains.to_vec());

        let mut graph = StructureGraph::new(meta);
        for node in &self.nodes {
            if chains.contains(&node.chain_id) {
                graph.add_node(node.clone());
            }
        }
        for edge in &self.edges {
            if graph.contains_node(edge.u()) && graph.contains_node(edge.v()) {
                let index = graph.edges.len();
                graph
                    .edge_index
                    .insert((edge.u().clone(), edge.v().clone()), index);
                graph.edges.push(edge.clone());
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::record::{AtomRecord, RecordKind};

    fn record(chain: char, number: isize, atom: &str) -> AtomRecord {
        AtomRecord {
            chain_id: chain,
            residue_name: "ALA".to_string(),
            residue_number: number,
            insertion: String::new(),
            alt_loc: String::new(),
            atom_name: atom.to_string(),
            element: "C".to_string(),
            position: Point3::new(number as f64, 0.0, 0.0),
            b_factor: 0.0,
            kind: RecordKind::Standard,
        }
    }

    fn graph_with_nodes(entries: &[(char, isize)]) -> StructureGraph {
        let meta = GraphMeta::new("test", ConstructionOptions::default());
        let mut graph = StructureGraph::new(meta);
        for &(chain, number) in entries {
            let node = Node::from_record(&record(chain, number, "CA"), &Granularity::named("CA"));
            assert!(graph.add_node(node));
        }
        graph
    }

    fn id(chain: char, number: isize) -> NodeId {
        NodeId {
            chain_id: chain,
            residue_name: "ALA".to_string(),
            residue_number: number,
            atom_name: None,
        }
    }

    mod node_management {
        use super::*;

        #[test]
        fn nodes_keep_insertion_order() {
            let graph = graph_with_nodes(&[('A', 2), ('A', 1), ('B', 5)]);
            let order: Vec<String> = graph.nodes().iter().map(|n| n.id.to_string()).collect();
            assert_eq!(order, vec!["A:ALA:2", "A:ALA:1", "B:ALA:5"]);
            assert_eq!(graph.index_of(&id('A', 1)), Some(1));
        }

        #[test]
        fn duplicate_node_is_refused_keeping_first() {
            let mut graph = graph_with_nodes(&[('A', 1)]);
            let mut dup = Node::from_record(&record('A', 1, "CA"), &Granularity::named("CA"));
            dup.b_factor = 99.0;
            assert!(!graph.add_node(dup));
            assert_eq!(graph.node_count(), 1);
            assert_eq!(graph.node(&id('A', 1)).unwrap().b_factor, 0.0);
        }
    }

    mod edge_management {
        use super::*;

        #[test]
        fn repeated_pair_grows_kind_set_instead_of_duplicating() {
            let mut graph = graph_with_nodes(&[('A', 1), ('A', 2)]);
            assert!(graph.add_edge(id('A', 1), id('A', 2), EdgeKind::Distance));
            assert!(graph.add_edge(id('A', 2), id('A', 1), EdgeKind::HydrogenBond));

            assert_eq!(graph.edge_count(), 1);
            let edge = graph.edge(&id('A', 1), &id('A', 2)).unwrap();
            assert!(edge.kinds.contains(&EdgeKind::Distance));
            assert!(edge.kinds.contains(&EdgeKind::HydrogenBond));
        }

        #[test]
        fn edge_with_unknown_endpoint_is_refused() {
            let mut graph = graph_with_nodes(&[('A', 1)]);
            assert!(!graph.add_edge(id('A', 1), id('Z', 9), EdgeKind::Distance));
            assert_eq!(graph.edge_count(), 0);
        }
    }

    mod chain_restriction {
        use super::*;

        #[test]
        fn restriction_keeps_selected_chains_and_their_edges() {
            let mut graph = graph_with_nodes(&[('A', 1), ('A', 2), ('B', 1), ('C', 1)]);
            graph.meta_mut().chain_ids = vec!['A', 'B', 'C'];
            graph
                .meta_mut()
                .sequences
                .extend([('A', "AA".to_string()), ('B', "A".to_string()), ('C', "A".to_string())]);
            graph.add_edge(id('A', 1), id('A', 2), EdgeKind::PeptideBond);
            graph.add_edge(id('A', 2), id('B', 1), EdgeKind::Distance);
            graph.add_edge(id('B', 1), id('C', 1), EdgeKind::Distance);

            let sub = graph.restrict_to_chains(&['A', 'B']);

            assert_eq!(sub.node_count(), 3);
            assert_eq!(sub.edge_count(), 2);
            assert!(sub.edge(&id('B', 1), &id('C', 1)).is_none());
            assert_eq!(sub.meta().chain_ids, vec!['A', 'B']);
            assert!(sub.meta().sequence('C').is_none());
            assert_eq!(
                sub.meta().chain_selection,
                ChainSelection::Chains(vec!['A', 'B'])
            );
        }
    }

    mod selections {
        use super::*;
        use std::str::FromStr;

        #[test]
        fn chain_selection_parses_all_and_lists() {
            assert_eq!(ChainSelection::from_str("all"), Ok(ChainSelection::All));
            assert_eq!(ChainSelection::from_str("ALL"), Ok(ChainSelection::All));
            assert_eq!(
                ChainSelection::from_str("ACF"),
                Ok(ChainSelection::Chains(vec!['A', 'C', 'F']))
            );
            assert!(ChainSelection::All.accepts('Q'));
            assert!(!ChainSelection::Chains(vec!['A']).accepts('B'));
        }

        #[test]
        fn granularity_parses_known_tokens_and_atom_names() {
            assert_eq!(Granularity::from_str("atom"), Ok(Granularity::Atom));
            assert_eq!(Granularity::from_str("centroids"), Ok(Granularity::Centroid));
            assert_eq!(
                Granularity::from_str("cb"),
                Ok(Granularity::NamedAtom("CB".to_string()))
            );
            assert_eq!(Granularity::named("ca").to_string(), "CA");
        }
    }
}

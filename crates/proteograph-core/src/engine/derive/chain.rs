use super::collapse::{DerivedGraph, DerivedNode, MultiEdge};
use crate::core::chemistry;
use crate::core::models::graph::StructureGraph;
use std::collections::HashMap;
use tracing::debug;

/// A chain-level node: one per distinct chain identifier of the source
/// graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainNode {
    /// Chain identifier.
    pub id: char,
    /// Number of residues the chain contributes to the source graph.
    pub residue_count: usize,
    /// Concatenated one-letter sequence of those residues.
    pub sequence: String,
}

impl DerivedNode for ChainNode {
    type Key = char;

    fn key(&self) -> Self::Key {
        self.id
    }
}

/// A chain-level graph in multigraph form: every inter-node contact of
/// the source graph becomes one parallel edge between its chains.
pub type ChainGraph = DerivedGraph<ChainNode>;

/// Options for chain-graph derivation.
#[derive(Debug, Clone, Default)]
pub struct ChainGraphOptions {
    /// Restrict the source graph to these chains before deriving.
    pub chains: Option<Vec<char>>,
    /// Drop intra-chain contacts, which collapse to self-loops at this
    /// resolution.
    pub remove_self_loops: bool,
}

/// Derives the chain-level graph of a structure graph.
///
/// Nodes are the distinct chain identifiers of the (possibly
/// chain-restricted) source, each carrying its residue count and
/// concatenated one-letter sequence, both accumulated in a single pass
/// over the source nodes in insertion order. Every source edge becomes a
/// parallel edge between its endpoints' chains, keeping the source edge's
/// kind set; use [`DerivedGraph::collapse`] for the weighted form.
pub fn chain_graph(source: &StructureGraph, options: &ChainGraphOptions) -> ChainGraph {
    let restricted;
    let source = match &options.chains {
        Some(chains) => {
            restricted = source.restrict_to_chains(chains);
            &restricted
        }
        None => source,
    };

    // One pass over the nodes: counts and sequences per chain.
    // Consecutive nodes of one residue count once, so atomic-granularity
    // sources aggregate the same way residue-level ones do.
    let mut residue_counts: HashMap<char, usize> = HashMap::new();
    let mut sequences: HashMap<char, String> = HashMap::new();
    let mut last_residue: HashMap<char, (String, isize)> = HashMap::new();
    for node in source.nodes() {
        let residue = (node.residue_name.clone(), node.residue_number);
        if last_residue.get(&node.chain_id) == Some(&residue) {
            continue;
        }
        last_residue.insert(node.chain_id, residue);
        *residue_counts.entry(node.chain_id).or_insert(0) += 1;
        sequences
            .entry(node.chain_id)
            .or_default()
            .push(chemistry::one_letter_code_lossy(&node.residue_name));
    }

    let mut graph = ChainGraph::new(source.meta_handle(), "chain");
    for &chain_id in &source.meta().chain_ids {
        graph.add_node(ChainNode {
            id: chain_id,
            residue_count: residue_counts.get(&chain_id).copied().unwrap_or(0),
            sequence: sequences.remove(&chain_id).unwrap_or_default(),
        });
    }

    for edge in source.edges() {
        let u_chain = edge.u().chain_id;
        let v_chain = edge.v().chain_id;
        graph.add_edge(MultiEdge::new(
            u_chain,
            v_chain,
            edge.kinds.clone(),
            None,
        ));
    }

    if options.remove_self_loops {
        graph.remove_self_loops();
    }

    debug!(
        chains = graph.node_count(),
        contacts = graph.edge_count(),
        "derived chain graph"
    );
    graph
}

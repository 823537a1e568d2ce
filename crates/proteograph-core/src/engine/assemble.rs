use crate::core::chemistry;
use crate::core::models::graph::{
    ChainSelection, ConstructionOptions, GraphMeta, StructureGraph,
};
use crate::core::models::node::Node;
use crate::core::models::record::RecordTable;
use crate::engine::error::GraphError;
use crate::engine::reduce;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Builds an attributed graph from a reduced record table.
///
/// Every row of `processed` becomes one node, in table order, with its
/// intrinsic attributes populated; no edges are added here. Graph-level
/// metadata is filled in the same pass: the chain list, per-chain
/// sequences, both record tables for traceability, the side-chain table,
/// and the node coordinates later consumed by the distance cache.
///
/// # Arguments
///
/// * `processed` - The reduced table; exactly one row per node.
/// * `raw` - The unreduced table, kept for traceability and the full-atom
///   distance matrix.
/// * `options` - Construction policies recorded on the graph.
/// * `name` - Optional explicit graph name; falls back to the accession or
///   the file stem.
/// * `accession` - Remote accession, if the structure was fetched.
/// * `path` - Local path, if the structure was read from disk.
/// * `chains` - The chain selection that was applied during reduction.
///
/// # Errors
///
/// Returns [`GraphError::SourceSpecification`] unless exactly one of
/// `accession` and `path` is supplied.
pub fn assemble(
    processed: RecordTable,
    raw: RecordTable,
    options: &ConstructionOptions,
    name: Option<&str>,
    accession: Option<&str>,
    path: Option<&Path>,
    chains: &ChainSelection,
) -> Result<StructureGraph, GraphError> {
    if accession.is_some() == path.is_some() {
        return Err(GraphError::SourceSpecification);
    }

    let name = name
        .map(str::to_string)
        .or_else(|| accession.map(str::to_string))
        .or_else(|| {
            path.and_then(Path::file_stem)
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "structure".to_string());

    let mut meta = GraphMeta::new(&name, options.clone());
    meta.accession = accession.map(str::to_string);
    meta.path = path.map(Path::to_path_buf);
    meta.chain_ids = processed.chain_ids();
    meta.sequences = chain_sequences(&processed);
    meta.sidechain_table = sidechain_table(&raw);
    meta.coords = processed.positions();
    meta.chain_selection = chains.clone();
    meta.raw_table = raw;
    meta.processed_table = processed;

    let mut graph = StructureGraph::new(meta);
    let rows: Vec<Node> = graph
        .meta()
        .processed_table
        .iter()
        .map(|record| Node::from_record(record, &graph.meta().options.granularity))
        .collect();
    for node in rows {
        graph.add_node(node);
    }

    debug!(
        name = %graph.meta().name,
        nodes = graph.node_count(),
        chains = graph.meta().chain_ids.len(),
        "assembled graph"
    );
    Ok(graph)
}

/// Builds the per-chain one-letter sequence strings.
///
/// Rows are walked in table order; consecutive rows belonging to one
/// residue contribute a single letter, so the sequence reads the same at
/// atomic and residue-level granularities. Residue names unknown to both
/// mapping tables become [`chemistry::UNKNOWN_RESIDUE_CODE`].
fn chain_sequences(processed: &RecordTable) -> BTreeMap<char, String> {
    let mut sequences: BTreeMap<char, String> = BTreeMap::new();
    let mut last_residue: BTreeMap<char, (isize, String)> = BTreeMap::new();

    for record in processed.iter() {
        let residue = (record.residue_number, record.insertion.clone());
        if last_residue.get(&record.chain_id) == Some(&residue) {
            continue;
        }
        last_residue.insert(record.chain_id, residue);
        sequences
            .entry(record.chain_id)
            .or_default()
            .push(chemistry::one_letter_code_lossy(&record.residue_name));
    }
    sequences
}

/// Side-chain rows of the insertion-resolved raw table.
fn sidechain_table(raw: &RecordTable) -> RecordTable {
    let resolved = reduce::resolve_insertions(raw.clone());
    RecordTable::from_records(
        resolved
            .into_iter()
            .filter(|r| !chemistry::is_backbone_atom(&r.atom_name))
            .collect(),
    )
}

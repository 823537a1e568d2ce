use crate::core::io::traits::RecordSource;
use crate::core::models::graph::{ChainSelection, StructureGraph};
use crate::engine::config::GraphConfig;
use crate::engine::error::GraphError;
use crate::engine::{annotate, assemble, edges, reduce};
use std::path::Path;
use tracing::{info, instrument};

/// Constructs a structure graph for a single input.
///
/// The synchronous construction chain: fetch records, reduce to one row
/// per node, assemble nodes and metadata, run node annotators, dispatch
/// edge construction against the primed distance cache, then run graph
/// and edge annotators. Errors propagate to the caller unrecovered; the
/// batch executor is the only layer that converts them to null results.
///
/// # Arguments
///
/// * `source` - The record-fetching collaborator.
/// * `config` - Pipeline configuration.
/// * `name` - Optional explicit graph name; defaults to the accession or
///   file stem.
/// * `accession` - Remote accession; exactly one of this and `path`.
/// * `path` - Local structure file; exactly one of this and `accession`.
/// * `chains` - Chain selection for this structure.
///
/// # Errors
///
/// [`GraphError::SourceSpecification`] unless exactly one source
/// identifier is given; [`GraphError::Fetch`] when the record source
/// fails; any reduction error such as
/// [`GraphError::GranularityUnmatched`].
#[instrument(skip_all, name = "graph_construction")]
pub fn construct_graph<S: RecordSource>(
    source: &S,
    config: &GraphConfig,
    name: Option<&str>,
    accession: Option<&str>,
    path: Option<&Path>,
    chains: &ChainSelection,
) -> Result<StructureGraph, GraphError> {
    let raw = match (accession, path) {
        (Some(accession), None) => source.fetch(accession).map_err(GraphError::fetch)?,
        (None, Some(path)) => source.load(path).map_err(GraphError::fetch)?,
        _ => return Err(GraphError::SourceSpecification),
    };

    let processed = reduce::reduce(&raw, config, chains)?;
    let graph = assemble::assemble(
        processed,
        raw,
        &config.construction,
        name,
        accession,
        path,
        chains,
    )?;

    let graph = annotate::annotate_nodes(graph, &config.node_annotators);
    let graph = edges::dispatch(graph, &config.edge_fns);
    let graph = annotate::annotate_graph(graph, &config.graph_annotators);
    let graph = annotate::annotate_edges(graph, &config.edge_annotators);

    info!(
        name = %graph.meta().name,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "constructed structure graph"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chemistry;
    use crate::core::models::edge::EdgeKind;
    use crate::core::models::graph::Granularity;
    use crate::core::models::record::{AtomRecord, RecordKind, RecordTable};
    use nalgebra::Point3;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Arc;

    struct StubSource {
        tables: HashMap<String, RecordTable>,
    }

    impl StubSource {
        fn with(entries: &[(&str, RecordTable)]) -> Self {
            Self {
                tables: entries
                    .iter()
                    .map(|(k, t)| (k.to_string(), t.clone()))
                    .collect(),
            }
        }
    }

    impl RecordSource for StubSource {
        type Error = io::Error;

        fn fetch(&self, accession: &str) -> Result<RecordTable, Self::Error> {
            self.tables
                .get(accession)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, accession.to_string()))
        }

        fn load(&self, path: &Path) -> Result<RecordTable, Self::Error> {
            self.fetch(&path.display().to_string())
        }
    }

    fn atom(chain: char, residue: &str, number: isize, name: &str, element: &str) -> AtomRecord {
        AtomRecord {
            chain_id: chain,
            residue_name: residue.to_string(),
            residue_number: number,
            insertion: String::new(),
            alt_loc: String::new(),
            atom_name: name.to_string(),
            element: element.to_string(),
            position: Point3::new(number as f64 * 3.0, 0.0, 0.0),
            b_factor: 0.0,
            kind: RecordKind::Standard,
        }
    }

    /// Two chains: A = GLY1, ALA2; B = MSE1.
    fn sample_table() -> RecordTable {
        RecordTable::from_records(vec![
            atom('A', "GLY", 1, "N", "N"),
            atom('A', "GLY", 1, "CA", "C"),
            atom('A', "GLY", 1, "HA", "H"),
            atom('A', "ALA", 2, "N", "N"),
            atom('A', "ALA", 2, "CA", "C"),
            atom('B', "MSE", 1, "CA", "C"),
        ])
    }

    #[test]
    fn end_to_end_construction_produces_one_node_per_residue() {
        let source = StubSource::with(&[("1abc", sample_table())]);
        let config = GraphConfig::builder()
            .granularity(Granularity::named("CA"))
            .build();

        let graph = construct_graph(
            &source,
            &config,
            None,
            Some("1abc"),
            None,
            &ChainSelection::All,
        )
        .unwrap();

        assert_eq!(graph.meta().name, "1abc");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.meta().chain_ids, vec!['A', 'B']);
        assert!(graph.meta().dist_matrix.is_some());
    }

    #[test]
    fn centroid_sequences_match_direct_residue_mapping() {
        let source = StubSource::with(&[("1abc", sample_table())]);
        let config = GraphConfig::builder()
            .granularity(Granularity::Centroid)
            .build();

        let graph = construct_graph(
            &source,
            &config,
            None,
            Some("1abc"),
            None,
            &ChainSelection::All,
        )
        .unwrap();

        // The graph-level sequence equals the residue-name mapping applied
        // directly to the chain's residues in table order.
        let expected_a: String = ["GLY", "ALA"]
            .iter()
            .map(|r| chemistry::one_letter_code_lossy(r))
            .collect();
        assert_eq!(graph.meta().sequence('A'), Some(expected_a.as_str()));
        assert_eq!(graph.meta().sequence('B'), Some("M"));
    }

    #[test]
    fn node_annotators_run_before_edge_construction() {
        let source = StubSource::with(&[("1abc", sample_table())]);
        let config = GraphConfig::builder()
            .granularity(Granularity::named("CA"))
            .with_node_annotator(Arc::new(|g| {
                for node in g.nodes_iter_mut() {
                    node.attrs.insert("ss".to_string(), "H".into());
                }
            }))
            .with_edge_fn(Arc::new(|g| {
                // Connect every labelled pair; the labels must already be
                // present when edge construction runs.
                let ids: Vec<_> = g
                    .nodes()
                    .iter()
                    .filter(|n| n.text_attr("ss").is_some())
                    .map(|n| n.id.clone())
                    .collect();
                assert_eq!(ids.len(), g.node_count());
                for pair in ids.windows(2) {
                    g.add_edge(pair[0].clone(), pair[1].clone(), EdgeKind::Distance);
                }
            }))
            .build();

        let graph = construct_graph(
            &source,
            &config,
            None,
            Some("1abc"),
            None,
            &ChainSelection::All,
        )
        .unwrap();
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn chain_selection_restricts_the_constructed_graph() {
        let source = StubSource::with(&[("1abc", sample_table())]);
        let config = GraphConfig::builder()
            .granularity(Granularity::named("CA"))
            .build();

        let graph = construct_graph(
            &source,
            &config,
            None,
            Some("1abc"),
            None,
            &ChainSelection::Chains(vec!['A']),
        )
        .unwrap();

        assert_eq!(graph.meta().chain_ids, vec!['A']);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn single_item_api_propagates_fetch_errors() {
        let source = StubSource::with(&[]);
        let config = GraphConfig::builder().build();

        let err = construct_graph(
            &source,
            &config,
            None,
            Some("nonexistent"),
            None,
            &ChainSelection::All,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Fetch { .. }));
    }

    #[test]
    fn ambiguous_source_is_rejected_before_fetching() {
        let source = StubSource::with(&[("1abc", sample_table())]);
        let config = GraphConfig::builder().build();

        let err = construct_graph(
            &source,
            &config,
            None,
            Some("1abc"),
            Some(Path::new("/tmp/1abc.pdb")),
            &ChainSelection::All,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::SourceSpecification));

        let err = construct_graph(&source, &config, None, None, None, &ChainSelection::All)
            .unwrap_err();
        assert!(matches!(err, GraphError::SourceSpecification));
    }

    #[test]
    fn graph_is_loadable_from_a_path_source() {
        let source = StubSource::with(&[("/data/4hhb.pdb", sample_table())]);
        let config = GraphConfig::builder()
            .granularity(Granularity::named("CA"))
            .build();

        let graph = construct_graph(
            &source,
            &config,
            None,
            None,
            Some(Path::new("/data/4hhb.pdb")),
            &ChainSelection::All,
        )
        .unwrap();
        assert_eq!(graph.meta().name, "4hhb");
        assert_eq!(graph.meta().path.as_deref(), Some(Path::new("/data/4hhb.pdb")));
    }
}

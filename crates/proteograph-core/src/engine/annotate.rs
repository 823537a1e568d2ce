use crate::core::models::graph::StructureGraph;
use crate::engine::config::{EdgeAnnotator, GraphAnnotator, NodeAnnotator};

/// Runs the node-annotation functions in list order.
///
/// Annotators add or overwrite keyed attributes and never remove them;
/// when two functions write the same key, the later one wins.
pub fn annotate_nodes(mut graph: StructureGraph, funcs: &[NodeAnnotator]) -> StructureGraph {
    for f in funcs {
        f(&mut graph);
    }
    graph
}

/// Runs the graph-annotation functions in list order.
pub fn annotate_graph(mut graph: StructureGraph, funcs: &[GraphAnnotator]) -> StructureGraph {
    for f in funcs {
        f(&mut graph);
    }
    graph
}

/// Runs the edge-annotation functions in list order.
pub fn annotate_edges(mut graph: StructureGraph, funcs: &[EdgeAnnotator]) -> StructureGraph {
    for f in funcs {
        f(&mut graph);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::graph::{ChainSelection, ConstructionOptions, Granularity};
    use crate::core::models::node::AttrValue;
    use crate::core::models::record::{AtomRecord, RecordKind, RecordTable};
    use crate::engine::assemble;
    use nalgebra::Point3;
    use std::sync::Arc;

    fn graph() -> StructureGraph {
        let table = RecordTable::from_records(vec![AtomRecord {
            chain_id: 'A',
            residue_name: "GLY".to_string(),
            residue_number: 1,
            insertion: String::new(),
            alt_loc: String::new(),
            atom_name: "CA".to_string(),
            element: "C".to_string(),
            position: Point3::new(0.0, 0.0, 0.0),
            b_factor: 0.0,
            kind: RecordKind::Standard,
        }]);
        assemble::assemble(
            table.clone(),
            table,
            &ConstructionOptions {
                granularity: Granularity::named("CA"),
                ..ConstructionOptions::default()
            },
            None,
            Some("1abc"),
            None,
            &ChainSelection::All,
        )
        .unwrap()
    }

    fn node_writer(key: &'static str, value: &'static str) -> NodeAnnotator {
        Arc::new(move |g: &mut StructureGraph| {
            for node in g.nodes_iter_mut() {
                node.attrs.insert(key.to_string(), value.into());
            }
        })
    }

    #[test]
    fn node_annotators_add_keyed_attributes() {
        let g = annotate_nodes(graph(), &[node_writer("ss", "H")]);
        assert_eq!(g.nodes()[0].text_attr("ss"), Some("H"));
    }

    #[test]
    fn last_writer_wins_on_key_collision() {
        let g = annotate_nodes(
            graph(),
            &[node_writer("ss", "H"), node_writer("ss", "E")],
        );
        assert_eq!(g.nodes()[0].text_attr("ss"), Some("E"));
    }

    #[test]
    fn earlier_attributes_survive_later_annotators() {
        let g = annotate_nodes(
            graph(),
            &[node_writer("ss", "H"), node_writer("exposure", "buried")],
        );
        assert_eq!(g.nodes()[0].text_attr("ss"), Some("H"));
        assert_eq!(g.nodes()[0].text_attr("exposure"), Some("buried"));
    }

    #[test]
    fn graph_annotators_write_graph_level_attributes() {
        let annotator: GraphAnnotator = Arc::new(|g: &mut StructureGraph| {
            let n = g.node_count() as i64;
            g.meta_mut()
                .attrs
                .insert("node_total".to_string(), AttrValue::Int(n));
        });
        let g = annotate_graph(graph(), &[annotator]);
        assert_eq!(
            g.meta().attrs.get("node_total"),
            Some(&AttrValue::Int(1))
        );
    }
}

use crate::core::geometry;
use crate::core::models::graph::{Granularity, StructureGraph};
use crate::engine::config::EdgeFn;
use tracing::debug;

/// Primes the graph's pairwise-distance cache.
///
/// At atomic granularity the matrix is computed over the full raw table,
/// otherwise over the reduced node table. The matrix is computed at most
/// once per graph: every edge function sees the same instance, so all of
/// them share one consistent geometry snapshot even if node attributes
/// are mutated later.
pub fn prime_distance_cache(graph: &mut StructureGraph) {
    if graph.meta().granularity() == &Granularity::Atom {
        if graph.meta().atomic_dist_matrix.is_none() {
            let matrix = geometry::table_distance_matrix(&graph.meta().raw_table);
            debug!(rows = matrix.nrows(), "computed full-atom distance matrix");
            graph.meta_mut().atomic_dist_matrix = Some(matrix);
        }
    } else if graph.meta().dist_matrix.is_none() {
        let matrix = geometry::table_distance_matrix(&graph.meta().processed_table);
        debug!(rows = matrix.nrows(), "computed node distance matrix");
        graph.meta_mut().dist_matrix = Some(matrix);
    }
}

/// Runs the edge-construction functions against a graph.
///
/// The distance cache is primed first, then each function is invoked in
/// list order. Functions mutate the edge set in place; adding an edge for
/// an existing pair merges into that pair's kind set. The node set is
/// frozen: functions must not add or remove nodes, and the graph refuses
/// edges whose endpoints it does not contain.
pub fn dispatch(mut graph: StructureGraph, funcs: &[EdgeFn]) -> StructureGraph {
    prime_distance_cache(&mut graph);
    for f in funcs {
        f(&mut graph);
    }
    debug!(edges = graph.edge_count(), "edge construction finished");
    graph
}

use crate::core::models::graph::{ConstructionOptions, Granularity, StructureGraph};
use crate::core::models::record::RecordTable;
use std::fmt;
use std::sync::Arc;

/// A pluggable edge-construction function.
///
/// Invoked with a graph whose distance cache has been primed; adds zero or
/// more edges with a kind label and must not alter the node set.
pub type EdgeFn = Arc<dyn Fn(&mut StructureGraph) + Send + Sync>;

/// A pluggable node-annotation function, run after assembly and before
/// edge construction.
pub type NodeAnnotator = Arc<dyn Fn(&mut StructureGraph) + Send + Sync>;

/// A pluggable graph-annotation function, run after edge construction.
pub type GraphAnnotator = Arc<dyn Fn(&mut StructureGraph) + Send + Sync>;

/// A pluggable edge-annotation function, run after edge construction.
pub type EdgeAnnotator = Arc<dyn Fn(&mut StructureGraph) + Send + Sync>;

/// A pluggable record-table processing function, applied to the standard
/// rows before the built-in reduction policies.
pub type TableFn = Arc<dyn Fn(RecordTable) -> RecordTable + Send + Sync>;

/// Complete configuration of the construction pipeline.
///
/// One configuration instance is shared read-only across every task of a
/// batch run; the function lists are reference-counted so cloning the
/// configuration is cheap.
#[derive(Clone, Default)]
pub struct GraphConfig {
    /// Reduction and granularity policies.
    pub construction: ConstructionOptions,
    /// Table-processing functions applied before reduction, in order.
    pub table_fns: Vec<TableFn>,
    /// Edge-construction functions, invoked in order.
    pub edge_fns: Vec<EdgeFn>,
    /// Node annotators, invoked in order before edge construction.
    pub node_annotators: Vec<NodeAnnotator>,
    /// Graph annotators, invoked in order after edge construction.
    pub graph_annotators: Vec<GraphAnnotator>,
    /// Edge annotators, invoked in order after graph annotators.
    pub edge_annotators: Vec<EdgeAnnotator>,
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("construction", &self.construction)
            .field("table_fns", &self.table_fns.len())
            .field("edge_fns", &self.edge_fns.len())
            .field("node_annotators", &self.node_annotators.len())
            .field("graph_annotators", &self.graph_annotators.len())
            .field("edge_annotators", &self.edge_annotators.len())
            .finish()
    }
}

impl GraphConfig {
    /// Starts building a configuration from the defaults (CA granularity,
    /// deprotonation on, insertions resolved, no heteroatoms kept).
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::default()
    }
}

/// Builder for [`GraphConfig`].
#[derive(Default)]
pub struct GraphConfigBuilder {
    config: GraphConfig,
}

impl GraphConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.config.construction.granularity = granularity;
        self
    }

    pub fn deprotonate(mut self, deprotonate: bool) -> Self {
        self.config.construction.deprotonate = deprotonate;
        self
    }

    pub fn keep_insertions(mut self, keep: bool) -> Self {
        self.config.construction.keep_insertions = keep;
        self
    }

    pub fn keep_hets(mut self, residue_names: Vec<String>) -> Self {
        self.config.construction.keep_hets = residue_names;
        self
    }

    pub fn with_table_fn(mut self, f: TableFn) -> Self {
        self.config.table_fns.push(f);
        self
    }

    pub fn with_edge_fn(mut self, f: EdgeFn) -> Self {
        self.config.edge_fns.push(f);
        self
    }

    pub fn with_node_annotator(mut self, f: NodeAnnotator) -> Self {
        self.config.node_annotators.push(f);
        self
    }

    pub fn with_graph_annotator(mut self, f: GraphAnnotator) -> Self {
        self.config.graph_annotators.push(f);
        self
    }

    pub fn with_edge_annotator(mut self, f: EdgeAnnotator) -> Self {
        self.config.edge_annotators.push(f);
        self
    }

    pub fn build(self) -> GraphConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_construction_defaults() {
        let config = GraphConfig::builder().build();
        assert_eq!(config.construction, ConstructionOptions::default());
        assert!(config.edge_fns.is_empty());
        assert!(config.node_annotators.is_empty());
    }

    #[test]
    fn builder_accumulates_function_lists_in_order() {
        let config = GraphConfig::builder()
            .granularity(Granularity::Atom)
            .deprotonate(false)
            .keep_hets(vec!["HOH".to_string()])
            .with_edge_fn(Arc::new(|_| {}))
            .with_edge_fn(Arc::new(|_| {}))
            .with_node_annotator(Arc::new(|_| {}))
            .build();

        assert_eq!(config.construction.granularity, Granularity::Atom);
        assert!(!config.construction.deprotonate);
        assert_eq!(config.construction.keep_hets, vec!["HOH".to_string()]);
        assert_eq!(config.edge_fns.len(), 2);
        assert_eq!(config.node_annotators.len(), 1);
    }

    #[test]
    fn debug_output_reports_function_counts_not_pointers() {
        let config = GraphConfig::builder().with_edge_fn(Arc::new(|_| {})).build();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("edge_fns: 1"));
    }
}

use super::collapse::{DerivedGraph, DerivedNode, MultiEdge};
use crate::core::models::graph::StructureGraph;
use crate::core::models::node::NodeId;
use crate::engine::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Label conventionally meaning "no structural assignment" for a node.
pub const UNASSIGNED_LABEL: &str = "-";

/// Default node attribute the segment label is read from.
pub const DEFAULT_LABEL_KEY: &str = "ss";

/// Identity of a maximal run of equally-labelled consecutive nodes.
///
/// The index is the 1-based occurrence counter of the label among runs:
/// the second helix of a structure is `H2` no matter how many strands
/// separate it from `H1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId {
    /// The raw per-node label shared by the run.
    pub label: String,
    /// 1-based occurrence of the label among all runs.
    pub index: u32,
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label, self.index)
    }
}

/// A segment-level node: one maximal run of consecutive same-label nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentNode {
    pub id: SegmentId,
    /// The raw label of the run.
    pub label: String,
    /// Number of constituent source nodes.
    pub residue_count: usize,
    /// Constituent source nodes in their original order.
    pub members: Vec<NodeId>,
}

impl DerivedNode for SegmentNode {
    type Key = SegmentId;

    fn key(&self) -> Self::Key {
        self.id.clone()
    }
}

/// A segment-level graph in multigraph form.
pub type SegmentGraph = DerivedGraph<SegmentNode>;

/// Options for segment-graph derivation.
#[derive(Debug, Clone)]
pub struct SegmentGraphOptions {
    /// Node attribute holding the per-node label.
    pub label_key: String,
    /// Keep only runs whose raw label is listed, when set.
    pub allowed_labels: Option<Vec<String>>,
    /// Drop nodes labelled [`UNASSIGNED_LABEL`].
    pub drop_unassigned: bool,
    /// Drop intra-segment contacts.
    pub remove_self_loops: bool,
}

impl Default for SegmentGraphOptions {
    fn default() -> Self {
        Self {
            label_key: DEFAULT_LABEL_KEY.to_string(),
            allowed_labels: None,
            drop_unassigned: true,
            remove_self_loops: false,
        }
    }
}

/// Numbers maximal runs of equal consecutive labels.
///
/// Each position receives its label plus a 1-based counter that
/// increments whenever the label differs from the immediately preceding
/// one and stays constant inside a run:
/// `A,A,B,A,A,A,B,B` becomes `A1,A1,B1,A2,A2,A2,B2,B2`.
///
/// This is the canonical grouping law of segment derivation; every
/// consumer of segment identities relies on exactly this sequence.
pub fn number_label_runs(labels: &[String]) -> Vec<SegmentId> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());
    let mut previous: Option<&str> = None;

    for label in labels {
        if previous != Some(label.as_str()) {
            *counts.entry(label.as_str()).or_insert(0) += 1;
        }
        out.push(SegmentId {
            label: label.clone(),
            index: counts[label.as_str()],
        });
        previous = Some(label.as_str());
    }
    out
}

/// Derives the segment-level graph of a structure graph.
///
/// Source nodes are walked in the order they were added to the graph;
/// each must carry the label attribute. Runs of equal labels become
/// segment nodes (after the optional unassigned-label and allow-list
/// filters, both applied on the raw label), and every source edge whose
/// endpoints both survive becomes a parallel edge between their segments,
/// tagged with the source node pair. Edges losing an endpoint to
/// filtering are logged and dropped, never raised.
///
/// # Errors
///
/// Returns [`GraphError::UnlabelledNode`] if any source node lacks the
/// label attribute; derivation cannot proceed on partially-labelled
/// input.
pub fn segment_graph(
    source: &StructureGraph,
    options: &SegmentGraphOptions,
) -> Result<SegmentGraph, GraphError> {
    // 1. Every node must be labelled before any segmentation happens.
    let mut labels: Vec<String> = Vec::with_capacity(source.node_count());
    for node in source.nodes() {
        let label = node
            .text_attr(&options.label_key)
            .ok_or_else(|| GraphError::UnlabelledNode {
                node_id: node.id.to_string(),
                key: options.label_key.clone(),
            })?;
        labels.push(label.to_string());
    }

    // 2. Canonical run-length numbering over the full label sequence;
    // filtering happens afterwards so segment indices stay stable.
    let segment_ids = number_label_runs(&labels);

    let keep = |id: &SegmentId| -> bool {
        if options.drop_unassigned && id.label == UNASSIGNED_LABEL {
            return false;
        }
        match &options.allowed_labels {
            Some(allowed) => allowed.contains(&id.label),
            None => true,
        }
    };

    // 3. Segment nodes in first-appearance order, with membership.
    let mut graph = SegmentGraph::new(source.meta_handle(), "segment");
    let mut assignment: HashMap<NodeId, SegmentId> = HashMap::new();
    for (node, segment_id) in source.nodes().iter().zip(&segment_ids) {
        if !keep(segment_id) {
            continue;
        }
        assignment.insert(node.id.clone(), segment_id.clone());
        if !graph.contains_node(segment_id) {
            graph.add_node(SegmentNode {
                id: segment_id.clone(),
                label: segment_id.label.clone(),
                residue_count: 0,
                members: Vec::new(),
            });
        }
        let segment = graph.node_mut(segment_id).unwrap();
        segment.residue_count += 1;
        segment.members.push(node.id.clone());
    }

    // 4. Lift surviving edges onto segments, with provenance.
    let mut dropped = 0usize;
    for edge in source.edges() {
        match (assignment.get(edge.u()), assignment.get(edge.v())) {
            (Some(su), Some(sv)) => {
                graph.add_edge(MultiEdge::new(
                    su.clone(),
                    sv.clone(),
                    edge.kinds.clone(),
                    Some((edge.u().clone(), edge.v().clone())),
                ));
            }
            _ => {
                dropped += 1;
                debug!(u = %edge.u(), v = %edge.v(), "edge endpoint filtered out; edge dropped");
            }
        }
    }
    if dropped > 0 {
        debug!(dropped, "edges dropped during segment derivation");
    }

    if options.remove_self_loops {
        graph.remove_self_loops();
    }

    debug!(
        segments = graph.node_count(),
        contacts = graph.edge_count(),
        "derived segment graph"
    );
    Ok(graph)
}

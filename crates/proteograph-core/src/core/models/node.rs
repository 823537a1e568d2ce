use super::graph::Granularity;
use super::record::AtomRecord;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Composite identity of a graph node.
///
/// The key is `chain:residue_name:residue_number`, suffixed with the atom
/// name when the graph is built at atomic granularity. Node identifiers are
/// unique within a graph: two records that normalize to the same `NodeId`
/// are insertion or alternate-location duplicates and must be resolved to a
/// single row before node creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub chain_id: char,
    pub residue_name: String,
    pub residue_number: isize,
    /// Present only at atomic granularity.
    pub atom_name: Option<String>,
}

impl NodeId {
    /// Builds the identifier for a reduced record row.
    ///
    /// The atom-name suffix is appended exactly when the graph is being
    /// built at atomic granularity; at residue-level granularities one row
    /// represents the whole residue.
    pub fn for_record(record: &AtomRecord, granularity: &Granularity) -> Self {
        Self {
            chain_id: record.chain_id,
            residue_name: record.residue_name.clone(),
            residue_number: record.residue_number,
            atom_name: match granularity {
                Granularity::Atom => Some(record.atom_name.clone()),
                _ => None,
            },
        }
    }

    /// Returns the residue part of the identifier (chain, name, number),
    /// which is shared by all atoms of one residue at atomic granularity.
    pub fn residue_key(&self) -> (char, &str, isize) {
        (self.chain_id, self.residue_name.as_str(), self.residue_number)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.chain_id, self.residue_name, self.residue_number
        )?;
        if let Some(atom) = &self.atom_name {
            write!(f, ":{}", atom)?;
        }
        Ok(())
    }
}

/// A single annotation value attached to a node, edge, or graph.
///
/// Annotation functions write keyed values; a closed value enumeration
/// keeps attributes inspectable without downcasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Returns the text payload, if this value is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload widened to `f64`, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

/// Keyed annotation storage shared by nodes, edges, and graph metadata.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A graph node with its intrinsic structural attributes.
///
/// Intrinsic fields are populated once at assembly from the reduced record
/// row; `attrs` collects whatever the annotation pipeline adds afterwards.
/// Nodes are owned exclusively by their graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub chain_id: char,
    pub residue_name: String,
    pub residue_number: isize,
    /// Atom name of the underlying row ("CA" for named-atom graphs, the
    /// first atom of the residue for centroid graphs).
    pub atom_name: String,
    pub element: String,
    pub position: Point3<f64>,
    pub b_factor: f64,
    /// Annotation attributes; later writes to a key overwrite earlier ones.
    pub attrs: AttrMap,
}

impl Node {
    /// Creates a node from a reduced record row.
    pub fn from_record(record: &AtomRecord, granularity: &Granularity) -> Self {
        Self {
            id: NodeId::for_record(record, granularity),
            chain_id: record.chain_id,
            residue_name: record.residue_name.clone(),
            residue_number: record.residue_number,
            atom_name: record.atom_name.clone(),
            element: record.element.clone(),
            position: record.position,
            b_factor: record.b_factor,
            attrs: AttrMap::new(),
        }
    }

    /// Reads a textual annotation attribute.
    pub fn text_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_text)
    }
}

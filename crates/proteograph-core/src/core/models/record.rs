use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Classifies the source record an atom row originated from.
///
/// Structure files distinguish polymer atoms from heteroatoms (ligands,
/// ions, water). The distinction survives reduction so that downstream
/// stages can tell retained heteroatoms apart from polymer atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecordKind {
    /// A standard polymer atom record.
    #[default]
    Standard,
    /// A heteroatom record (ligand, ion, solvent).
    Hetero,
}

impl FromStr for RecordKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ATOM" | "STANDARD" => Ok(RecordKind::Standard),
            "HETATM" | "HETERO" => Ok(RecordKind::Hetero),
            _ => Err(()),
        }
    }
}

/// A single atomic coordinate record as supplied by the record source.
///
/// Records are immutable once read: every pipeline stage that changes the
/// row set produces a new [`RecordTable`] rather than editing rows in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
    /// Single-character chain identifier (e.g. 'A').
    pub chain_id: char,
    /// Three-letter residue name (e.g. "ALA", "HOH").
    pub residue_name: String,
    /// Residue sequence number from the source file.
    pub residue_number: isize,
    /// Insertion code; empty for the vast majority of rows.
    pub insertion: String,
    /// Alternate-location code; empty when the atom has a single location.
    pub alt_loc: String,
    /// Atom name within the residue (e.g. "CA", "OG1").
    pub atom_name: String,
    /// Element symbol (e.g. "C", "N"); may be blank in sloppy files.
    pub element: String,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    /// Crystallographic temperature factor.
    pub b_factor: f64,
    /// Whether the row came from a standard or heteroatom record.
    pub kind: RecordKind,
}

impl AtomRecord {
    /// Returns `true` if this row denotes a proton (hydrogen or deuterium).
    ///
    /// The element symbol is authoritative when present; otherwise the
    /// leading character of the atom name decides, as in files that omit
    /// element columns.
    pub fn is_proton(&self) -> bool {
        let probe = if self.element.trim().is_empty() {
            self.atom_name.trim()
        } else {
            self.element.trim()
        };
        matches!(
            probe.chars().next().map(|c| c.to_ascii_uppercase()),
            Some('H') | Some('D')
        )
    }
}

/// An ordered table of atomic records.
///
/// This is the leaf data structure of the construction pipeline: a plain
/// row container with accessors and no structural logic. Row order is
/// significant everywhere downstream (node identity resolution keeps the
/// first of duplicate rows, sequences concatenate in table order), so the
/// table never reorders its contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    records: Vec<AtomRecord>,
}

impl RecordTable {
    /// Creates a new, empty record table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from an already-ordered list of records.
    pub fn from_records(records: Vec<AtomRecord>) -> Self {
        Self { records }
    }

    /// Returns the number of rows in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the row at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&AtomRecord> {
        self.records.get(index)
    }

    /// Returns all rows in table order.
    pub fn records(&self) -> &[AtomRecord] {
        &self.records
    }

    /// Returns an iterator over the rows in table order.
    pub fn iter(&self) -> impl Iterator<Item = &AtomRecord> {
        self.records.iter()
    }

    /// Appends a row to the end of the table.
    pub fn push(&mut self, record: AtomRecord) {
        self.records.push(record);
    }

    /// Appends all rows of `other`, preserving both tables' orders.
    pub fn extend_from(&mut self, other: RecordTable) {
        self.records.extend(other.records);
    }

    /// Returns the distinct chain identifiers in first-appearance order.
    pub fn chain_ids(&self) -> Vec<char> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.chain_id) {
                seen.push(record.chain_id);
            }
        }
        seen
    }

    /// Returns the coordinates of all rows in table order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.records.iter().map(|r| r.position).collect()
    }
}

impl IntoIterator for RecordTable {
    type Item = AtomRecord;
    type IntoIter = std::vec::IntoIter<AtomRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

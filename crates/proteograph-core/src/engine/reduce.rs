use crate::core::geometry;
use crate::core::models::graph::{ChainSelection, Granularity};
use crate::core::models::record::{RecordKind, RecordTable};
use crate::engine::config::GraphConfig;
use crate::engine::error::GraphError;
use nalgebra::Point3;
use std::collections::HashMap;
use std::collections::HashSet;
use tracing::debug;

/// Removes proton rows from a record table.
pub fn deprotonate(table: RecordTable) -> RecordTable {
    debug!("deprotonating structure; removing H/D rows");
    RecordTable::from_records(table.into_iter().filter(|r| !r.is_proton()).collect())
}

/// Keeps only rows whose atom name matches the granularity token.
pub fn restrict_to_atom(table: RecordTable, token: &str) -> RecordTable {
    RecordTable::from_records(
        table
            .into_iter()
            .filter(|r| r.atom_name.trim() == token)
            .collect(),
    )
}

/// Collapses each residue to a single synthetic row.
///
/// Residues are grouped by (chain, residue number, insertion code) in
/// first-appearance order. The synthetic row takes its coordinate from the
/// arithmetic mean of the residue's atom coordinates and every other field
/// from the residue's first row.
pub fn to_centroids(table: RecordTable) -> RecordTable {
    type ResidueKey = (char, isize, String);

    let mut order: Vec<ResidueKey> = Vec::new();
    let mut groups: HashMap<ResidueKey, (usize, Vec<Point3<f64>>)> = HashMap::new();

    let records: Vec<_> = table.into_iter().collect();
    for (index, record) in records.iter().enumerate() {
        let key = (
            record.chain_id,
            record.residue_number,
            record.insertion.clone(),
        );
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                (index, Vec::new())
            })
            .1
            .push(record.position);
    }

    debug!(residues = order.len(), "collapsed atoms to residue centroids");

    let mut out = RecordTable::new();
    for key in order {
        let (first_index, positions) = &groups[&key];
        let mut row = records[*first_index].clone();
        row.position = geometry::centroid(positions);
        out.push(row);
    }
    out
}

/// Resolves insertion and alternate-location duplicates to one row each.
///
/// Three passes in a fixed order: keep the first of rows sharing
/// (chain, residue number, atom name); drop rows with a non-empty
/// insertion code; keep only alternate-location codes that are empty or
/// `"A"`.
pub fn resolve_insertions(table: RecordTable) -> RecordTable {
    let mut seen: HashSet<(char, isize, String)> = HashSet::new();
    let deduped: Vec<_> = table
        .into_iter()
        .filter(|r| seen.insert((r.chain_id, r.residue_number, r.atom_name.clone())))
        .collect();

    RecordTable::from_records(
        deduped
            .into_iter()
            .filter(|r| r.insertion.is_empty())
            .filter(|r| r.alt_loc.is_empty() || r.alt_loc == "A")
            .collect(),
    )
}

/// Extracts the heteroatom rows whose residue name is in `keep`,
/// concatenated in the order the names are listed.
pub fn filter_heteroatoms(table: &RecordTable, keep: &[String]) -> RecordTable {
    let mut out = RecordTable::new();
    for name in keep {
        for record in table.iter() {
            if record.kind == RecordKind::Hetero && &record.residue_name == name {
                out.push(record.clone());
            }
        }
    }
    out
}

/// Restricts a table to the chains accepted by the selection.
pub fn select_chains(table: RecordTable, selection: &ChainSelection) -> RecordTable {
    match selection {
        ChainSelection::All => table,
        ChainSelection::Chains(_) => RecordTable::from_records(
            table
                .into_iter()
                .filter(|r| selection.accepts(r.chain_id))
                .collect(),
        ),
    }
}

/// Reduces a raw record table to one row per intended graph node.
///
/// Applies, in order: caller-supplied table-processing functions, then
/// deprotonation, granularity selection, heteroatom retention,
/// insertion/alternate-location resolution, and chain selection, each
/// gated by the construction options.
///
/// # Arguments
///
/// * `raw` - The unreduced table as supplied by the record source.
/// * `config` - Pipeline configuration carrying the cleanup policies.
/// * `chains` - Chain selection for this structure.
///
/// # Errors
///
/// Returns [`GraphError::GranularityUnmatched`] when a named-atom
/// granularity token matches no rows; an empty table at that point can
/// only mean a misspelt token or the wrong structure.
pub fn reduce(
    raw: &RecordTable,
    config: &GraphConfig,
    chains: &ChainSelection,
) -> Result<RecordTable, GraphError> {
    let options = &config.construction;

    let mut standard = RecordTable::new();
    let mut hetero = RecordTable::new();
    for record in raw.iter() {
        match record.kind {
            RecordKind::Standard => standard.push(record.clone()),
            RecordKind::Hetero => hetero.push(record.clone()),
        }
    }

    for f in &config.table_fns {
        standard = f(standard);
    }

    if options.deprotonate {
        standard = deprotonate(standard);
    }

    let mut reduced = match &options.granularity {
        Granularity::Atom => standard,
        Granularity::Centroid => to_centroids(standard),
        Granularity::NamedAtom(token) => {
            let restricted = restrict_to_atom(standard, token);
            if restricted.is_empty() {
                return Err(GraphError::GranularityUnmatched {
                    token: token.clone(),
                });
            }
            restricted
        }
    };

    if !options.keep_hets.is_empty() {
        reduced.extend_from(filter_heteroatoms(&hetero, &options.keep_hets));
    }

    if !options.keep_insertions {
        reduced = resolve_insertions(reduced);
    }

    reduced = select_chains(reduced, chains);

    debug!(rows = reduced.len(), "reduced record table to node rows");
    Ok(reduced)
}

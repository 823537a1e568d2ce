use crate::core::models::graph::StructureGraph;
use crate::core::models::record::RecordTable;
use std::error::Error;
use std::path::{Path, PathBuf};

/// Defines the interface to the record-fetching collaborator.
///
/// Implementors turn a remote accession or a local structure file into an
/// ordered [`RecordTable`]; parsing and transport are entirely their
/// concern. The construction pipeline only requires that rows arrive in
/// file order, since node identity resolution and sequence assembly both
/// depend on it.
///
/// Sources used by the batch executor are shared across worker threads and
/// must therefore be `Sync`.
pub trait RecordSource {
    /// The error type for fetch and load failures.
    type Error: Error + Send + Sync + 'static;

    /// Fetches the atomic records of a remotely identified structure.
    ///
    /// # Arguments
    ///
    /// * `accession` - The structure's database accession code.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval or parsing fails.
    fn fetch(&self, accession: &str) -> Result<RecordTable, Self::Error>;

    /// Reads the atomic records of a local structure file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the structure file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    fn load(&self, path: &Path) -> Result<RecordTable, Self::Error>;
}

/// Defines the interface to the graph-persistence collaborator.
///
/// The on-disk layout is owned by the implementor; the pipeline only
/// guarantees that [`GraphMeta::name`](crate::core::models::graph::GraphMeta)
/// is a stable, filesystem-safe stem for the output file.
pub trait GraphSink {
    /// The error type for write failures.
    type Error: Error + Send + Sync + 'static;

    /// Persists a finished graph under `dir`, returning the path written.
    ///
    /// # Arguments
    ///
    /// * `graph` - The graph to persist.
    /// * `dir` - Directory to place the output in.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails. Batch
    /// persistence treats failures as per-item and non-fatal.
    fn write(&self, graph: &StructureGraph, dir: &Path) -> Result<PathBuf, Self::Error>;
}

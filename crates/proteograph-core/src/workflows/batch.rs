use crate::core::io::traits::{GraphSink, RecordSource};
use crate::core::models::graph::{ChainSelection, StructureGraph};
use crate::engine::config::GraphConfig;
use crate::engine::error::GraphError;
use crate::workflows::construct::construct_graph;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// The inputs of one batch run: remote accessions or local paths,
/// mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSources {
    /// Structures fetched by database accession.
    Accessions(Vec<String>),
    /// Structures read from local files.
    Paths(Vec<PathBuf>),
}

impl BatchSources {
    pub fn len(&self) -> usize {
        match self {
            BatchSources::Accessions(items) => items.len(),
            BatchSources::Paths(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The display key of input `index`, used for logging and for the
    /// keyed result mapping.
    pub fn key(&self, index: usize) -> String {
        match self {
            BatchSources::Accessions(items) => items[index].clone(),
            BatchSources::Paths(items) => items[index].display().to_string(),
        }
    }
}

/// Constructs graphs for many inputs in parallel, preserving input order.
///
/// One construction task runs per input on a worker pool of the requested
/// size (`0` lets the pool pick one worker per core). Tasks share nothing
/// but the read-only configuration; each graph and its caches belong to
/// exactly one task. A task that fails for any reason is logged with its
/// input key and yields `None` at that input's position, never aborting
/// its siblings or the batch.
///
/// # Arguments
///
/// * `source` - The record-fetching collaborator, shared across workers.
/// * `config` - Pipeline configuration shared read-only by every task.
/// * `inputs` - Accessions or paths to construct graphs for.
/// * `chain_selections` - Optional per-input chain selections, parallel to
///   `inputs`; every chain is kept where absent.
/// * `workers` - Worker-pool size.
///
/// # Errors
///
/// Only malformed batch-level arguments raise: [`GraphError::EmptyBatch`]
/// when no inputs are supplied,
/// [`GraphError::ChainSelectionMismatch`] when the selection list length
/// disagrees with the input count, and [`GraphError::ThreadPool`] when
/// the worker pool cannot be built. Individual construction failures
/// never do.
pub fn construct_many<S>(
    source: &S,
    config: &GraphConfig,
    inputs: &BatchSources,
    chain_selections: Option<&[ChainSelection]>,
    workers: usize,
) -> Result<Vec<Option<StructureGraph>>, GraphError>
where
    S: RecordSource + Sync,
{
    if inputs.is_empty() {
        return Err(GraphError::EmptyBatch);
    }
    if let Some(selections) = chain_selections {
        if selections.len() != inputs.len() {
            return Err(GraphError::ChainSelectionMismatch {
                inputs: inputs.len(),
                selections: selections.len(),
            });
        }
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;

    info!(inputs = inputs.len(), workers, "starting batch construction");

    let results: Vec<Option<StructureGraph>> = pool.install(|| {
        (0..inputs.len())
            .into_par_iter()
            .map(|index| {
                let chains = match chain_selections {
                    Some(selections) => selections[index].clone(),
                    None => ChainSelection::All,
                };
                let outcome = match inputs {
                    BatchSources::Accessions(items) => construct_graph(
                        source,
                        config,
                        None,
                        Some(&items[index]),
                        None,
                        &chains,
                    ),
                    BatchSources::Paths(items) => construct_graph(
                        source,
                        config,
                        None,
                        None,
                        Some(&items[index]),
                        &chains,
                    ),
                };
                match outcome {
                    Ok(graph) => Some(graph),
                    Err(e) => {
                        error!(
                            input = %inputs.key(index),
                            error = %e,
                            "graph construction failed; recording null result"
                        );
                        None
                    }
                }
            })
            .collect()
    });

    let built = results.iter().filter(|r| r.is_some()).count();
    info!(
        built,
        failed = results.len() - built,
        "batch construction finished"
    );
    Ok(results)
}

/// Like [`construct_many`] but keyed by the input identifier.
///
/// Inputs must be unique: a repeated accession or path overwrites the
/// earlier entry in the returned mapping.
pub fn construct_many_keyed<S>(
    source: &S,
    config: &GraphConfig,
    inputs: &BatchSources,
    chain_selections: Option<&[ChainSelection]>,
    workers: usize,
) -> Result<HashMap<String, Option<StructureGraph>>, GraphError>
where
    S: RecordSource + Sync,
{
    let results = construct_many(source, config, inputs, chain_selections, workers)?;
    Ok(results
        .into_iter()
        .enumerate()
        .map(|(index, graph)| (inputs.key(index), graph))
        .collect())
}

/// Persists every successfully built graph of a batch, best-effort.
///
/// Runs after collection as a per-item side effect: a write failure is
/// logged and skipped, leaving the other items untouched. Returns the
/// number of graphs written.
pub fn persist_results<K>(results: &[Option<StructureGraph>], sink: &K, dir: &Path) -> usize
where
    K: GraphSink,
{
    let mut written = 0usize;
    for graph in results.iter().flatten() {
        match sink.write(graph, dir) {
            Ok(path) => {
                debug!(name = %graph.meta().name, path = %path.display(), "persisted graph");
                written += 1;
            }
            Err(e) => {
                error!(
                    name = %graph.meta().name,
                    error = %e,
                    "failed to persist graph; continuing"
                );
            }
        }
    }
    written
}

use thiserror::Error;

/// Errors surfaced by graph construction and derivation.
///
/// Configuration mistakes (wrong arguments, unsatisfiable preconditions)
/// surface synchronously from the violating call. Inside the batch
/// executor, any of these raised for a single input is caught at the task
/// boundary and replaced by a null result; only batch-level argument
/// errors escape the batch API itself.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("exactly one of a structure accession or a file path must be provided")]
    SourceSpecification,

    #[error("granularity '{token}' matched no atom records")]
    GranularityUnmatched { token: String },

    #[error("node '{node_id}' is missing the '{key}' label required for segment derivation")]
    UnlabelledNode { node_id: String, key: String },

    #[error("batch construction requires at least one input")]
    EmptyBatch,

    #[error("{selections} chain selections were supplied for {inputs} batch inputs")]
    ChainSelectionMismatch { inputs: usize, selections: usize },

    #[error("failed to build batch worker pool: {source}")]
    ThreadPool {
        #[from]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("record source failed: {source}")]
    Fetch {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl GraphError {
    /// Wraps a record-source failure.
    pub fn fetch(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        GraphError::Fetch {
            source: Box::new(source),
        }
    }
}

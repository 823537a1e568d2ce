//! # Engine Module
//!
//! The construction pipeline for multi-resolution structure graphs.
//!
//! ## Overview
//!
//! The engine turns an ordered record table into an attributed graph and
//! derives coarser graphs from it. Data flows strictly through the
//! stages: reduction ([`reduce`]) produces one row per node, assembly
//! ([`assemble`]) builds the node set and graph metadata, edge dispatch
//! ([`edges`]) primes the shared distance cache and runs the pluggable
//! edge-construction functions, and annotation ([`annotate`]) layers
//! keyed attributes on nodes, edges, and the graph itself.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Construction policies and the
//!   ordered pluggable function lists
//! - **Reduction** ([`reduce`]) - Granularity selection and cleanup of
//!   raw record tables
//! - **Assembly** ([`assemble`]) - Node identity assignment and metadata
//!   population
//! - **Edge dispatch** ([`edges`]) - Distance-cache priming and edge
//!   function invocation
//! - **Annotation** ([`annotate`]) - Ordered node/graph/edge metadata
//!   functions
//! - **Derivation** ([`derive`]) - Chain and segment graphs, multigraph
//!   collapse
//! - **Error handling** ([`error`]) - The construction error taxonomy
//!
//! Each stage takes ownership of the graph, applies its transformation,
//! and returns it; no graph instance is ever shared between concurrently
//! running constructions.

pub mod annotate;
pub mod assemble;
pub mod config;
pub mod derive;
pub mod edges;
pub mod error;
pub mod reduce;

//! Derivation of coarser graphs from a structure graph.
//!
//! A finer graph is regrouped into chain-level or segment-level nodes and
//! its edges are lifted onto the groups, producing a multigraph that may
//! hold several parallel edges per node pair. [`collapse`] turns such a
//! multigraph into a weighted simple graph with per-kind contact counts.
//!
//! Derived graphs are new objects: they share metadata with their source
//! by handle and never mutate it.

pub mod chain;
pub mod collapse;
pub mod segment;

//! # Proteograph Core Library
//!
//! A high-performance library for constructing attributed, multi-resolution
//! graphs from molecular structure records.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`RecordTable`, `StructureGraph`), chemistry constant tables, geometry
//!   utilities, and the trait boundary to the I/O collaborators.
//!
//! - **[`engine`]: The Logic Core.** The construction pipeline itself:
//!   granularity reduction, graph assembly, edge dispatch against a shared
//!   distance cache, the annotation pipeline, and derivation of coarser
//!   chain- and segment-level graphs.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It ties the engine stages into complete procedures: single-structure
//!   construction and fault-isolated parallel batch construction.

pub mod core;
pub mod engine;
pub mod workflows;

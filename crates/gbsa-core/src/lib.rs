//! # GBSA Prep Core Library
//!
//! Prepares binding free-energy (MM/GBSA and QM/MM-GBSA) calculations from a finished
//! molecular dynamics simulation: it derives reduced topologies and a re-imaged trajectory
//! with an external analysis tool, writes the solver control file and a batch script, and
//! optionally submits the job to a batch queue.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three layers throughout:
//!
//! - **[`core`]: The Foundation.** Stateless models (`RunConfig`, `ResidueMask`), the
//!   validator for run configuration documents, path resolution, and the text generators
//!   for every artifact the pipeline writes.
//!
//! - **[`engine`]: The Plumbing.** Error taxonomy, deployment settings, progress reporting,
//!   pipeline stages, and the `ToolRunner` seam through which every external process is
//!   started.
//!
//! - **[`workflows`]: The Public API.** The `prepare` workflow ties `core` and `engine`
//!   together into the strictly sequential preparation pipeline.

pub mod core;
pub mod engine;
pub mod workflows;

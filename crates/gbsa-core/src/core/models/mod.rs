//! # Core Models Module
//!
//! - [`config`] - The run configuration document, its validator and the immutable `RunConfig`
//! - [`mask`] - Residue masks and the solver-side mask derivation modes

pub mod config;
pub mod mask;

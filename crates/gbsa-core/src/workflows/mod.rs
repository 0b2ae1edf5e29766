//! # Workflows Module
//!
//! High-level entry points of the library.
//!
//! - **Preparation Workflow** ([`prepare`]) - Validate, resolve inputs, derive topologies and
//!   trajectory, write solver input and job script, then submit or stop.

pub mod prepare;

//! # Core Module
//!
//! Stateless building blocks of the preparation pipeline.
//!
//! - **Run configuration** ([`models`]) - The validated run description and residue masks
//! - **Input discovery** ([`resolve`]) - Simulation directory, source topology and trajectory
//! - **Output locations** ([`layout`]) - Fixed names inside the work and solver directories
//! - **Artifact writers** ([`io`]) - Analysis-tool scripts, solver control file, batch script
//!
//! Nothing here starts a process; the writers only produce text and files.

pub mod io;
pub mod layout;
pub mod models;
pub mod resolve;

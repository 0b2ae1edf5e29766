//! Writers for the text artifacts the pipeline generates.
//!
//! Each artifact implements [`traits::ScriptFile`], which separates rendering the text
//! from creating the file and applying permissions.

pub mod cpptraj;
pub mod mmpbsa;
pub mod slurm;
pub mod traits;

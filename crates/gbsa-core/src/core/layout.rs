//! Names and locations of everything generated inside a work directory.

use crate::core::models::config::TheoryLevel;
use std::path::{Path, PathBuf};

pub const WORK_DIR_SUFFIX: &str = "_gbsa";

pub const COMPLEX_TOPOLOGY: &str = "complex.prmtop";
pub const RECEPTOR_TOPOLOGY: &str = "receptor.prmtop";
pub const LIGAND_TOPOLOGY: &str = "ligand.prmtop";
pub const STRIPPED_TRAJECTORY: &str = "md.nc";

pub const COMPLEX_SCRIPT: &str = "complex_prmtop.in";
pub const RECEPTOR_SCRIPT: &str = "receptor_prmtop.in";
pub const LIGAND_SCRIPT: &str = "ligand_prmtop.in";
pub const TRAJECTORY_SCRIPT: &str = "strip_traj.in";

pub const JOB_SCRIPT: &str = "submit.job";
pub const SOLVER_LOG: &str = "progress.log";

/// Which reduced topology a derivation step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyRole {
    Complex,
    Receptor,
    Ligand,
}

impl TopologyRole {
    pub fn script_name(self) -> &'static str {
        match self {
            TopologyRole::Complex => COMPLEX_SCRIPT,
            TopologyRole::Receptor => RECEPTOR_SCRIPT,
            TopologyRole::Ligand => LIGAND_SCRIPT,
        }
    }

    pub fn output_name(self) -> &'static str {
        match self {
            TopologyRole::Complex => COMPLEX_TOPOLOGY,
            TopologyRole::Receptor => RECEPTOR_TOPOLOGY,
            TopologyRole::Ligand => LIGAND_TOPOLOGY,
        }
    }
}

/// The work directory (`<simulation>_gbsa`) and the solver directory nested in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLayout {
    pub prefix: String,
    pub work_dir: PathBuf,
    pub solver_dir: PathBuf,
    pub solver_input_name: String,
}

impl WorkLayout {
    pub fn new(output_root: &Path, simulation_name: &str, theory: &TheoryLevel) -> Self {
        let prefix = format!("{}{}", simulation_name, WORK_DIR_SUFFIX);
        let work_dir = output_root.join(&prefix);
        let solver_dir = work_dir.join(theory.solver_dir_name());
        Self {
            prefix,
            work_dir,
            solver_dir,
            solver_input_name: theory.solver_input_name(),
        }
    }

    pub fn work_file(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    pub fn solver_input_path(&self) -> PathBuf {
        self.solver_dir.join(&self.solver_input_name)
    }

    pub fn job_script_path(&self) -> PathBuf {
        self.solver_dir.join(JOB_SCRIPT)
    }
}

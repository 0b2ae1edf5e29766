use crate::core::io::traits::ScriptFile;
use crate::core::layout::{
    COMPLEX_TOPOLOGY, LIGAND_TOPOLOGY, RECEPTOR_TOPOLOGY, SOLVER_LOG, STRIPPED_TRAJECTORY,
};
use crate::core::models::config::RunConfig;
use crate::core::models::mask::{MaskMode, ResidueMask};
use crate::engine::config::BatchSettings;
use std::io::{self, Write};

/// How the solver obtains receptor and ligand topologies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyArgs<'a> {
    /// Receptor and ligand topologies were derived ahead of time.
    Explicit,
    /// The solver splits the complex itself by stripping `mask`.
    SingleComplex {
        mode: MaskMode,
        mask: &'a ResidueMask,
    },
}

/// Batch-queue submission script that runs the solver from inside the solver
/// directory, reading inputs from the work directory one level up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobScript<'a> {
    pub job_name: &'a str,
    pub solver_input: &'a str,
    pub batch: &'a BatchSettings,
    pub topology: TopologyArgs<'a>,
}

impl<'a> JobScript<'a> {
    pub fn new(
        job_name: &'a str,
        solver_input: &'a str,
        batch: &'a BatchSettings,
        config: &'a RunConfig,
    ) -> Self {
        let topology = match config.solver_split() {
            Some((mode, mask)) => TopologyArgs::SingleComplex { mode, mask },
            None => TopologyArgs::Explicit,
        };
        Self {
            job_name,
            solver_input,
            batch,
            topology,
        }
    }

    fn solver_display_name(&self) -> &str {
        self.batch
            .solver
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.batch.solver)
    }
}

impl ScriptFile for JobScript<'_> {
    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        let batch = self.batch;

        writeln!(writer, "#!/bin/bash")?;
        writeln!(writer, "#SBATCH --nodes={}", batch.nodes)?;
        writeln!(writer, "#SBATCH --job-name={}", self.job_name)?;
        writeln!(writer, "#SBATCH --partition={}", batch.partition)?;
        writeln!(writer, "#SBATCH --ntasks={}", batch.processes)?;
        if let Some(memory) = batch.memory.as_deref().filter(|m| !m.is_empty()) {
            writeln!(writer, "#SBATCH --mem={}", memory)?;
        }
        if let Some(time) = batch.time.as_deref().filter(|t| !t.is_empty()) {
            writeln!(writer, "#SBATCH --time={}", time)?;
        }
        if let Some(account) = batch.account.as_deref().filter(|a| !a.is_empty()) {
            writeln!(writer, "#SBATCH --account={}", account)?;
        }
        writeln!(writer)?;
        writeln!(writer, "set -euo pipefail")?;
        writeln!(writer)?;

        if let Some(env) = &batch.environment_script {
            writeln!(writer, "source {}", shell_quote(&env.display().to_string()))?;
            writeln!(writer)?;
        }

        writeln!(
            writer,
            "echo \"[$(date)] Running {}...\"",
            self.solver_display_name()
        )?;
        writeln!(
            writer,
            "mpirun -np {} \"{}\" -O \\",
            batch.processes, batch.solver
        )?;
        writeln!(writer, "  -i ./{} \\", self.solver_input)?;
        writeln!(writer, "  -cp ../{} \\", COMPLEX_TOPOLOGY)?;
        match &self.topology {
            TopologyArgs::Explicit => {
                writeln!(writer, "  -rp ../{} \\", RECEPTOR_TOPOLOGY)?;
                writeln!(writer, "  -lp ../{} \\", LIGAND_TOPOLOGY)?;
            }
            TopologyArgs::SingleComplex { mode, mask } => {
                writeln!(
                    writer,
                    "  {} {} \\",
                    mode.solver_flag(),
                    shell_quote(&mask.residue_selector())
                )?;
            }
        }
        writeln!(writer, "  -y ../{} \\", STRIPPED_TRAJECTORY)?;
        writeln!(writer, "  > {} 2>&1", SOLVER_LOG)?;
        writeln!(writer)?;
        writeln!(writer, "echo \"[$(date)] Done.\"")?;
        Ok(())
    }

    fn executable(&self) -> bool {
        true
    }
}

/// Single-quotes a word for POSIX shells.
pub fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

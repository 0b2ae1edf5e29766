use crate::core::layout::WorkLayout;
use std::fmt;
use std::path::PathBuf;

/// Pipeline stages, in the only order they ever run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    ResolvePaths,
    DeriveTopology,
    DeriveTrajectory,
    WriteSolverInput,
    WriteJobScript,
    Submit,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Validate,
        Stage::ResolvePaths,
        Stage::DeriveTopology,
        Stage::DeriveTrajectory,
        Stage::WriteSolverInput,
        Stage::WriteJobScript,
        Stage::Submit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Validate => "Validating configuration",
            Stage::ResolvePaths => "Resolving input paths",
            Stage::DeriveTopology => "Deriving topologies",
            Stage::DeriveTrajectory => "Deriving trajectory",
            Stage::WriteSolverInput => "Writing solver input",
            Stage::WriteJobScript => "Writing job script",
            Stage::Submit => "Submitting job",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a run stopped after writing the job script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    SubmissionDisabled,
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// Every artifact is written; nothing was submitted.
    Prepared {
        layout: WorkLayout,
        reason: StopReason,
    },
    /// The queue accepted the job script.
    Submitted {
        layout: WorkLayout,
        job_script: PathBuf,
    },
}

impl PrepareOutcome {
    pub fn layout(&self) -> &WorkLayout {
        match self {
            PrepareOutcome::Prepared { layout, .. } | PrepareOutcome::Submitted { layout, .. } => {
                layout
            }
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, PrepareOutcome::Submitted { .. })
    }
}

use crate::core::io::cpptraj::CpptrajScript;
use crate::core::io::mmpbsa::SolverInput;
use crate::core::io::slurm::JobScript;
use crate::core::io::traits::{ScriptFile, set_mode};
use crate::core::layout::{JOB_SCRIPT, STRIPPED_TRAJECTORY, TRAJECTORY_SCRIPT, TopologyRole, WorkLayout};
use crate::core::models::config::{RunConfig, TopologyPlan};
use crate::core::models::mask::ResidueMask;
use crate::core::resolve::{ResolvedInputs, resolve_inputs};
use crate::engine::config::PipelineSettings;
use crate::engine::error::PipelineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{PrepareOutcome, Stage, StopReason};
use crate::engine::tools::{ToolInvocation, ToolRunner};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// A validated configuration together with everything it resolves to on disk.
/// Producing one touches nothing and invokes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparePlan {
    pub config: RunConfig,
    pub inputs: ResolvedInputs,
    pub layout: WorkLayout,
}

impl PreparePlan {
    /// Reduced topologies the plan derives, with the residues each one keeps.
    pub fn topology_targets(&self) -> Vec<(TopologyRole, &ResidueMask)> {
        let residues = &self.config.residues;
        match self.config.topology {
            TopologyPlan::Explicit => vec![
                (TopologyRole::Complex, &residues.complex),
                (TopologyRole::Receptor, &residues.receptor),
                (TopologyRole::Ligand, &residues.ligand),
            ],
            TopologyPlan::SingleComplex { .. } => vec![(TopologyRole::Complex, &residues.complex)],
        }
    }
}

/// Runs the validation and path-resolution stages only.
#[instrument(skip_all, name = "plan_workflow", fields(config = %config_path.display()))]
pub fn plan(
    config_path: &Path,
    settings: &PipelineSettings,
    reporter: &ProgressReporter,
) -> Result<PreparePlan, PipelineError> {
    // === Stage: Validate ===
    enter(reporter, Stage::Validate);
    let config = RunConfig::from_path(config_path, settings.default_topology_mode)?;
    info!(
        "Configuration valid: level of theory {}, {:?} topology plan.",
        config.theory, config.topology
    );
    reporter.report(Progress::StageFinish);

    // === Stage: ResolvePaths ===
    enter(reporter, Stage::ResolvePaths);
    let inputs = resolve_inputs(&config.directory, &settings.base_dir, &settings.inputs)?;
    let layout = WorkLayout::new(&settings.output_root, &inputs.simulation_name, &config.theory);
    debug!("Work directory will be {:?}", layout.work_dir);
    reporter.report(Progress::StageFinish);

    Ok(PreparePlan {
        config,
        inputs,
        layout,
    })
}

/// Runs the whole preparation pipeline for one run configuration.
///
/// Stages run strictly in order and the first failure aborts the run. Files written
/// before a failure are left in place.
#[instrument(skip_all, name = "prepare_workflow", fields(config = %config_path.display()))]
pub fn run(
    config_path: &Path,
    settings: &PipelineSettings,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<PrepareOutcome, PipelineError> {
    let plan = plan(config_path, settings, reporter)?;
    execute(&plan, settings, runner, reporter)
}

/// Runs every stage after path resolution for an already resolved plan.
pub fn execute(
    plan: &PreparePlan,
    settings: &PipelineSettings,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<PrepareOutcome, PipelineError> {
    let PreparePlan {
        config,
        inputs,
        layout,
    } = plan;

    // === Stage: DeriveTopology ===
    enter(reporter, Stage::DeriveTopology);
    let cpptraj = runner.locate(&settings.tools.cpptraj, &settings.base_dir)?;
    create_dir(&layout.work_dir, settings.directory_mode)?;

    let targets = plan.topology_targets();
    reporter.report(Progress::TaskStart {
        total_steps: targets.len() as u64,
    });
    for (role, keep) in targets {
        let script = CpptrajScript::strip_topology(
            &inputs.topology,
            keep,
            &format!("./{}", role.output_name()),
        );
        run_script(runner, &cpptraj, layout, role.script_name(), &script)?;
        reporter.message(format!("Derived {}", role.output_name()));
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::StageFinish);

    // === Stage: DeriveTrajectory ===
    enter(reporter, Stage::DeriveTrajectory);
    let script = CpptrajScript::strip_trajectory(
        &inputs.topology,
        &inputs.trajectory.display().to_string(),
        config.frames,
        &config.residues.complex,
        &format!("./{}", STRIPPED_TRAJECTORY),
    );
    run_script(runner, &cpptraj, layout, TRAJECTORY_SCRIPT, &script)?;
    reporter.message(format!("Derived {}", STRIPPED_TRAJECTORY));
    reporter.report(Progress::StageFinish);

    // === Stage: WriteSolverInput ===
    enter(reporter, Stage::WriteSolverInput);
    create_dir(&layout.solver_dir, settings.directory_mode)?;
    SolverInput::from_config(config).write_to_path(layout.solver_input_path())?;
    reporter.report(Progress::StageFinish);

    // === Stage: WriteJobScript ===
    enter(reporter, Stage::WriteJobScript);
    let job_script = layout.job_script_path();
    JobScript::new(
        &layout.prefix,
        &layout.solver_input_name,
        &settings.batch,
        config,
    )
    .write_to_path(&job_script)?;
    reporter.report(Progress::StageFinish);

    // === Stage: Submit or stop ===
    let stop = if settings.dry_run {
        Some(StopReason::DryRun)
    } else if !config.submit_job {
        Some(StopReason::SubmissionDisabled)
    } else {
        None
    };
    if let Some(reason) = stop {
        info!("Preparation complete; not submitting ({:?}).", reason);
        return Ok(PrepareOutcome::Prepared {
            layout: layout.clone(),
            reason,
        });
    }

    enter(reporter, Stage::Submit);
    let sbatch = runner.locate(&settings.tools.sbatch, &settings.base_dir)?;
    runner.run(&ToolInvocation::new(sbatch, &layout.solver_dir).arg(JOB_SCRIPT))?;
    reporter.message(format!("Queue accepted {}", job_script.display()));
    reporter.report(Progress::StageFinish);
    info!("Submitted {:?}", job_script);

    Ok(PrepareOutcome::Submitted {
        layout: layout.clone(),
        job_script,
    })
}

fn enter(reporter: &ProgressReporter, stage: Stage) {
    info!("{}...", stage);
    reporter.report(Progress::StageStart { stage });
}

fn create_dir(path: &Path, mode: Option<u32>) -> Result<(), PipelineError> {
    fs::create_dir_all(path).map_err(|e| PipelineError::io(path, e))?;
    if let Some(mode) = mode {
        set_mode(path, mode)?;
    }
    Ok(())
}

fn run_script(
    runner: &dyn ToolRunner,
    program: &Path,
    layout: &WorkLayout,
    script_name: &str,
    script: &CpptrajScript,
) -> Result<(), PipelineError> {
    script.write_to_path(layout.work_file(script_name))?;
    runner.run(
        &ToolInvocation::new(program, &layout.work_dir)
            .arg("-i")
            .arg(script_name),
    )
}

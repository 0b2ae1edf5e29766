use crate::cli::PrepareArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::profile::ProfileLocator;
use crate::utils::progress::CliProgressHandler;
use gbsa_core::core::layout::JOB_SCRIPT;
use gbsa_core::engine::progress::ProgressReporter;
use gbsa_core::engine::state::PrepareOutcome;
use gbsa_core::engine::tools::SystemToolRunner;
use gbsa_core::workflows;
use std::path::Path;
use tracing::info;

pub fn run(args: PrepareArgs, cwd: &Path, quiet: bool) -> Result<()> {
    let overrides = CliOverrides {
        output_root: config::resolve_against(cwd, args.output_root.as_deref()),
        base_dir: cwd.to_path_buf(),
        processes: args.procs,
        environment_script: args
            .amber_env
            .as_deref()
            .map(|p| config::resolve_against(cwd, Some(p))),
        dry_run: args.dry_run,
    };
    info!("Merging deployment profile and CLI arguments...");
    let settings = config::load_settings(&ProfileLocator::new(), &args.profile, &overrides)?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let runner = SystemToolRunner::new();

    info!("Invoking the preparation workflow for {:?}", &args.input);
    let outcome = workflows::prepare::run(&args.input, &settings, &runner, &reporter)?;

    println!("{}", summary(&outcome, &settings.tools.sbatch));
    Ok(())
}

fn summary(outcome: &PrepareOutcome, sbatch: &str) -> String {
    match outcome {
        PrepareOutcome::Submitted { job_script, .. } => {
            format!("Submitted: {}", job_script.display())
        }
        PrepareOutcome::Prepared { layout, .. } => format!(
            "Preparation complete.\nTo run later:\n  (cd {} && {} {})",
            layout.solver_dir.display(),
            sbatch,
            JOB_SCRIPT
        ),
    }
}

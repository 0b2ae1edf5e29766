use crate::cli::CheckArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::profile::ProfileLocator;
use gbsa_core::core::models::config::TopologyPlan;
use gbsa_core::core::models::mask::MaskMode;
use gbsa_core::core::resolve::TopologySource;
use gbsa_core::engine::config::PipelineSettings;
use gbsa_core::engine::progress::ProgressReporter;
use gbsa_core::engine::tools::{SystemToolRunner, ToolRunner};
use gbsa_core::workflows::prepare::{self, PreparePlan};
use std::path::Path;
use tracing::info;

pub fn run(args: CheckArgs, cwd: &Path) -> Result<()> {
    let overrides = CliOverrides {
        output_root: config::resolve_against(cwd, args.output_root.as_deref()),
        base_dir: cwd.to_path_buf(),
        ..Default::default()
    };
    let settings = config::load_settings(&ProfileLocator::new(), &args.profile, &overrides)?;

    info!("Checking {:?} without writing or running anything", &args.input);
    let plan = prepare::plan(&args.input, &settings, &ProgressReporter::new())?;

    print!("{}", render_plan(&plan, &settings, &SystemToolRunner::new()));
    Ok(())
}

fn render_plan(plan: &PreparePlan, settings: &PipelineSettings, runner: &dyn ToolRunner) -> String {
    let config = &plan.config;
    let inputs = &plan.inputs;

    let topology = match &inputs.topology {
        TopologySource::File(path) => path.display().to_string(),
        TopologySource::Pattern(pattern) => format!("{} (resolved by cpptraj)", pattern),
    };
    let targets: Vec<&str> = plan
        .topology_targets()
        .iter()
        .map(|(role, _)| role.output_name())
        .collect();
    let split = match (config.topology, config.solver_split()) {
        (TopologyPlan::SingleComplex { .. }, Some((mode, mask))) => {
            let direction = match mode {
                MaskMode::StripLigand => "solver strips ligand residues",
                MaskMode::StripReceptor => "solver strips receptor residues",
            };
            format!("single complex, {} ({} ':{}')", direction, mode.solver_flag(), mask)
        }
        _ => "explicit receptor and ligand topologies".to_string(),
    };
    let submit = match (config.submit_job, settings.dry_run) {
        (true, false) => "yes",
        (true, true) => "no (dry run)",
        (false, _) => "no",
    };

    let mut rows = vec![
        ("Simulation directory:".to_string(), inputs.simulation_dir.display().to_string()),
        ("Source topology:".to_string(), topology),
        ("Source trajectory:".to_string(), inputs.trajectory.display().to_string()),
        (
            "Frames:".to_string(),
            format!(
                "{} to {} every {}",
                config.frames.start, config.frames.end, config.frames.interval
            ),
        ),
        ("Level of theory:".to_string(), config.theory.to_string()),
        ("Topology plan:".to_string(), split),
        ("Derived topologies:".to_string(), targets.join(", ")),
        ("Work directory:".to_string(), plan.layout.work_dir.display().to_string()),
        ("Solver directory:".to_string(), plan.layout.solver_dir.display().to_string()),
        ("Submit job:".to_string(), submit.to_string()),
    ];
    for program in [&settings.tools.cpptraj, &settings.tools.sbatch] {
        let status = match runner.locate(program, &settings.base_dir) {
            Ok(path) => path.display().to_string(),
            Err(_) => "NOT FOUND".to_string(),
        };
        rows.push((format!("Tool '{}':", program), status));
    }

    rows.iter()
        .map(|(label, value)| format!("{:<21} {}\n", label, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbsa_core::engine::config::PipelineSettingsBuilder;
    use gbsa_core::engine::error::PipelineError;
    use std::fs;
    use std::path::PathBuf;

    struct OnlyCpptraj;

    impl ToolRunner for OnlyCpptraj {
        fn locate(
            &self,
            program: &str,
            _base_dir: &Path,
        ) -> std::result::Result<PathBuf, PipelineError> {
            if program == "cpptraj" {
                Ok(PathBuf::from("/opt/amber/bin/cpptraj"))
            } else {
                Err(PipelineError::ExternalToolMissing {
                    program: program.to_string(),
                })
            }
        }

        fn run(
            &self,
            invocation: &gbsa_core::engine::tools::ToolInvocation,
        ) -> std::result::Result<(), PipelineError> {
            panic!("check must not run tools, tried `{}`", invocation);
        }
    }

    #[test]
    fn plan_rendering_describes_single_complex_run() {
        let root = tempfile::tempdir().unwrap();
        let sim = root.path().join("complex1");
        fs::create_dir(&sim).unwrap();
        fs::write(sim.join("system.prmtop"), b"").unwrap();
        fs::write(sim.join("md.nc"), b"").unwrap();
        let config_path = root.path().join("run.json");
        fs::write(
            &config_path,
            r#"{
                "directory": "complex1",
                "complex_residues": "1-301",
                "receptor_residues": "1-300",
                "ligand_residues": "301",
                "level_of_theory": "MM",
                "startframe": 1,
                "endframe": "last",
                "interval": 5,
                "igb": 5,
                "saltcon": 0.15,
                "submit_job": "yes",
                "mmpbsa_mask_mode": "m"
            }"#,
        )
        .unwrap();
        let settings = PipelineSettingsBuilder::new()
            .output_root(root.path().join("out"))
            .base_dir(root.path().to_path_buf())
            .build()
            .unwrap();

        let plan = prepare::plan(&config_path, &settings, &ProgressReporter::new()).unwrap();
        let text = render_plan(&plan, &settings, &OnlyCpptraj);

        assert!(text.contains("Frames:               1 to last every 5\n"));
        assert!(text.contains("solver strips ligand residues (-m ':301')"));
        assert!(text.contains("Derived topologies:   complex.prmtop\n"));
        assert!(text.contains("Submit job:           yes\n"));
        assert!(text.contains("/opt/amber/bin/cpptraj"));
        assert!(text.contains("NOT FOUND"));
        assert!(!root.path().join("out").exists());
    }
}

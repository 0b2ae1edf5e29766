use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "gbsa-prep",
    author = "GBSA Prep Developers",
    version,
    about = "GBSA Prep - Prepare MM/GBSA and QM/MM-GBSA binding free-energy calculations from a finished MD simulation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress display
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive topologies and trajectory, write the solver input and job script, and optionally submit.
    Prepare(PrepareArgs),
    /// Validate a run configuration and resolve its inputs without writing or running anything.
    Check(CheckArgs),
    /// Inspect the deployment profile.
    Profile(ProfileArgs),
}

/// Deployment profile selection and overrides shared by every subcommand that needs settings.
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileSource {
    /// Path to a deployment profile in TOML format.
    /// Defaults to `profile.toml` in the per-user config directory, if present.
    #[arg(long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Set a profile value, overriding the profile file.
    /// Can be used multiple times. Example: -S batch.partition=gpu
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Path to the run configuration in JSON format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub profile: ProfileSource,

    /// Directory in which `<simulation>_gbsa` is created. Defaults to the current directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Number of MPI processes for the solver, overriding `batch.processes`.
    #[arg(short = 'n', long, value_name = "INT")]
    pub procs: Option<u32>,

    /// Environment script sourced by the job before running the solver,
    /// overriding `batch.environment-script`.
    #[arg(long, value_name = "PATH")]
    pub amber_env: Option<PathBuf>,

    /// Prepare everything but never submit, whatever `submit_job` says.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the run configuration in JSON format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub profile: ProfileSource,

    /// Directory in which `<simulation>_gbsa` would be created. Defaults to the current directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,
}

/// Arguments for the `profile` subcommand.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the path of the default deployment profile.
    Path,
    /// Print the effective deployment settings as TOML.
    Show {
        #[command(flatten)]
        profile: ProfileSource,
    },
}

//! The seam between the pipeline and out-of-process tools.
//!
//! Every external call goes through [`ToolRunner`] as a program plus an argument list.
//! No shell ever interprets the arguments, so residue masks and paths reach the tools
//! byte for byte.

use crate::engine::error::PipelineError;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// A single blocking call to an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

pub trait ToolRunner {
    /// Confirms `program` can be executed, returning its resolved location.
    ///
    /// A bare name is searched on `PATH`. A relative path is taken relative to
    /// `base_dir`, never to the process working directory, so the returned location
    /// stays valid when the tool is later run from another directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalToolMissing`] if the program cannot be found.
    fn locate(&self, program: &str, base_dir: &Path) -> Result<PathBuf, PipelineError>;

    /// Runs the invocation to completion. A non-zero exit is an error; nothing else
    /// about the process is observed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalToolFailure`] on a non-zero exit or a signal, and
    /// [`PipelineError::ExternalToolMissing`] if the program vanished since `locate`.
    fn run(&self, invocation: &ToolInvocation) -> Result<(), PipelineError>;
}

/// Runs tools as child processes of the current one, inheriting stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl SystemToolRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for SystemToolRunner {
    fn locate(&self, program: &str, base_dir: &Path) -> Result<PathBuf, PipelineError> {
        let found = if Path::new(program).components().count() > 1 {
            let path = base_dir.join(program);
            path.is_file().then_some(path)
        } else {
            which::which(program).ok()
        };
        match found {
            Some(path) => {
                debug!("Located '{}' at {:?}", program, path);
                Ok(path)
            }
            None => Err(PipelineError::ExternalToolMissing {
                program: program.to_string(),
            }),
        }
    }

    fn run(&self, invocation: &ToolInvocation) -> Result<(), PipelineError> {
        debug!("Running `{}` in {:?}", invocation, invocation.cwd);
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .status()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PipelineError::ExternalToolMissing {
                    program: invocation.program.display().to_string(),
                },
                _ => PipelineError::io(&invocation.cwd, e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(PipelineError::ExternalToolFailure {
                program: invocation.program.display().to_string(),
                status: status.to_string(),
            })
        }
    }
}

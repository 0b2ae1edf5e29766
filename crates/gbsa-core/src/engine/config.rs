use crate::core::models::config::TopologyModeKind;
use crate::core::resolve::InputSettings;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Cluster resources and environment written into the batch script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub partition: String,
    pub nodes: u32,
    pub processes: u32,
    pub memory: Option<String>,
    pub time: Option<String>,
    pub account: Option<String>,
    pub environment_script: Option<PathBuf>,
    pub solver: String,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            partition: "production".to_string(),
            nodes: 1,
            processes: 8,
            memory: Some("8G".to_string()),
            time: Some("3-00:00:00".to_string()),
            account: None,
            environment_script: None,
            solver: "$AMBERHOME/bin/MMPBSA.py.MPI".to_string(),
        }
    }
}

/// Executables invoked by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub cpptraj: String,
    pub sbatch: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            cpptraj: "cpptraj".to_string(),
            sbatch: "sbatch".to_string(),
        }
    }
}

/// Everything about a preparation run that comes from the deployment rather than from
/// the run configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Directory under which `<simulation>_gbsa` is created.
    pub output_root: PathBuf,
    /// Directory against which a relative simulation directory is resolved.
    pub base_dir: PathBuf,
    pub inputs: InputSettings,
    pub default_topology_mode: TopologyModeKind,
    /// Permission bits applied to the work and solver directories.
    pub directory_mode: Option<u32>,
    pub batch: BatchSettings,
    pub tools: ToolSettings,
    /// Prepare everything but never submit, whatever the run configuration says.
    pub dry_run: bool,
}

#[derive(Default)]
pub struct PipelineSettingsBuilder {
    output_root: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    inputs: Option<InputSettings>,
    default_topology_mode: Option<TopologyModeKind>,
    directory_mode: Option<Option<u32>>,
    batch: Option<BatchSettings>,
    tools: Option<ToolSettings>,
    dry_run: Option<bool>,
}

impl PipelineSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_root(mut self, path: PathBuf) -> Self {
        self.output_root = Some(path);
        self
    }
    pub fn base_dir(mut self, path: PathBuf) -> Self {
        self.base_dir = Some(path);
        self
    }
    pub fn inputs(mut self, inputs: InputSettings) -> Self {
        self.inputs = Some(inputs);
        self
    }
    pub fn default_topology_mode(mut self, mode: TopologyModeKind) -> Self {
        self.default_topology_mode = Some(mode);
        self
    }
    pub fn directory_mode(mut self, mode: Option<u32>) -> Self {
        self.directory_mode = Some(mode);
        self
    }
    pub fn batch(mut self, batch: BatchSettings) -> Self {
        self.batch = Some(batch);
        self
    }
    pub fn tools(mut self, tools: ToolSettings) -> Self {
        self.tools = Some(tools);
        self
    }
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    pub fn build(self) -> Result<PipelineSettings, ConfigError> {
        let output_root = self
            .output_root
            .ok_or(ConfigError::MissingParameter("output_root"))?;
        let base_dir = self
            .base_dir
            .ok_or(ConfigError::MissingParameter("base_dir"))?;

        let batch = self.batch.unwrap_or_default();
        if batch.processes == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "processes",
                reason: "must be at least 1".to_string(),
            });
        }
        if batch.nodes == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "nodes",
                reason: "must be at least 1".to_string(),
            });
        }

        let inputs = self.inputs.unwrap_or_default();
        if inputs.topology_pattern.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "topology_pattern",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(PipelineSettings {
            output_root,
            base_dir,
            inputs,
            default_topology_mode: self.default_topology_mode.unwrap_or_default(),
            directory_mode: self.directory_mode.unwrap_or(Some(0o755)),
            batch,
            tools: self.tools.unwrap_or_default(),
            dry_run: self.dry_run.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolve::TopologyResolution;

    #[test]
    fn build_fills_defaults() {
        let settings = PipelineSettingsBuilder::new()
            .output_root(PathBuf::from("/scratch"))
            .base_dir(PathBuf::from("/home/user"))
            .build()
            .unwrap();

        assert_eq!(settings.inputs.topology_resolution, TopologyResolution::Eager);
        assert_eq!(settings.inputs.topology_pattern, "*.prmtop");
        assert_eq!(settings.inputs.trajectory_name, "md.nc");
        assert_eq!(settings.default_topology_mode, TopologyModeKind::Explicit);
        assert_eq!(settings.directory_mode, Some(0o755));
        assert_eq!(settings.batch.processes, 8);
        assert_eq!(settings.batch.memory.as_deref(), Some("8G"));
        assert_eq!(settings.tools.cpptraj, "cpptraj");
        assert!(!settings.dry_run);
    }

    #[test]
    fn build_requires_output_root() {
        let result = PipelineSettingsBuilder::new()
            .base_dir(PathBuf::from("/home/user"))
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("output_root")));
    }

    #[test]
    fn zero_processes_is_rejected() {
        let result = PipelineSettingsBuilder::new()
            .output_root(PathBuf::from("/scratch"))
            .base_dir(PathBuf::from("/home/user"))
            .batch(BatchSettings {
                processes: 0,
                ..Default::default()
            })
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "processes",
                ..
            })
        ));
    }

    #[test]
    fn directory_mode_can_be_disabled() {
        let settings = PipelineSettingsBuilder::new()
            .output_root(PathBuf::from("/scratch"))
            .base_dir(PathBuf::from("/home/user"))
            .directory_mode(None)
            .build()
            .unwrap();
        assert_eq!(settings.directory_mode, None);
    }
}

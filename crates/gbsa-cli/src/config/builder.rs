use super::file::{PartialProfile, parse_directory_mode};
use crate::error::{CliError, Result};
use gbsa_core::core::models::config::TopologyModeKind;
use gbsa_core::core::resolve::{InputSettings, TopologyResolution};
use gbsa_core::engine::config::{BatchSettings, PipelineSettings, PipelineSettingsBuilder, ToolSettings};
use std::path::PathBuf;
use tracing::debug;

/// Values taken from the command line, which win over everything else.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_root: PathBuf,
    pub base_dir: PathBuf,
    pub processes: Option<u32>,
    pub environment_script: Option<PathBuf>,
    pub dry_run: bool,
}

impl PartialProfile {
    /// Layers `--set` values over the profile, then command-line values over both, and
    /// fills every remaining gap with the built-in default.
    pub fn merge_with_cli(
        mut self,
        set_values: &[String],
        overrides: &CliOverrides,
    ) -> Result<PipelineSettings> {
        self.apply_set_values(set_values)?;

        let defaults_inputs = InputSettings::default();
        let inputs = InputSettings {
            topology_resolution: self
                .topology_resolution
                .unwrap_or(defaults_inputs.topology_resolution),
            topology_pattern: self
                .topology_pattern
                .unwrap_or(defaults_inputs.topology_pattern),
            trajectory_name: self
                .trajectory_name
                .unwrap_or(defaults_inputs.trajectory_name),
        };

        let batch_config = self.batch.unwrap_or_default();
        let defaults_batch = BatchSettings::default();
        let batch = BatchSettings {
            partition: batch_config.partition.unwrap_or(defaults_batch.partition),
            nodes: batch_config.nodes.unwrap_or(defaults_batch.nodes),
            processes: overrides
                .processes
                .or(batch_config.processes)
                .unwrap_or(defaults_batch.processes),
            memory: batch_config.memory.or(defaults_batch.memory),
            time: batch_config.time.or(defaults_batch.time),
            account: batch_config.account.or(defaults_batch.account),
            environment_script: overrides
                .environment_script
                .clone()
                .or(batch_config.environment_script)
                .or(defaults_batch.environment_script),
            solver: batch_config.solver.unwrap_or(defaults_batch.solver),
        };

        let tools_config = self.tools.unwrap_or_default();
        let defaults_tools = ToolSettings::default();
        let tools = ToolSettings {
            cpptraj: tools_config.cpptraj.unwrap_or(defaults_tools.cpptraj),
            sbatch: tools_config.sbatch.unwrap_or(defaults_tools.sbatch),
        };

        let mut builder = PipelineSettingsBuilder::new()
            .output_root(overrides.output_root.clone())
            .base_dir(overrides.base_dir.clone())
            .inputs(inputs)
            .default_topology_mode(self.topology_mode.unwrap_or_default())
            .batch(batch)
            .tools(tools)
            .dry_run(overrides.dry_run);
        if let Some(raw) = &self.directory_mode {
            builder = builder.directory_mode(parse_directory_mode(raw)?);
        }

        let settings = builder.build()?;
        debug!("Effective deployment settings: {:?}", settings);
        Ok(settings)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Argument(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value = value_str.to_string();

            match key {
                "topology-resolution" => {
                    self.topology_resolution = Some(parse_resolution(key, value_str)?);
                }
                "topology-pattern" => self.topology_pattern = Some(value),
                "trajectory-name" => self.trajectory_name = Some(value),
                "topology-mode" => {
                    self.topology_mode = Some(
                        TopologyModeKind::parse(key, value_str)
                            .map_err(|e| CliError::Argument(e.to_string()))?,
                    );
                }
                "directory-mode" => {
                    parse_directory_mode(value_str)?;
                    self.directory_mode = Some(value);
                }
                "batch.partition" => self.batch_mut().partition = Some(value),
                "batch.nodes" => self.batch_mut().nodes = Some(parse_count(key, value_str)?),
                "batch.processes" => {
                    self.batch_mut().processes = Some(parse_count(key, value_str)?);
                }
                "batch.memory" => self.batch_mut().memory = Some(value),
                "batch.time" => self.batch_mut().time = Some(value),
                "batch.account" => self.batch_mut().account = Some(value),
                "batch.environment-script" => {
                    self.batch_mut().environment_script = Some(PathBuf::from(value));
                }
                "batch.solver" => self.batch_mut().solver = Some(value),
                "tools.cpptraj" => self.tools.get_or_insert_with(Default::default).cpptraj = Some(value),
                "tools.sbatch" => self.tools.get_or_insert_with(Default::default).sbatch = Some(value),
                _ => {
                    return Err(CliError::Argument(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn batch_mut(&mut self) -> &mut super::file::PartialBatchConfig {
        self.batch.get_or_insert_with(Default::default)
    }
}

fn parse_resolution(key: &str, raw: &str) -> Result<TopologyResolution> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "eager" => Ok(TopologyResolution::Eager),
        "glob" => Ok(TopologyResolution::Glob),
        _ => Err(CliError::Argument(format!(
            "Invalid value for {}: '{}'. Expected 'eager' or 'glob'.",
            key, raw
        ))),
    }
}

fn parse_count(key: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::Argument(format!("Invalid integer value for {}: {}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::PartialBatchConfig;
    use gbsa_core::engine::config::ConfigError;

    fn overrides() -> CliOverrides {
        CliOverrides {
            output_root: PathBuf::from("/scratch"),
            base_dir: PathBuf::from("/home/user"),
            ..Default::default()
        }
    }

    fn sets(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_profile_merges_to_defaults() {
        let settings = PartialProfile::default()
            .merge_with_cli(&[], &overrides())
            .unwrap();

        assert_eq!(settings.inputs, InputSettings::default());
        assert_eq!(settings.batch, BatchSettings::default());
        assert_eq!(settings.tools, ToolSettings::default());
        assert_eq!(settings.directory_mode, Some(0o755));
        assert_eq!(settings.default_topology_mode, TopologyModeKind::Explicit);
        assert_eq!(settings.output_root, PathBuf::from("/scratch"));
    }

    #[test]
    fn profile_values_override_defaults() {
        let profile = PartialProfile {
            topology_mode: Some(TopologyModeKind::Complex),
            directory_mode: Some(String::new()),
            batch: Some(PartialBatchConfig {
                partition: Some("gpu".into()),
                processes: Some(32),
                ..Default::default()
            }),
            ..Default::default()
        };
        let settings = profile.merge_with_cli(&[], &overrides()).unwrap();

        assert_eq!(settings.default_topology_mode, TopologyModeKind::Complex);
        assert_eq!(settings.directory_mode, None);
        assert_eq!(settings.batch.partition, "gpu");
        assert_eq!(settings.batch.processes, 32);
        assert_eq!(settings.batch.memory.as_deref(), Some("8G"));
    }

    #[test]
    fn set_values_override_profile() {
        let profile = PartialProfile {
            batch: Some(PartialBatchConfig {
                partition: Some("gpu".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let settings = profile
            .merge_with_cli(
                &sets(&[
                    "batch.partition=debug",
                    "topology-resolution=glob",
                    "tools.cpptraj=/opt/amber/bin/cpptraj",
                    "batch.account=lab",
                ]),
                &overrides(),
            )
            .unwrap();

        assert_eq!(settings.batch.partition, "debug");
        assert_eq!(settings.batch.account.as_deref(), Some("lab"));
        assert_eq!(settings.inputs.topology_resolution, TopologyResolution::Glob);
        assert_eq!(settings.tools.cpptraj, "/opt/amber/bin/cpptraj");
    }

    #[test]
    fn cli_values_override_set_values() {
        let cli = CliOverrides {
            processes: Some(4),
            environment_script: Some(PathBuf::from("/cli/amber.sh")),
            dry_run: true,
            ..overrides()
        };
        let settings = PartialProfile::default()
            .merge_with_cli(
                &sets(&[
                    "batch.processes=64",
                    "batch.environment-script=/set/amber.sh",
                ]),
                &cli,
            )
            .unwrap();

        assert_eq!(settings.batch.processes, 4);
        assert_eq!(
            settings.batch.environment_script,
            Some(PathBuf::from("/cli/amber.sh"))
        );
        assert!(settings.dry_run);
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["batch.processes", "batch.processes=many", "batch.queue=gpu", "directory-mode=9"] {
            let result = PartialProfile::default().merge_with_cli(&sets(&[bad]), &overrides());
            assert!(
                matches!(result, Err(CliError::Argument(_)) | Err(CliError::Profile(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn zero_processes_is_a_settings_error() {
        let cli = CliOverrides {
            processes: Some(0),
            ..overrides()
        };
        let result = PartialProfile::default().merge_with_cli(&[], &cli);
        assert!(matches!(
            result,
            Err(CliError::Settings(ConfigError::InvalidParameter {
                name: "processes",
                ..
            }))
        ));
    }
}

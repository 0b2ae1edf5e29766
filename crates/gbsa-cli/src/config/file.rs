use crate::error::{CliError, Result};
use gbsa_core::core::models::config::TopologyModeKind;
use gbsa_core::core::resolve::TopologyResolution;
use gbsa_core::engine::config::PipelineSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialBatchConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_script: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialToolsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpptraj: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sbatch: Option<String>,
}

/// Deployment profile as written in TOML. Every field is optional; anything left out
/// falls back to the built-in default when merged.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology_resolution: Option<TopologyResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology_mode: Option<TopologyModeKind>,
    /// Octal permission bits such as `"755"`; an empty string leaves permissions alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<PartialBatchConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<PartialToolsConfig>,
}

impl PartialProfile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading deployment profile from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// The fully populated profile equivalent to `settings`.
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        let batch = &settings.batch;
        Self {
            topology_resolution: Some(settings.inputs.topology_resolution),
            topology_pattern: Some(settings.inputs.topology_pattern.clone()),
            trajectory_name: Some(settings.inputs.trajectory_name.clone()),
            topology_mode: Some(settings.default_topology_mode),
            directory_mode: Some(
                settings
                    .directory_mode
                    .map(|mode| format!("{:o}", mode))
                    .unwrap_or_default(),
            ),
            batch: Some(PartialBatchConfig {
                partition: Some(batch.partition.clone()),
                nodes: Some(batch.nodes),
                processes: Some(batch.processes),
                memory: batch.memory.clone(),
                time: batch.time.clone(),
                account: batch.account.clone(),
                environment_script: batch.environment_script.clone(),
                solver: Some(batch.solver.clone()),
            }),
            tools: Some(PartialToolsConfig {
                cpptraj: Some(settings.tools.cpptraj.clone()),
                sbatch: Some(settings.tools.sbatch.clone()),
            }),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| CliError::Other(e.into()))
    }
}

/// Parses octal permission bits. An empty value disables permission changes.
pub fn parse_directory_mode(raw: &str) -> Result<Option<u32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(Some(mode)),
        _ => Err(CliError::Profile(format!(
            "Invalid directory-mode '{}': expected octal permission bits such as 755",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbsa_core::engine::config::PipelineSettingsBuilder;
    use std::fs;

    #[test]
    fn profile_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        fs::write(
            &path,
            r#"
            topology-resolution = "glob"
            topology-pattern = "*.parm7"
            topology-mode = "complex"
            directory-mode = "750"

            [batch]
            partition = "gpu"
            processes = 32
            environment-script = "/opt/amber/amber.sh"

            [tools]
            sbatch = "/opt/slurm/bin/sbatch"
            "#,
        )
        .unwrap();

        let profile = PartialProfile::from_file(&path).unwrap();
        assert_eq!(profile.topology_resolution, Some(TopologyResolution::Glob));
        assert_eq!(profile.topology_pattern.as_deref(), Some("*.parm7"));
        assert_eq!(profile.topology_mode, Some(TopologyModeKind::Complex));
        assert_eq!(profile.directory_mode.as_deref(), Some("750"));
        let batch = profile.batch.unwrap();
        assert_eq!(batch.partition.as_deref(), Some("gpu"));
        assert_eq!(batch.processes, Some(32));
        assert_eq!(
            batch.environment_script,
            Some(PathBuf::from("/opt/amber/amber.sh"))
        );
        assert_eq!(
            profile.tools.unwrap().sbatch.as_deref(),
            Some("/opt/slurm/bin/sbatch")
        );
    }

    #[test]
    fn unknown_profile_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        fs::write(&path, "[batch]\nqueue = \"gpu\"\n").unwrap();

        let result = PartialProfile::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn effective_settings_survive_a_toml_round_trip() {
        let settings = PipelineSettingsBuilder::new()
            .output_root(PathBuf::from("/scratch"))
            .base_dir(PathBuf::from("/home/user"))
            .build()
            .unwrap();
        let profile = PartialProfile::from_settings(&settings);

        let text = profile.to_toml().unwrap();
        assert!(text.contains("topology-resolution = \"eager\""));
        assert!(text.contains("directory-mode = \"755\""));
        assert!(text.contains("[batch]"));
        assert!(!text.contains("account"));

        let parsed: PartialProfile = toml::from_str(&text).unwrap();
        assert_eq!(parsed, profile);
    }

    #[test]
    fn directory_mode_is_octal() {
        assert_eq!(parse_directory_mode("755").unwrap(), Some(0o755));
        assert_eq!(parse_directory_mode("0o700").unwrap(), Some(0o700));
        assert_eq!(parse_directory_mode("").unwrap(), None);
        assert!(parse_directory_mode("999").is_err());
        assert!(parse_directory_mode("rwx").is_err());
    }
}

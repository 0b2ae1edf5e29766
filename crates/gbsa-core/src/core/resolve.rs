//! Locates the simulation directory and the source topology and trajectory inside it.

use crate::engine::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How the source topology is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyResolution {
    /// Hand the glob pattern to the analysis tool unchanged.
    Glob,
    /// Enumerate matches up front and require exactly one.
    #[default]
    Eager,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSettings {
    pub topology_resolution: TopologyResolution,
    pub topology_pattern: String,
    pub trajectory_name: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            topology_resolution: TopologyResolution::Eager,
            topology_pattern: "*.prmtop".to_string(),
            trajectory_name: "md.nc".to_string(),
        }
    }
}

/// The source topology as the analysis tool should load it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologySource {
    Pattern(String),
    File(PathBuf),
}

impl TopologySource {
    pub fn parm_argument(&self) -> String {
        match self {
            TopologySource::Pattern(pattern) => pattern.clone(),
            TopologySource::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInputs {
    pub simulation_dir: PathBuf,
    pub simulation_name: String,
    pub topology: TopologySource,
    pub trajectory: PathBuf,
}

/// Resolves every input the pipeline reads. Relative directories are taken relative
/// to `base_dir`.
pub fn resolve_inputs(
    configured_dir: &Path,
    base_dir: &Path,
    settings: &InputSettings,
) -> Result<ResolvedInputs, PipelineError> {
    let simulation_dir = resolve_simulation_dir(configured_dir, base_dir)?;
    let simulation_name = simulation_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PipelineError::invalid("directory", "has no final path component"))?;

    let topology = resolve_topology(
        &simulation_dir,
        &settings.topology_pattern,
        settings.topology_resolution,
    )?;
    let trajectory = resolve_trajectory(&simulation_dir, &settings.trajectory_name)?;

    info!(
        "Resolved inputs in {:?}: topology {}, trajectory {:?}",
        simulation_dir,
        topology.parm_argument(),
        trajectory
    );

    Ok(ResolvedInputs {
        simulation_dir,
        simulation_name,
        topology,
        trajectory,
    })
}

pub fn resolve_simulation_dir(configured: &Path, base_dir: &Path) -> Result<PathBuf, PipelineError> {
    let joined = if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        base_dir.join(configured)
    };

    match joined.canonicalize() {
        Ok(path) if path.is_dir() => Ok(path),
        Ok(path) => Err(PipelineError::DirectoryNotFound { path }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(PipelineError::DirectoryNotFound { path: joined })
        }
        Err(e) => Err(PipelineError::io(joined, e)),
    }
}

pub fn resolve_topology(
    simulation_dir: &Path,
    pattern: &str,
    strategy: TopologyResolution,
) -> Result<TopologySource, PipelineError> {
    match strategy {
        TopologyResolution::Glob => {
            let unescaped = simulation_dir.join(pattern).display().to_string();
            debug!("Passing topology pattern {:?} to the analysis tool", unescaped);
            Ok(TopologySource::Pattern(unescaped))
        }
        TopologyResolution::Eager => {
            let escaped_dir = glob::Pattern::escape(&simulation_dir.to_string_lossy());
            let full_pattern = format!("{}/{}", escaped_dir, pattern);
            let entries = glob::glob(&full_pattern).map_err(|e| {
                PipelineError::invalid("topology-pattern", format!("'{}': {}", pattern, e))
            })?;
            let mut candidates = Vec::new();
            for entry in entries {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    PipelineError::io(path, e.into_error())
                })?;
                if path.is_file() {
                    candidates.push(path);
                }
            }
            candidates.sort();

            match candidates.len() {
                0 => Err(PipelineError::MissingInput {
                    what: "Topology",
                    path: simulation_dir.join(pattern),
                }),
                1 => Ok(TopologySource::File(candidates.remove(0))),
                _ => Err(PipelineError::AmbiguousInput {
                    pattern: simulation_dir.join(pattern).display().to_string(),
                    candidates,
                }),
            }
        }
    }
}

pub fn resolve_trajectory(simulation_dir: &Path, name: &str) -> Result<PathBuf, PipelineError> {
    let path = simulation_dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(PipelineError::MissingInput {
            what: "Trajectory",
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sim_dir_with(files: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let root = tempdir().unwrap();
        let sim = root.path().join("complex1");
        fs::create_dir(&sim).unwrap();
        for name in files {
            fs::write(sim.join(name), b"").unwrap();
        }
        (root, sim)
    }

    #[test]
    fn missing_directory_is_reported() {
        let root = tempdir().unwrap();
        let result = resolve_simulation_dir(Path::new("absent"), root.path());
        assert!(matches!(result, Err(PipelineError::DirectoryNotFound { .. })));
    }

    #[test]
    fn relative_directory_is_resolved_against_base() {
        let (root, sim) = sim_dir_with(&[]);
        let resolved = resolve_simulation_dir(Path::new("complex1"), root.path()).unwrap();
        assert_eq!(resolved, sim.canonicalize().unwrap());
    }

    #[test]
    fn a_file_is_not_a_simulation_directory() {
        let (root, _) = sim_dir_with(&["system.prmtop"]);
        let result = resolve_simulation_dir(Path::new("complex1/system.prmtop"), root.path());
        assert!(matches!(result, Err(PipelineError::DirectoryNotFound { .. })));
    }

    #[test]
    fn eager_resolution_requires_exactly_one_match() {
        let (_root, sim) = sim_dir_with(&["system.prmtop", "md.nc"]);
        let source = resolve_topology(&sim, "*.prmtop", TopologyResolution::Eager).unwrap();
        assert_eq!(source, TopologySource::File(sim.join("system.prmtop")));
    }

    #[test]
    fn eager_resolution_fails_without_matches() {
        let (_root, sim) = sim_dir_with(&["md.nc"]);
        let result = resolve_topology(&sim, "*.prmtop", TopologyResolution::Eager);
        assert!(matches!(result, Err(PipelineError::MissingInput { what: "Topology", .. })));
    }

    #[test]
    fn eager_resolution_fails_on_multiple_matches() {
        let (_root, sim) = sim_dir_with(&["a.prmtop", "b.prmtop"]);
        match resolve_topology(&sim, "*.prmtop", TopologyResolution::Eager) {
            Err(PipelineError::AmbiguousInput { candidates, .. }) => {
                assert_eq!(candidates, vec![sim.join("a.prmtop"), sim.join("b.prmtop")]);
            }
            other => panic!("expected AmbiguousInput, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_candidate_directory_is_an_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let (_root, sim) = sim_dir_with(&[]);
        let locked = sim.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("system.prmtop"), b"").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind a privileged user.
        let enforced = fs::read_dir(&locked).is_err();
        let result = resolve_topology(&sim, "*/*.prmtop", TopologyResolution::Eager);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if enforced {
            assert!(
                matches!(result, Err(PipelineError::Io { ref path, .. }) if path.ends_with("locked")),
                "got {result:?}"
            );
        }
    }

    #[test]
    fn glob_resolution_passes_pattern_through() {
        let (_root, sim) = sim_dir_with(&["a.prmtop", "b.prmtop"]);
        let source = resolve_topology(&sim, "*.prmtop", TopologyResolution::Glob).unwrap();
        assert_eq!(
            source.parm_argument(),
            sim.join("*.prmtop").display().to_string()
        );
    }

    #[test]
    fn trajectory_must_exist() {
        let (_root, sim) = sim_dir_with(&["system.prmtop"]);
        let result = resolve_trajectory(&sim, "md.nc");
        assert!(matches!(result, Err(PipelineError::MissingInput { what: "Trajectory", .. })));
    }

    #[test]
    fn resolve_inputs_collects_everything() {
        let (root, sim) = sim_dir_with(&["system.prmtop", "md.nc"]);
        let resolved =
            resolve_inputs(Path::new("complex1"), root.path(), &InputSettings::default()).unwrap();
        let sim = sim.canonicalize().unwrap();
        assert_eq!(resolved.simulation_name, "complex1");
        assert_eq!(resolved.topology, TopologySource::File(sim.join("system.prmtop")));
        assert_eq!(resolved.trajectory, sim.join("md.nc"));
    }
}

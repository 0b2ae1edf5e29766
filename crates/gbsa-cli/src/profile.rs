use crate::config::PartialProfile;
use crate::error::{CliError, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PROFILE_FILE_NAME: &str = "profile.toml";

/// Where the deployment profile for a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOrigin {
    Explicit(PathBuf),
    UserDefault(PathBuf),
    BuiltIn,
}

#[derive(Debug)]
pub struct ProfileLocator {
    default_path: Option<PathBuf>,
}

impl ProfileLocator {
    pub fn new() -> Self {
        let default_path = Self::get_default_profile_path().ok();
        debug!("ProfileLocator initialized with default path: {:?}", &default_path);
        Self { default_path }
    }

    #[cfg(test)]
    pub fn with_default_path(path: PathBuf) -> Self {
        Self {
            default_path: Some(path),
        }
    }

    pub fn default_path(&self) -> Result<&Path> {
        self.default_path.as_deref().ok_or_else(|| {
            CliError::Profile("Could not determine config directory path.".to_string())
        })
    }

    /// Loads the explicitly requested profile, or the per-user default if one exists, or
    /// nothing at all.
    pub fn load(&self, explicit: Option<&Path>) -> Result<(PartialProfile, ProfileOrigin)> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(CliError::Profile(format!(
                    "Profile file not found: {}",
                    path.display()
                )));
            }
            info!("Using deployment profile {:?}", path);
            let profile = PartialProfile::from_file(path)?;
            return Ok((profile, ProfileOrigin::Explicit(path.to_path_buf())));
        }

        match &self.default_path {
            Some(path) if path.is_file() => {
                info!("Using default deployment profile {:?}", path);
                let profile = PartialProfile::from_file(path)?;
                Ok((profile, ProfileOrigin::UserDefault(path.clone())))
            }
            _ => {
                debug!("No deployment profile found; using built-in defaults.");
                Ok((PartialProfile::default(), ProfileOrigin::BuiltIn))
            }
        }
    }

    fn get_default_profile_path() -> Result<PathBuf> {
        ProjectDirs::from("org", "gbsa-prep", "gbsa-prep")
            .map(|dirs| dirs.config_dir().join(PROFILE_FILE_NAME))
            .ok_or_else(|| {
                CliError::Profile("Could not determine config directory path.".to_string())
            })
    }
}

impl Default for ProfileLocator {
    fn default() -> Self {
        Self::new()
    }
}

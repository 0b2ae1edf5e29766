//! Deployment profile loading and merging.
//!
//! Settings are layered as command line > `--set` overrides > profile file > built-in
//! defaults and end up as a single [`PipelineSettings`].

mod builder;
mod file;

pub use builder::CliOverrides;
pub use file::PartialProfile;

use crate::cli::ProfileSource;
use crate::error::Result;
use crate::profile::ProfileLocator;
use gbsa_core::engine::config::PipelineSettings;
use std::path::{Path, PathBuf};

pub fn load_settings(
    locator: &ProfileLocator,
    source: &ProfileSource,
    overrides: &CliOverrides,
) -> Result<PipelineSettings> {
    let (profile, _) = locator.load(source.profile.as_deref())?;
    profile.merge_with_cli(&source.set_values, overrides)
}

/// Anchors an optional command-line directory to the working directory captured at startup.
pub fn resolve_against(cwd: &Path, given: Option<&Path>) -> PathBuf {
    match given {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd.join(path),
        None => cwd.to_path_buf(),
    }
}

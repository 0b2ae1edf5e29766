use crate::cli::{ProfileArgs, ProfileCommands, ProfileSource};
use crate::config::{CliOverrides, PartialProfile};
use crate::error::Result;
use crate::profile::{ProfileLocator, ProfileOrigin};
use std::path::Path;
use tracing::info;

pub fn run(args: ProfileArgs, cwd: &Path) -> Result<()> {
    let locator = ProfileLocator::new();
    match args.command {
        ProfileCommands::Path => {
            let path = locator.default_path()?;
            info!("Default deployment profile location: {:?}", path);
            println!("{}", path.display());
        }
        ProfileCommands::Show { profile } => {
            print!("{}", show(&locator, &profile, cwd)?);
        }
    }
    Ok(())
}

fn show(locator: &ProfileLocator, source: &ProfileSource, cwd: &Path) -> Result<String> {
    let (profile, origin) = locator.load(source.profile.as_deref())?;
    let overrides = CliOverrides {
        output_root: cwd.to_path_buf(),
        base_dir: cwd.to_path_buf(),
        ..Default::default()
    };
    let settings = profile.merge_with_cli(&source.set_values, &overrides)?;

    let header = match origin {
        ProfileOrigin::Explicit(path) | ProfileOrigin::UserDefault(path) => {
            format!("# Effective settings (profile: {})\n", path.display())
        }
        ProfileOrigin::BuiltIn => "# Effective settings (built-in defaults)\n".to_string(),
    };
    Ok(header + &PartialProfile::from_settings(&settings).to_toml()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_prints_builtin_defaults_when_no_profile_exists() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ProfileLocator::with_default_path(dir.path().join("profile.toml"));

        let text = show(&locator, &ProfileSource::default(), dir.path()).unwrap();

        assert!(text.starts_with("# Effective settings (built-in defaults)\n"));
        assert!(text.contains("trajectory-name = \"md.nc\""));
        assert!(text.contains("partition = \"production\""));
        assert!(text.contains("cpptraj = \"cpptraj\""));
    }

    #[test]
    fn show_reflects_set_values() {
        let dir = tempfile::tempdir().unwrap();
        let locator = ProfileLocator::with_default_path(dir.path().join("profile.toml"));
        let source = ProfileSource {
            profile: None,
            set_values: vec!["batch.processes=24".to_string()],
        };

        let text = show(&locator, &source, dir.path()).unwrap();
        assert!(text.contains("processes = 24"));
    }
}

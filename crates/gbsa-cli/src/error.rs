use gbsa_core::engine::config::ConfigError;
use gbsa_core::engine::error::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Invalid deployment settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_are_shown_unchanged() {
        let err: CliError = PipelineError::ExternalToolMissing {
            program: "cpptraj".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Required command 'cpptraj' not found in PATH.");
    }

    #[test]
    fn parse_errors_name_the_file() {
        let err = CliError::FileParsing {
            path: PathBuf::from("/etc/gbsa/profile.toml"),
            source: anyhow::anyhow!("unexpected key"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse file '/etc/gbsa/profile.toml': unexpected key"
        );
    }
}

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing required config key(s): {}", keys.join(", "))]
    MissingKey { keys: Vec<String> },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error(
        "Invalid mask mode '{given}': 'm' (strip ligand to obtain receptor) and 'n' (strip receptor to obtain ligand) are mutually exclusive"
    )]
    InvalidMaskMode { given: String },

    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("{what} not found: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    #[error(
        "Expected exactly one file matching '{pattern}', found {}: {}",
        candidates.len(),
        candidates.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    AmbiguousInput {
        pattern: String,
        candidates: Vec<PathBuf>,
    },

    #[error("Command '{program}' failed with {status}")]
    ExternalToolFailure { program: String, status: String },

    #[error("Required command '{program}' not found in PATH.")]
    ExternalToolMissing { program: String },

    #[error("Failed to parse configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

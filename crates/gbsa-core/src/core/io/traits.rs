use crate::engine::error::PipelineError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Defines the interface for generated text artifacts (tool scripts, control files,
/// batch scripts).
///
/// Implementors only describe how their text is written; creating the file and
/// applying permissions is shared.
pub trait ScriptFile {
    /// Writes the artifact's text to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    fn write_to(&self, writer: &mut impl Write) -> io::Result<()>;

    /// Whether the written file must carry the executable permission bits.
    fn executable(&self) -> bool {
        false
    }

    /// Renders the artifact to a string.
    fn render(&self) -> String {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)
            .expect("writing to an in-memory buffer cannot fail");
        String::from_utf8(buffer).expect("generated scripts are valid UTF-8")
    }

    /// Writes the artifact to a file path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be created, written, or
    /// have its permissions set.
    fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        debug!("Writing {:?}", path);
        let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| PipelineError::io(path, e))?;

        if self.executable() {
            set_mode(path, 0o755)?;
        }
        Ok(())
    }
}

/// Applies unix permission bits to a path. A no-op on other platforms.
pub fn set_mode(path: &Path, mode: u32) -> Result<(), PipelineError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| PipelineError::io(path, e))?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

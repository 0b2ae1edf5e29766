use crate::core::io::traits::ScriptFile;
use crate::core::models::config::FrameWindow;
use crate::core::models::mask::ResidueMask;
use crate::core::resolve::TopologySource;
use std::io::{self, Write};

/// One line of an analysis-tool input script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpptrajCommand {
    Parm(String),
    ParmStrip(String),
    ParmBoxNoBox,
    ParmWrite(String),
    Trajin {
        path: String,
        window: FrameWindow,
    },
    Autoimage,
    Strip(String),
    TrajoutNoBox(String),
    Run,
    Quit,
}

impl CpptrajCommand {
    fn write_line(&self, writer: &mut impl Write) -> io::Result<()> {
        match self {
            CpptrajCommand::Parm(source) => writeln!(writer, "parm {}", source),
            CpptrajCommand::ParmStrip(mask) => writeln!(writer, "parmstrip {}", mask),
            CpptrajCommand::ParmBoxNoBox => writeln!(writer, "parmbox nobox"),
            CpptrajCommand::ParmWrite(out) => writeln!(writer, "parmwrite out {}", out),
            // trajin <file> [start [stop [offset]]]
            CpptrajCommand::Trajin { path, window } => writeln!(
                writer,
                "trajin {} {} {} {}",
                path, window.start, window.end, window.interval
            ),
            CpptrajCommand::Autoimage => writeln!(writer, "autoimage"),
            CpptrajCommand::Strip(mask) => writeln!(writer, "strip {}", mask),
            CpptrajCommand::TrajoutNoBox(out) => writeln!(writer, "trajout {} nobox", out),
            CpptrajCommand::Run => writeln!(writer, "run"),
            CpptrajCommand::Quit => writeln!(writer, "quit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpptrajScript {
    commands: Vec<CpptrajCommand>,
}

impl CpptrajScript {
    /// Loads the source topology, strips every residue outside `keep`, drops box
    /// information and writes the reduced topology to `output`.
    pub fn strip_topology(source: &TopologySource, keep: &ResidueMask, output: &str) -> Self {
        Self {
            commands: vec![
                CpptrajCommand::Parm(source.parm_argument()),
                CpptrajCommand::ParmStrip(keep.complement()),
                CpptrajCommand::ParmBoxNoBox,
                CpptrajCommand::ParmWrite(output.to_string()),
                CpptrajCommand::Run,
                CpptrajCommand::Quit,
            ],
        }
    }

    /// Reads the frame window, re-images, strips every residue outside `keep` and
    /// writes a boxless trajectory to `output`.
    ///
    /// Re-imaging always precedes stripping so whole molecules can be rebuilt from
    /// atoms that are still present.
    pub fn strip_trajectory(
        source: &TopologySource,
        trajectory: &str,
        window: FrameWindow,
        keep: &ResidueMask,
        output: &str,
    ) -> Self {
        Self {
            commands: vec![
                CpptrajCommand::Parm(source.parm_argument()),
                CpptrajCommand::Trajin {
                    path: trajectory.to_string(),
                    window,
                },
                CpptrajCommand::Autoimage,
                CpptrajCommand::Strip(keep.complement()),
                CpptrajCommand::TrajoutNoBox(output.to_string()),
                CpptrajCommand::Run,
                CpptrajCommand::Quit,
            ],
        }
    }

    pub fn commands(&self) -> &[CpptrajCommand] {
        &self.commands
    }
}

impl ScriptFile for CpptrajScript {
    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        for command in &self.commands {
            command.write_line(writer)?;
        }
        Ok(())
    }
}

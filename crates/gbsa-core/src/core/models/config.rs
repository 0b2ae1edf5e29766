use super::mask::{MaskMode, ResidueMask};
use crate::engine::error::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Keys that every run configuration must carry.
pub const BASE_KEYS: [&str; 11] = [
    "directory",
    "complex_residues",
    "receptor_residues",
    "ligand_residues",
    "level_of_theory",
    "startframe",
    "endframe",
    "interval",
    "igb",
    "saltcon",
    "submit_job",
];

/// Keys required as a group whenever the level of theory is not `MM`.
pub const QM_KEYS: [&str; 4] = ["qm_residues", "qmcharge_com", "qmcharge_rec", "qmcharge_lig"];

const TRUE_TOKENS: [&str; 5] = ["1", "true", "yes", "y", "t"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TheoryLevel {
    Mm,
    /// A quantum level-of-theory label, kept exactly as configured.
    Quantum(String),
}

impl TheoryLevel {
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        let label = raw.trim();
        if label.is_empty() {
            return Err(PipelineError::invalid("level_of_theory", "must not be empty"));
        }
        if label.contains(['/', '\\']) || label.chars().any(char::is_control) {
            return Err(PipelineError::invalid(
                "level_of_theory",
                format!("'{}' cannot be used as a directory name", label),
            ));
        }
        if label.eq_ignore_ascii_case("MM") {
            Ok(TheoryLevel::Mm)
        } else {
            Ok(TheoryLevel::Quantum(label.to_string()))
        }
    }

    pub fn is_mm(&self) -> bool {
        matches!(self, TheoryLevel::Mm)
    }

    /// Upper-cased tag used in directory and file names (`MM`, `PM6`, ...).
    pub fn tag(&self) -> String {
        match self {
            TheoryLevel::Mm => "MM".to_string(),
            TheoryLevel::Quantum(label) => label.to_uppercase(),
        }
    }

    pub fn solver_dir_name(&self) -> String {
        format!("{}gbsa", self.tag())
    }

    pub fn solver_input_name(&self) -> String {
        format!("{}gbsa.in", self.tag())
    }
}

impl fmt::Display for TheoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TheoryLevel::Mm => f.write_str("MM"),
            TheoryLevel::Quantum(label) => f.write_str(label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEnd {
    Frame(i64),
    Last,
}

impl fmt::Display for FrameEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameEnd::Frame(n) => write!(f, "{}", n),
            FrameEnd::Last => f.write_str("last"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub start: i64,
    pub end: FrameEnd,
    pub interval: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QmRegion {
    pub residues: ResidueMask,
    pub charge_complex: i64,
    pub charge_receptor: i64,
    pub charge_ligand: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueGroups {
    pub complex: ResidueMask,
    pub receptor: ResidueMask,
    pub ligand: ResidueMask,
}

/// Shape of the topology-derivation step, fixed once at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyPlan {
    /// Derive complex, receptor and ligand topologies separately.
    Explicit,
    /// Derive only the complex topology; the solver splits it using a residue mask.
    SingleComplex { mask_mode: MaskMode },
}

/// Deployment-level choice of topology plan, used when a run configuration is silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyModeKind {
    #[default]
    Explicit,
    Complex,
}

impl TopologyModeKind {
    pub fn parse(key: &str, raw: &str) -> Result<Self, PipelineError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(TopologyModeKind::Explicit),
            "complex" | "single-complex" | "single_complex" => Ok(TopologyModeKind::Complex),
            other => Err(PipelineError::invalid(
                key,
                format!("unknown topology mode '{}', expected 'explicit' or 'complex'", other),
            )),
        }
    }
}

/// Validated, immutable description of one preparation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Simulation directory as configured (home-expanded, not yet resolved).
    pub directory: PathBuf,
    pub residues: ResidueGroups,
    pub theory: TheoryLevel,
    pub frames: FrameWindow,
    pub igb: i64,
    /// Salt concentration, rendered exactly as configured.
    pub saltcon: String,
    pub submit_job: bool,
    pub qm: Option<QmRegion>,
    pub topology: TopologyPlan,
}

impl RunConfig {
    pub fn from_path(path: &Path, default_mode: TopologyModeKind) -> Result<Self, PipelineError> {
        debug!("Loading run configuration from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let partial: PartialRunConfig =
            serde_json::from_str(&content).map_err(|e| PipelineError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        partial.validate(default_mode)
    }

    pub fn from_value(value: Value, default_mode: TopologyModeKind) -> Result<Self, PipelineError> {
        let partial: PartialRunConfig =
            serde_json::from_value(value).map_err(|e| PipelineError::Parse {
                path: PathBuf::from("<inline>"),
                source: e,
            })?;
        partial.validate(default_mode)
    }

    /// The residue mask and direction the solver uses to split the complex, if any.
    pub fn solver_split(&self) -> Option<(MaskMode, &ResidueMask)> {
        match self.topology {
            TopologyPlan::Explicit => None,
            TopologyPlan::SingleComplex { mask_mode } => {
                let mask = match mask_mode {
                    MaskMode::StripLigand => &self.residues.ligand,
                    MaskMode::StripReceptor => &self.residues.receptor,
                };
                Some((mask_mode, mask))
            }
        }
    }
}

/// Run configuration as read from JSON, before any key is checked.
///
/// A key holding JSON `null` counts as absent.
#[derive(Deserialize, Debug, Default)]
pub struct PartialRunConfig {
    directory: Option<Value>,
    complex_residues: Option<Value>,
    receptor_residues: Option<Value>,
    ligand_residues: Option<Value>,
    level_of_theory: Option<Value>,
    startframe: Option<Value>,
    endframe: Option<Value>,
    interval: Option<Value>,
    igb: Option<Value>,
    saltcon: Option<Value>,
    submit_job: Option<Value>,
    qm_residues: Option<Value>,
    qmcharge_com: Option<Value>,
    qmcharge_rec: Option<Value>,
    qmcharge_lig: Option<Value>,
    mmpbsa_mask_mode: Option<Value>,
    topology_mode: Option<Value>,
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

impl PartialRunConfig {
    fn field(&self, key: &str) -> Option<&Value> {
        match key {
            "directory" => self.directory.as_ref(),
            "complex_residues" => self.complex_residues.as_ref(),
            "receptor_residues" => self.receptor_residues.as_ref(),
            "ligand_residues" => self.ligand_residues.as_ref(),
            "level_of_theory" => self.level_of_theory.as_ref(),
            "startframe" => self.startframe.as_ref(),
            "endframe" => self.endframe.as_ref(),
            "interval" => self.interval.as_ref(),
            "igb" => self.igb.as_ref(),
            "saltcon" => self.saltcon.as_ref(),
            "submit_job" => self.submit_job.as_ref(),
            "qm_residues" => self.qm_residues.as_ref(),
            "qmcharge_com" => self.qmcharge_com.as_ref(),
            "qmcharge_rec" => self.qmcharge_rec.as_ref(),
            "qmcharge_lig" => self.qmcharge_lig.as_ref(),
            _ => None,
        }
    }

    fn require(&self, key: &str) -> Result<&Value, PipelineError> {
        self.field(key).ok_or_else(|| PipelineError::MissingKey {
            keys: vec![key.to_string()],
        })
    }

    /// Every absent required key, base keys first, then quantum-region keys when the
    /// configured level of theory calls for them.
    pub fn missing_keys(&self) -> Vec<String> {
        let mut missing: Vec<String> = BASE_KEYS
            .iter()
            .filter(|k| self.field(k).is_none())
            .map(|k| k.to_string())
            .collect();

        let needs_qm = match &self.level_of_theory {
            Some(Value::String(label)) => !label.trim().eq_ignore_ascii_case("MM"),
            Some(_) => true,
            None => false,
        };
        if needs_qm {
            missing.extend(
                QM_KEYS
                    .iter()
                    .filter(|k| self.field(k).is_none())
                    .map(|k| k.to_string()),
            );
        }
        missing
    }

    pub fn validate(self, default_mode: TopologyModeKind) -> Result<RunConfig, PipelineError> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(PipelineError::MissingKey { keys: missing });
        }

        for key in self.unknown.keys() {
            warn!("Ignoring unrecognized config key '{}'", key);
        }

        let theory = TheoryLevel::parse(&text("level_of_theory", self.require("level_of_theory")?)?)?;

        let directory = expand_home(&text("directory", self.require("directory")?)?);

        let residues = ResidueGroups {
            complex: mask("complex_residues", self.require("complex_residues")?)?,
            receptor: mask("receptor_residues", self.require("receptor_residues")?)?,
            ligand: mask("ligand_residues", self.require("ligand_residues")?)?,
        };

        let frames = FrameWindow {
            start: integer("startframe", self.require("startframe")?)?,
            end: frame_end(self.require("endframe")?)?,
            interval: integer("interval", self.require("interval")?)?,
        };

        let igb = integer("igb", self.require("igb")?)?;
        let saltcon = number_text("saltcon", self.require("saltcon")?)?;
        let submit_job = coerce_bool(self.require("submit_job")?);

        let qm = if theory.is_mm() {
            None
        } else {
            Some(QmRegion {
                residues: mask("qm_residues", self.require("qm_residues")?)?,
                charge_complex: integer("qmcharge_com", self.require("qmcharge_com")?)?,
                charge_receptor: integer("qmcharge_rec", self.require("qmcharge_rec")?)?,
                charge_ligand: integer("qmcharge_lig", self.require("qmcharge_lig")?)?,
            })
        };

        let mask_mode = self
            .mmpbsa_mask_mode
            .as_ref()
            .map(MaskMode::from_value)
            .transpose()?;
        let requested_mode = self
            .topology_mode
            .as_ref()
            .map(|v| text("topology_mode", v).and_then(|s| TopologyModeKind::parse("topology_mode", &s)))
            .transpose()?;

        let topology = match (requested_mode, mask_mode) {
            (Some(TopologyModeKind::Explicit), Some(_)) => {
                warn!(
                    "'{}' is ignored because topology_mode is 'explicit'",
                    MaskMode::KEY
                );
                TopologyPlan::Explicit
            }
            (Some(TopologyModeKind::Explicit), None) => TopologyPlan::Explicit,
            (Some(TopologyModeKind::Complex), mode) | (None, mode @ Some(_)) => {
                TopologyPlan::SingleComplex {
                    mask_mode: mode.unwrap_or_default(),
                }
            }
            (None, None) => match default_mode {
                TopologyModeKind::Explicit => TopologyPlan::Explicit,
                TopologyModeKind::Complex => TopologyPlan::SingleComplex {
                    mask_mode: MaskMode::default(),
                },
            },
        };

        debug!(
            "Validated run configuration: theory={}, topology={:?}, submit={}",
            theory, topology, submit_job
        );

        Ok(RunConfig {
            directory,
            residues,
            theory,
            frames,
            igb,
            saltcon,
            submit_job,
            qm,
            topology,
        })
    }
}

/// Interprets a boolean-like value: native booleans, non-zero numbers, and the
/// strings `1`, `true`, `yes`, `y`, `t` (case-insensitive) are true.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => TRUE_TOKENS.contains(&s.trim().to_lowercase().as_str()),
        _ => false,
    }
}

fn text(key: &str, value: &Value) -> Result<String, PipelineError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(PipelineError::invalid(
            key,
            format!("expected a string, got {}", other),
        )),
    }
}

fn mask(key: &str, value: &Value) -> Result<ResidueMask, PipelineError> {
    ResidueMask::new(key, &text(key, value)?)
}

fn integer(key: &str, value: &Value) -> Result<i64, PipelineError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| {
                PipelineError::invalid(key, format!("expected a 64-bit signed integer, got {}", n))
            }),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| PipelineError::invalid(key, format!("expected an integer, got '{}'", s))),
        other => Err(PipelineError::invalid(
            key,
            format!("expected an integer, got {}", other),
        )),
    }
}

fn number_text(key: &str, value: &Value) -> Result<String, PipelineError> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) if s.trim().parse::<f64>().is_ok() => Ok(s.trim().to_string()),
        other => Err(PipelineError::invalid(
            key,
            format!("expected a number, got {}", other),
        )),
    }
}

fn frame_end(value: &Value) -> Result<FrameEnd, PipelineError> {
    if let Value::String(s) = value {
        if s.trim().eq_ignore_ascii_case("last") {
            return Ok(FrameEnd::Last);
        }
    }
    match integer("endframe", value)? {
        -1 => Ok(FrameEnd::Last),
        n => Ok(FrameEnd::Frame(n)),
    }
}

fn expand_home(raw: &str) -> PathBuf {
    let raw = raw.trim();
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };
    match (rest, directories::BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(raw),
    }
}

use crate::engine::error::PipelineError;
use serde_json::Value;
use std::fmt;

/// A residue selection expression such as `1-300,305`.
///
/// The expression is passed through to the analysis tool and the solver without
/// interpretation. The only check performed is that it fits on a single line of a
/// generated script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueMask(String);

impl ResidueMask {
    pub fn new(key: &str, raw: &str) -> Result<Self, PipelineError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::invalid(key, "residue mask is empty"));
        }
        if trimmed.contains(['\n', '\r']) {
            return Err(PipelineError::invalid(
                key,
                "residue mask must not contain line breaks",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Analysis-tool expression selecting every atom outside these residues.
    pub fn complement(&self) -> String {
        format!("!(:{})", self.0)
    }

    /// Solver-side atom mask selecting exactly these residues.
    pub fn residue_selector(&self) -> String {
        format!(":{}", self.0)
    }
}

impl fmt::Display for ResidueMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction in which the solver splits a single complex topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    /// `m`: strip the ligand residues from the complex to obtain the receptor.
    #[default]
    StripLigand,
    /// `n`: strip the receptor residues from the complex to obtain the ligand.
    StripReceptor,
}

impl MaskMode {
    pub const KEY: &'static str = "mmpbsa_mask_mode";

    pub fn solver_flag(self) -> &'static str {
        match self {
            MaskMode::StripLigand => "-m",
            MaskMode::StripReceptor => "-n",
        }
    }

    /// Parses a mask-mode value given as a string (`"m"`, `"n"`) or a list of such
    /// strings. Requesting both directions at once is rejected.
    pub fn from_value(value: &Value) -> Result<Self, PipelineError> {
        let raw_tokens: Vec<String> = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(PipelineError::invalid(
                        Self::KEY,
                        format!("expected a string token, got {}", other),
                    )),
                })
                .collect::<Result<_, _>>()?,
            other => {
                return Err(PipelineError::invalid(
                    Self::KEY,
                    format!("expected \"m\" or \"n\", got {}", other),
                ));
            }
        };

        let mut strip_ligand = false;
        let mut strip_receptor = false;

        for raw in &raw_tokens {
            for token in raw
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
            {
                match token.to_ascii_lowercase().as_str() {
                    "m" => strip_ligand = true,
                    "n" => strip_receptor = true,
                    "mn" | "nm" | "both" => {
                        strip_ligand = true;
                        strip_receptor = true;
                    }
                    _ => {
                        return Err(PipelineError::invalid(
                            Self::KEY,
                            format!("unrecognized token '{}', expected \"m\" or \"n\"", token),
                        ));
                    }
                }
            }
        }

        match (strip_ligand, strip_receptor) {
            (true, true) => Err(PipelineError::InvalidMaskMode {
                given: raw_tokens.join(","),
            }),
            (true, false) => Ok(MaskMode::StripLigand),
            (false, true) => Ok(MaskMode::StripReceptor),
            (false, false) => Err(PipelineError::invalid(Self::KEY, "no mask mode given")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mask_rejects_line_breaks_and_blank_input() {
        assert!(matches!(
            ResidueMask::new("ligand_residues", "301\nquit"),
            Err(PipelineError::InvalidValue { .. })
        ));
        assert!(matches!(
            ResidueMask::new("ligand_residues", "   "),
            Err(PipelineError::InvalidValue { .. })
        ));
    }

    #[test]
    fn complement_wraps_residue_selection() {
        let mask = ResidueMask::new("complex_residues", " 1-301 ").unwrap();
        assert_eq!(mask.as_str(), "1-301");
        assert_eq!(mask.complement(), "!(:1-301)");
        assert_eq!(mask.residue_selector(), ":1-301");
    }

    #[test]
    fn single_tokens_select_one_direction() {
        assert_eq!(
            MaskMode::from_value(&json!("m")).unwrap(),
            MaskMode::StripLigand
        );
        assert_eq!(
            MaskMode::from_value(&json!("N")).unwrap(),
            MaskMode::StripReceptor
        );
        assert_eq!(
            MaskMode::from_value(&json!(["n"])).unwrap(),
            MaskMode::StripReceptor
        );
    }

    #[test]
    fn both_directions_at_once_are_rejected() {
        for value in [json!("mn"), json!("m,n"), json!(["m", "n"]), json!("both")] {
            let result = MaskMode::from_value(&value);
            assert!(
                matches!(result, Err(PipelineError::InvalidMaskMode { .. })),
                "{value} should be rejected as conflicting"
            );
        }
    }

    #[test]
    fn unknown_tokens_are_invalid_values() {
        for value in [json!("x"), json!(""), json!(3), json!(["m", 1])] {
            let result = MaskMode::from_value(&value);
            assert!(
                matches!(result, Err(PipelineError::InvalidValue { .. })),
                "{value} should be an invalid value"
            );
        }
    }
}

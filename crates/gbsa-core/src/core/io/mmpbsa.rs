use crate::core::io::traits::ScriptFile;
use crate::core::models::config::{QmRegion, RunConfig, TheoryLevel};
use std::io::{self, Write};

/// Control file for the free-energy solver.
///
/// The text is a pure function of the theory level and the numeric parameters.
/// Values are written exactly as configured; the solver is the one to reject them.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverInput<'a> {
    pub igb: i64,
    pub saltcon: &'a str,
    pub quantum: Option<QuantumRegion<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantumRegion<'a> {
    pub theory_label: &'a str,
    pub region: &'a QmRegion,
}

impl<'a> SolverInput<'a> {
    pub fn from_config(config: &'a RunConfig) -> Self {
        let quantum = match (&config.theory, &config.qm) {
            (TheoryLevel::Quantum(label), Some(region)) => Some(QuantumRegion {
                theory_label: label,
                region,
            }),
            _ => None,
        };
        Self {
            igb: config.igb,
            saltcon: &config.saltcon,
            quantum,
        }
    }
}

impl ScriptFile for SolverInput<'_> {
    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        match self.quantum {
            None => writeln!(writer, "Input file for running MM-GBSA")?,
            Some(_) => writeln!(writer, "Input file for running QMMM-GBSA")?,
        }

        writeln!(writer, "&general")?;
        writeln!(writer, "   verbose=1,")?;
        writeln!(writer, "/")?;

        writeln!(writer, "&gb")?;
        writeln!(writer, "   igb={},", self.igb)?;
        writeln!(writer, "   saltcon={},", self.saltcon)?;
        if let Some(QuantumRegion {
            theory_label,
            region,
        }) = &self.quantum
        {
            writeln!(writer, "   ifqnt=1,")?;
            writeln!(writer, "   qm_theory=\"{}\",", theory_label)?;
            writeln!(writer, "   qm_residues=\"{}\",", region.residues)?;
            writeln!(writer, "   qmcharge_com={},", region.charge_complex)?;
            writeln!(writer, "   qmcharge_rec={},", region.charge_receptor)?;
            writeln!(writer, "   qmcharge_lig={},", region.charge_ligand)?;
        }
        writeln!(writer, "/")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::config::TopologyModeKind;
    use serde_json::json;

    fn config(level: &str) -> RunConfig {
        RunConfig::from_value(
            json!({
                "directory": "/sim/complex1",
                "complex_residues": "1-301",
                "receptor_residues": "1-300",
                "ligand_residues": "301",
                "level_of_theory": level,
                "startframe": 1,
                "endframe": 10,
                "interval": 1,
                "igb": 5,
                "saltcon": 0.15,
                "submit_job": false,
                "qm_residues": "301",
                "qmcharge_com": 0,
                "qmcharge_rec": 0,
                "qmcharge_lig": -1
            }),
            TopologyModeKind::Explicit,
        )
        .unwrap()
    }

    #[test]
    fn mm_input_has_no_quantum_fields() {
        let config = config("MM");
        let text = SolverInput::from_config(&config).render();
        assert_eq!(
            text,
            "Input file for running MM-GBSA\n\
             &general\n   verbose=1,\n/\n\
             &gb\n   igb=5,\n   saltcon=0.15,\n/\n"
        );
    }

    #[test]
    fn quantum_input_carries_region_and_charges() {
        let config = config("PM6");
        let text = SolverInput::from_config(&config).render();
        assert!(text.starts_with("Input file for running QMMM-GBSA\n"));
        assert!(text.contains("   ifqnt=1,\n"));
        assert!(text.contains("   qm_theory=\"PM6\",\n"));
        assert!(text.contains("   qm_residues=\"301\",\n"));
        assert!(text.contains("   qmcharge_com=0,\n"));
        assert!(text.contains("   qmcharge_rec=0,\n"));
        assert!(text.contains("   qmcharge_lig=-1,\n"));
        assert!(text.ends_with("/\n"));
    }

    #[test]
    fn quantum_label_is_substituted_verbatim() {
        let config = config("dftb3");
        let text = SolverInput::from_config(&config).render();
        assert!(text.contains("qm_theory=\"dftb3\""));
    }

    #[test]
    fn identical_parameters_render_identical_text() {
        let a = config("PM6");
        let b = config("PM6");
        assert_eq!(
            SolverInput::from_config(&a).render(),
            SolverInput::from_config(&b).render()
        );
    }
}

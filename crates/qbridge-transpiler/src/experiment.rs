//! Experiment categories of program types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of experiment a program type ultimately feeds into, derived
/// from which terminal node of the conversion graph it reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentType {
    /// Gate-based circuits.
    GateModel,
    /// Analog Hamiltonian simulation.
    Ahs,
    /// Quadratic unconstrained binary optimization.
    Annealing,
    /// Reaches no terminal.
    Other,
}

impl ExperimentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentType::GateModel => "gate_model",
            ExperimentType::Ahs => "ahs",
            ExperimentType::Annealing => "annealing",
            ExperimentType::Other => "other",
        }
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "gate_model" | "gate" => Ok(ExperimentType::GateModel),
            "ahs" => Ok(ExperimentType::Ahs),
            "annealing" | "qubo" => Ok(ExperimentType::Annealing),
            "other" => Ok(ExperimentType::Other),
            other => Err(format!("unknown experiment type '{other}'")),
        }
    }
}

//! `PropertySet` and related types for pass communication.
//!
//! Passes share the target basis and their findings through a
//! [`PropertySet`]. The decomposition pass records how many gates it replaced
//! ([`DecompositionStats`]); the verification pass records which gate names
//! fall outside the basis ([`BasisViolations`]).
//!
//! # Examples
//!
//! ```
//! use qbridge_compile::{BasisGates, PropertySet};
//!
//! let props = PropertySet::new().with_basis("rz,ry,cx".parse::<BasisGates>().unwrap());
//! assert!(props.basis_gates.as_ref().unwrap().contains("cx"));
//! ```

use std::any::{Any, TypeId};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

/// Target gate vocabulary for a rebase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisGates {
    /// Decompose everything decomposable and require nothing in particular.
    Any,
    /// A concrete, non-empty set of gate names.
    Gates(BTreeSet<String>),
}

impl BasisGates {
    /// The "any" basis.
    pub fn any() -> Self {
        BasisGates::Any
    }

    /// Create a concrete basis. Fails on an empty set or a blank name.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> CompileResult<Self> {
        let gates: BTreeSet<String> = gates.into_iter().map(Into::into).collect();
        if gates.is_empty() {
            return Err(CompileError::InvalidBasis(
                "basis gate set must not be empty".into(),
            ));
        }
        if let Some(bad) = gates.iter().find(|g| !is_gate_name(g)) {
            return Err(CompileError::InvalidBasis(format!(
                "'{bad}' is not a gate name"
            )));
        }
        Ok(BasisGates::Gates(gates))
    }

    /// Whether this is the "any" sentinel.
    pub fn is_any(&self) -> bool {
        matches!(self, BasisGates::Any)
    }

    /// Check if a gate is in the basis. Always false for `Any`, which names
    /// no gates.
    pub fn contains(&self, gate: &str) -> bool {
        match self {
            BasisGates::Any => false,
            BasisGates::Gates(gates) => gates.contains(gate),
        }
    }

    /// Whether a gate of this name should be expanded when a decomposition
    /// is known for it.
    pub fn wants_decomposition(&self, gate: &str) -> bool {
        !self.contains(gate)
    }

    /// Get the basis gates, empty for `Any`.
    pub fn gates(&self) -> Vec<&str> {
        match self {
            BasisGates::Any => vec![],
            BasisGates::Gates(gates) => gates.iter().map(String::as_str).collect(),
        }
    }

    /// Rotation plus CNOT basis every table decomposition bottoms out in.
    pub fn rotations() -> Self {
        BasisGates::from_static(&["rz", "ry", "cx", "s"])
    }

    /// IBM basis gates (RZ + SX + X + CX).
    pub fn ibm() -> Self {
        BasisGates::from_static(&["rz", "sx", "x", "cx", "id"])
    }

    /// IonQ native circuit gates.
    pub fn ionq() -> Self {
        BasisGates::from_static(&[
            "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "cx",
            "swap",
        ])
    }

    fn from_static(gates: &[&str]) -> Self {
        BasisGates::Gates(gates.iter().map(|g| (*g).to_string()).collect())
    }
}

fn is_gate_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for BasisGates {
    type Err = CompileError;

    /// Parse `"any"` (any case) or a comma separated list of gate names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("any") {
            return Ok(BasisGates::Any);
        }
        let names: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .collect();
        BasisGates::new(names)
    }
}

impl fmt::Display for BasisGates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisGates::Any => write!(f, "any"),
            BasisGates::Gates(gates) => {
                let names: Vec<&str> = gates.iter().map(String::as_str).collect();
                write!(f, "{{{}}}", names.join(", "))
            }
        }
    }
}

/// Number of gate statements the decomposition pass replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompositionStats {
    pub replaced: usize,
}

/// Gate names found outside the basis by the verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasisViolations(pub Vec<String>);

impl BasisViolations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Properties shared between compilation passes.
///
/// `basis_gates` has a dedicated field; anything else is stored by type with
/// [`insert`](Self::insert) and [`get`](Self::get), one value per type.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Target basis gates for decomposition and verification.
    pub basis_gates: Option<BasisGates>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target basis.
    #[must_use]
    pub fn with_basis(mut self, basis_gates: BasisGates) -> Self {
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}

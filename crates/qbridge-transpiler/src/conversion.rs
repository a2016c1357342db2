//! Conversion edges.
//!
//! A [`Conversion`] wraps a conversion function together with the metadata
//! the graph needs: source and target labels, a quality weight in `[0, 1]`
//! and a bias. The graph searches over the adjusted cost
//!
//! ```text
//! cost = ln(1 / weight) + bias        (weight 0 gives +inf)
//! ```
//!
//! so that the cheapest path is the one with the highest product of weights,
//! with `bias` charged once per hop.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BoxError, TranspileError, TranspileResult};
use crate::program::{Program, ProgramType};
use crate::types::TypeResolver;

/// Default bias added to every edge cost.
pub const DEFAULT_EDGE_BIAS: f64 = 0.25;

/// Where a conversion function comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionOrigin {
    /// Shipped with this crate.
    Builtin,
    /// Registered by a user or another crate.
    Extension,
}

type ConvertFn = dyn Fn(Program) -> Result<Program, BoxError> + Send + Sync;

/// A conversion function plus its declared metadata.
#[derive(Clone)]
pub struct ConversionFn {
    name: String,
    origin: ConversionOrigin,
    weight: Option<f64>,
    requirements: Vec<String>,
    func: Arc<ConvertFn>,
}

impl ConversionFn {
    /// An extension conversion with no declared weight.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(Program) -> Result<Program, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            origin: ConversionOrigin::Extension,
            weight: None,
            requirements: Vec::new(),
            func: Arc::new(func),
        }
    }

    /// A conversion shipped with this crate, declaring its weight.
    pub fn builtin(
        name: impl Into<String>,
        weight: f64,
        func: impl Fn(Program) -> Result<Program, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            origin: ConversionOrigin::Builtin,
            weight: Some(weight),
            ..Self::new(name, func)
        }
    }

    /// Declare the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Declare an external package this conversion needs.
    #[must_use]
    pub fn requires(mut self, package: impl Into<String>) -> Self {
        self.requirements.push(package.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> ConversionOrigin {
        self.origin
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    pub fn call(&self, program: Program) -> Result<Program, BoxError> {
        (self.func)(program)
    }
}

impl fmt::Debug for ConversionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionFn")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("weight", &self.weight)
            .field("requirements", &self.requirements)
            .finish_non_exhaustive()
    }
}

/// Answers whether an external package is available.
pub trait DependencyResolver: Send + Sync {
    fn is_available(&self, package: &str) -> bool;
}

/// The set of external packages available to conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    packages: BTreeSet<String>,
}

impl Environment {
    pub fn new(packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.packages.insert(package.into());
        self
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(String::as_str)
    }
}

impl DependencyResolver for Environment {
    fn is_available(&self, package: &str) -> bool {
        self.packages.contains(package)
    }
}

/// Edge cost for a weight and bias: `ln(1 / weight) + bias`, infinite for a
/// zero weight.
pub fn adjusted_cost(weight: f64, bias: f64) -> f64 {
    let cost = if weight == 0.0 {
        f64::INFINITY
    } else {
        (1.0 / weight).ln()
    };
    cost + bias
}

/// A directed, weighted conversion between two program types.
#[derive(Clone)]
pub struct Conversion {
    source: ProgramType,
    target: ProgramType,
    func: ConversionFn,
    weight: f64,
    bias: f64,
    cost: f64,
    native: bool,
    supported: bool,
}

impl Conversion {
    /// Create an edge with the function's declared weight (or 1.0) and the
    /// default bias.
    pub fn new(
        source: impl Into<ProgramType>,
        target: impl Into<ProgramType>,
        func: ConversionFn,
    ) -> TranspileResult<Self> {
        Self::builder(source, target, func).build()
    }

    pub fn builder(
        source: impl Into<ProgramType>,
        target: impl Into<ProgramType>,
        func: ConversionFn,
    ) -> ConversionBuilder {
        ConversionBuilder {
            source: source.into(),
            target: target.into(),
            func,
            weight: None,
            bias: DEFAULT_EDGE_BIAS,
        }
    }

    pub fn source(&self) -> &ProgramType {
        &self.source
    }

    pub fn target(&self) -> &ProgramType {
        &self.target
    }

    pub fn func(&self) -> &ConversionFn {
        &self.func
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Adjusted cost used as the graph edge weight.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn is_native(&self) -> bool {
        self.native
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Apply the conversion. Fails with [`TranspileError::TypeMismatch`] if
    /// the program is not of the source type; errors from the function are
    /// passed through as [`TranspileError::Conversion`].
    pub fn convert(&self, program: Program, types: &dyn TypeResolver) -> TranspileResult<Program> {
        let actual = types.resolve(&program)?;
        if actual != self.source {
            return Err(TranspileError::TypeMismatch {
                expected: self.source.clone(),
                actual,
            });
        }
        self.func.call(program).map_err(TranspileError::Conversion)
    }
}

impl PartialEq for Conversion {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.native == other.native
            && self.supported == other.supported
            && self.func.requirements == other.func.requirements
            && self.cost == other.cost
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("func", &self.func.name)
            .field("weight", &self.weight)
            .field("bias", &self.bias)
            .field("native", &self.native)
            .field("supported", &self.supported)
            .finish()
    }
}

/// Builder for [`Conversion`].
pub struct ConversionBuilder {
    source: ProgramType,
    target: ProgramType,
    func: ConversionFn,
    weight: Option<f64>,
    bias: f64,
}

impl ConversionBuilder {
    /// Override the function's declared weight.
    #[must_use]
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Build against an empty [`Environment`].
    pub fn build(self) -> TranspileResult<Conversion> {
        self.build_in(&Environment::default())
    }

    /// Build, checking requirements against `deps`.
    pub fn build_in(self, deps: &dyn DependencyResolver) -> TranspileResult<Conversion> {
        if self.source == self.target {
            return Err(TranspileError::InvalidConversion(format!(
                "source and target are both '{}'",
                self.source
            )));
        }

        let weight = self.weight.or(self.func.weight).unwrap_or(1.0);
        if !(0.0..=1.0).contains(&weight) {
            return Err(TranspileError::InvalidWeight(weight));
        }
        if !self.bias.is_finite() {
            return Err(TranspileError::InvalidBias(self.bias));
        }

        let native = self.func.origin == ConversionOrigin::Builtin
            && self.func.requirements.is_empty()
            && self.func.weight.is_some();
        let supported = native
            || self
                .func
                .requirements
                .iter()
                .all(|package| deps.is_available(package));

        Ok(Conversion {
            cost: adjusted_cost(weight, self.bias),
            source: self.source,
            target: self.target,
            func: self.func,
            weight,
            bias: self.bias,
            native,
            supported,
        })
    }
}

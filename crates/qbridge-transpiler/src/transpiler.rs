//! Transpile driver.
//!
//! A request goes through four stages:
//!
//! 1. Resolve the program's type. A program already of the target type is
//!    returned as a copy.
//! 2. Ask the graph for the `max_path_attempts` shortest paths (by hop
//!    count), dropping those longer than `max_path_depth`.
//! 3. Run each path on its own copy of the program. When a conversion
//!    function fails and the intermediate type has a decomposer, the
//!    intermediate program is decomposed and the step is retried once.
//! 4. If every path fails, report all of them in one error.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::TranspilerConfig;
use crate::conversion::Conversion;
use crate::error::{PathAttempt, TranspileError, TranspileResult, error_chain};
use crate::graph::{ConversionGraph, render_path};
use crate::program::{Program, ProgramType};
use crate::registry::ConversionRegistry;
use crate::scheme::ConversionScheme;
use crate::types::{ProgramTypeRegistry, TypeResolver};

/// Converts programs between types along paths of the conversion graph.
#[derive(Debug, Clone)]
pub struct Transpiler {
    types: Arc<ProgramTypeRegistry>,
    graph: ConversionGraph,
    scheme: ConversionScheme,
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Transpiler {
    /// Built-in types and conversions, default scheme.
    pub fn new() -> Self {
        Self {
            types: Arc::new(ProgramTypeRegistry::builtin()),
            graph: ConversionGraph::new(),
            scheme: ConversionScheme::default(),
        }
    }

    /// Build types, graph and scheme from a configuration.
    pub fn from_config(config: &TranspilerConfig) -> TranspileResult<Self> {
        let invalid = |e: crate::config::ConfigError| TranspileError::InvalidConfig(e.to_string());
        let scheme = config.scheme().map_err(invalid)?;

        let types = Arc::new(ProgramTypeRegistry::builtin());
        let mut graph = ConversionGraph::from_registry(
            Arc::new(ConversionRegistry::builtin()),
            config.environment(),
            config.graph_options(),
        )?;
        if config.graph.include_isolated {
            for label in types.labels() {
                graph.add_node(label.clone());
            }
        }

        Ok(Self {
            types,
            graph,
            scheme,
        })
    }

    #[must_use]
    pub fn with_types(mut self, types: Arc<ProgramTypeRegistry>) -> Self {
        self.types = types;
        self
    }

    #[must_use]
    pub fn with_graph(mut self, graph: ConversionGraph) -> Self {
        self.graph = graph;
        self
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: ConversionScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn types(&self) -> &ProgramTypeRegistry {
        &self.types
    }

    pub fn graph(&self) -> &ConversionGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ConversionGraph {
        &mut self.graph
    }

    pub fn scheme(&self) -> &ConversionScheme {
        &self.scheme
    }

    pub fn scheme_mut(&mut self) -> &mut ConversionScheme {
        &mut self.scheme
    }

    /// The graph searched for paths: the scheme's if it has one.
    pub fn active_graph(&self) -> &ConversionGraph {
        self.scheme.graph().unwrap_or(&self.graph)
    }

    /// Convert `program` to `target`. The input is never modified.
    #[instrument(skip(self, program))]
    pub fn transpile(&self, program: &Program, target: &str) -> TranspileResult<Program> {
        let source = self.types.resolve(program)?;
        if source.as_str() == target {
            debug!("Program is already of type {}", target);
            return Ok(program.clone());
        }

        let paths = self.candidate_paths(&source, target)?;
        info!(
            "Trying {} path(s) from {} to {}",
            paths.len(),
            source,
            target
        );

        let mut attempts = Vec::with_capacity(paths.len());
        for path in &paths {
            let rendered = render_path(path);
            match self.run_path(program.clone(), path) {
                Ok(converted) => {
                    info!("Converted along {}", rendered);
                    return Ok(converted);
                }
                Err(err) => {
                    let error = error_chain(&err);
                    warn!("Path {} failed: {}", rendered, error);
                    attempts.push(PathAttempt {
                        path: rendered,
                        error,
                    });
                }
            }
        }

        Err(TranspileError::AllPathsFailed {
            from: source,
            to: target.into(),
            attempts,
        })
    }

    /// Convert through each of `targets` in turn.
    pub fn translate(&self, program: &Program, targets: &[&str]) -> TranspileResult<Program> {
        targets
            .iter()
            .try_fold(program.clone(), |current, target| self.transpile(&current, target))
    }

    fn candidate_paths(&self, source: &ProgramType, target: &str) -> TranspileResult<Vec<Vec<Conversion>>> {
        let graph = self.active_graph();
        let mut paths = graph.find_top_shortest_conversion_paths(
            source.as_str(),
            target,
            self.scheme.max_path_attempts(),
        )?;

        if let Some(max_depth) = self.scheme.max_path_depth() {
            paths.retain(|path| path.len() <= max_depth);
            if paths.is_empty() {
                return Err(TranspileError::NoPathWithinDepth {
                    from: source.clone(),
                    to: target.into(),
                    max_depth,
                });
            }
        }
        Ok(paths)
    }

    fn run_path(&self, mut program: Program, path: &[Conversion]) -> TranspileResult<Program> {
        for conversion in path {
            program = self.apply(conversion, program)?;
        }
        Ok(program)
    }

    fn apply(&self, conversion: &Conversion, program: Program) -> TranspileResult<Program> {
        let label = conversion.source();
        let backup = self
            .types
            .has_decomposer(label.as_str())
            .then(|| program.clone());

        match conversion.convert(program, self.types.as_ref()) {
            Err(err) if err.is_retryable() => {
                let Some(original) = backup else {
                    return Err(err);
                };
                debug!("Retrying {} after decomposition: {}", conversion, err);
                let decomposed = self.types.decompose(label, original)?;
                conversion.convert(decomposed, self.types.as_ref())
            }
            result => result,
        }
    }
}

/// Convert `program` to `target` with the built-in types and conversions.
pub fn transpile(program: &Program, target: &str) -> TranspileResult<Program> {
    Transpiler::new().transpile(program, target)
}

/// Convert `program` through each of `targets` with the built-in types and
/// conversions.
pub fn translate(program: &Program, targets: &[&str]) -> TranspileResult<Program> {
    Transpiler::new().translate(program, targets)
}

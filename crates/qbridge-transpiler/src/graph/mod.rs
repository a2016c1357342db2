//! Conversion graph.
//!
//! The graph is a directed graph whose nodes are program-type labels and
//! whose edges are [`Conversion`]s, weighted by their adjusted cost. It is
//! built once from a [`ConversionRegistry`], keeping only conversions that
//! are supported in the graph's [`Environment`] (and native ones only, when
//! [`GraphOptions::require_native`] is set).
//!
//! ## Invariants
//!
//! - At most one edge per `(source, target)` pair.
//! - The node set is the union of edge endpoints and the explicitly
//!   requested nodes ([`ConversionGraph::add_node`]). Removing an edge also
//!   removes endpoints it leaves isolated, unless they were requested.

mod capability;
mod paths;

pub use paths::render_path;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use petgraph::dot::{Config, Dot};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conversion::{Conversion, DEFAULT_EDGE_BIAS, Environment};
use crate::error::{TranspileError, TranspileResult};
use crate::experiment::ExperimentType;
use crate::program::ProgramType;
use crate::registry::ConversionRegistry;

/// Options applied when building a graph from a registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphOptions {
    /// Bias added to the cost of every registry edge.
    pub edge_bias: f64,
    /// Keep native conversions only.
    pub require_native: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            edge_bias: DEFAULT_EDGE_BIAS,
            require_native: false,
        }
    }
}

/// Terminal nodes and the experiment type they stand for.
fn default_terminals() -> BTreeMap<ProgramType, ExperimentType> {
    [
        ("qasm2", ExperimentType::GateModel),
        ("qasm3", ExperimentType::GateModel),
        ("ionq", ExperimentType::GateModel),
        ("ahs", ExperimentType::Ahs),
        ("qubo", ExperimentType::Annealing),
    ]
    .into_iter()
    .map(|(label, kind)| (ProgramType::from(label), kind))
    .collect()
}

/// Directed graph of conversions between program types.
#[derive(Clone)]
pub struct ConversionGraph {
    graph: StableDiGraph<ProgramType, Conversion>,
    nodes: FxHashMap<ProgramType, NodeIndex>,
    requested: BTreeSet<ProgramType>,
    terminals: BTreeMap<ProgramType, ExperimentType>,
    registry: Arc<ConversionRegistry>,
    environment: Environment,
    options: GraphOptions,
}

impl Default for ConversionGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionGraph {
    /// Graph of the built-in conversions.
    pub fn new() -> Self {
        let mut graph = Self::empty(
            Arc::new(ConversionRegistry::builtin()),
            Environment::default(),
            GraphOptions::default(),
        );
        graph.rebuild(None);
        graph
    }

    /// Graph of every conversion in `registry` that is supported in
    /// `environment`.
    pub fn from_registry(
        registry: Arc<ConversionRegistry>,
        environment: Environment,
        options: GraphOptions,
    ) -> TranspileResult<Self> {
        if !options.edge_bias.is_finite() {
            return Err(TranspileError::InvalidBias(options.edge_bias));
        }
        let mut graph = Self::empty(registry, environment, options);
        graph.rebuild(None);
        Ok(graph)
    }

    /// Graph of the given edges. A later edge replaces an earlier one with
    /// the same endpoints; [`reset`](Self::reset) without arguments falls
    /// back to the built-in conversions.
    pub fn from_conversions(conversions: impl IntoIterator<Item = Conversion>) -> Self {
        let mut graph = Self::empty(
            Arc::new(ConversionRegistry::builtin()),
            Environment::default(),
            GraphOptions::default(),
        );
        graph.rebuild(Some(conversions.into_iter().collect()));
        graph
    }

    fn empty(registry: Arc<ConversionRegistry>, environment: Environment, options: GraphOptions) -> Self {
        Self {
            graph: StableDiGraph::default(),
            nodes: FxHashMap::default(),
            requested: BTreeSet::new(),
            terminals: default_terminals(),
            registry,
            environment,
            options,
        }
    }

    fn accepts(&self, conversion: &Conversion) -> bool {
        conversion.is_supported() && (!self.options.require_native || conversion.is_native())
    }

    fn registry_conversions(&self) -> Vec<Conversion> {
        self.registry
            .iter()
            .filter_map(|(source, target, func)| {
                Conversion::builder(source.clone(), target.clone(), func.clone())
                    .bias(self.options.edge_bias)
                    .build_in(&self.environment)
                    .inspect_err(|e| warn!("Skipping conversion '{}': {}", func.name(), e))
                    .ok()
            })
            .collect()
    }

    fn rebuild(&mut self, conversions: Option<Vec<Conversion>>) {
        let conversions = conversions.unwrap_or_else(|| self.registry_conversions());

        self.graph.clear();
        self.nodes.clear();
        for conversion in conversions {
            if self.accepts(&conversion) {
                self.insert(conversion);
            } else {
                debug!("Excluding unsupported conversion: {}", conversion);
            }
        }
        for label in self.requested.clone() {
            self.node_index(&label);
        }

        debug!(
            "Built conversion graph: {} nodes, {} edges",
            self.node_count(),
            self.edge_count()
        );
    }

    fn node_index(&mut self, label: &ProgramType) -> NodeIndex {
        if let Some(&index) = self.nodes.get(label) {
            return index;
        }
        let index = self.graph.add_node(label.clone());
        self.nodes.insert(label.clone(), index);
        index
    }

    fn insert(&mut self, conversion: Conversion) {
        let a = self.node_index(conversion.source());
        let b = self.node_index(conversion.target());
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge] = conversion,
            None => {
                self.graph.add_edge(a, b, conversion);
            }
        }
    }

    pub(crate) fn index(&self, label: &str) -> TranspileResult<NodeIndex> {
        self.nodes
            .get(label)
            .copied()
            .ok_or_else(|| TranspileError::NodeNotFound(label.into()))
    }

    pub(crate) fn inner(&self) -> &StableDiGraph<ProgramType, Conversion> {
        &self.graph
    }

    /// Add a node even if no edge touches it. The node survives edge
    /// removal and [`reset`](Self::reset).
    pub fn add_node(&mut self, label: impl Into<ProgramType>) {
        let label = label.into();
        self.node_index(&label);
        self.requested.insert(label);
    }

    /// Declare `label` a terminal node of the given experiment type.
    pub fn set_terminal(&mut self, label: impl Into<ProgramType>, kind: ExperimentType) {
        self.terminals.insert(label.into(), kind);
    }

    pub fn terminals(&self) -> &BTreeMap<ProgramType, ExperimentType> {
        &self.terminals
    }

    pub fn has_node(&self, label: &str) -> bool {
        self.nodes.contains_key(label)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.get_conversion(source, target).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node labels, sorted.
    pub fn nodes(&self) -> Vec<&ProgramType> {
        let mut labels: Vec<_> = self.graph.node_indices().map(|i| &self.graph[i]).collect();
        labels.sort();
        labels
    }

    /// Edges, sorted by `(source, target)`.
    pub fn conversions(&self) -> Vec<&Conversion> {
        let mut edges: Vec<_> = self.graph.edge_references().map(|e| e.weight()).collect();
        edges.sort_by(|a, b| (a.source(), a.target()).cmp(&(b.source(), b.target())));
        edges
    }

    pub fn get_conversion(&self, source: &str, target: &str) -> Option<&Conversion> {
        let a = *self.nodes.get(source)?;
        let b = *self.nodes.get(target)?;
        self.graph.find_edge(a, b).map(|edge| &self.graph[edge])
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Add an edge. Fails with [`TranspileError::ConversionExists`] if the
    /// pair is already connected, unless `overwrite` is set.
    pub fn add_conversion(&mut self, conversion: Conversion, overwrite: bool) -> TranspileResult<()> {
        if !overwrite && self.has_edge(conversion.source().as_str(), conversion.target().as_str()) {
            return Err(TranspileError::ConversionExists {
                from: conversion.source().clone(),
                to: conversion.target().clone(),
            });
        }
        debug!("Adding conversion: {}", conversion);
        self.insert(conversion);
        Ok(())
    }

    /// Remove the edge between two labels and return it.
    pub fn remove_conversion(&mut self, source: &str, target: &str) -> TranspileResult<Conversion> {
        let not_found = || TranspileError::EdgeNotFound {
            from: source.into(),
            to: target.into(),
        };
        let a = *self.nodes.get(source).ok_or_else(not_found)?;
        let b = *self.nodes.get(target).ok_or_else(not_found)?;
        let edge = self.graph.find_edge(a, b).ok_or_else(not_found)?;
        let removed = self.graph.remove_edge(edge).ok_or_else(not_found)?;

        debug!("Removed conversion: {}", removed);
        for index in [a, b] {
            self.prune_if_orphaned(index);
        }
        Ok(removed)
    }

    fn prune_if_orphaned(&mut self, index: NodeIndex) {
        let Some(label) = self.graph.node_weight(index).cloned() else {
            return;
        };
        let isolated = self.graph.neighbors_undirected(index).next().is_none();
        if isolated && !self.requested.contains(&label) {
            self.graph.remove_node(index);
            self.nodes.remove(&label);
        }
    }

    /// A graph keeping the edges and requested nodes that pass the filters.
    /// Edges need both endpoints kept.
    pub(crate) fn restricted(
        &self,
        keep_node: impl Fn(&ProgramType) -> bool,
        keep_edge: impl Fn(&Conversion) -> bool,
    ) -> Self {
        let mut out = Self::empty(self.registry.clone(), self.environment.clone(), self.options);
        out.terminals = self.terminals.clone();
        for edge in self.graph.edge_references() {
            let conversion = edge.weight();
            if keep_node(conversion.source()) && keep_node(conversion.target()) && keep_edge(conversion) {
                out.insert(conversion.clone());
            }
        }
        for label in self.requested.iter().filter(|label| keep_node(label)) {
            out.add_node(label.clone());
        }
        out
    }

    /// Deep structural clone.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Rebuild from `conversions`, or from the graph's registry when `None`.
    /// Requested nodes are kept.
    pub fn reset(&mut self, conversions: Option<Vec<Conversion>>) {
        self.rebuild(conversions);
    }

    /// Render the graph in Graphviz DOT format, labelling edges with their
    /// weights.
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::EdgeNoLabel],
            &|_, edge| {
                let conversion = edge.weight();
                let style = if conversion.is_native() { "solid" } else { "dashed" };
                format!("label = \"{:.2}\" style = {style}", conversion.weight())
            },
            &|_, _| String::new(),
        );
        dot.to_string()
    }
}

impl PartialEq for ConversionGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes() == other.nodes() && self.conversions() == other.conversions()
    }
}

impl fmt::Debug for ConversionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edges: Vec<String> = self
            .graph
            .edge_references()
            .map(|e| e.weight().to_string())
            .collect();
        f.debug_struct("ConversionGraph")
            .field("nodes", &self.nodes())
            .field("edges", &edges)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionFn;

    fn edge(a: &str, b: &str) -> Conversion {
        Conversion::new(a, b, ConversionFn::new(format!("{a}_to_{b}"), Ok)).unwrap()
    }

    #[test]
    fn test_builtin_graph() {
        let graph = ConversionGraph::new();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 5);
        assert!(graph.has_edge("qasm2", "qasm3"));
        assert!(graph.has_edge("qasm3", "ionq"));
        assert!(!graph.has_edge("ionq", "qasm3"));
        assert!(!graph.has_node("cirq"));
    }

    #[test]
    fn test_unsupported_conversions_excluded() {
        let mut registry = ConversionRegistry::new();
        registry.register("a", "b", ConversionFn::new("a_to_b", Ok).requires("cirq"));
        registry.register("b", "c", ConversionFn::new("b_to_c", Ok));
        let registry = Arc::new(registry);

        let graph =
            ConversionGraph::from_registry(registry.clone(), Environment::default(), GraphOptions::default())
                .unwrap();
        assert!(!graph.has_node("a"));
        assert!(graph.has_edge("b", "c"));

        let graph = ConversionGraph::from_registry(
            registry.clone(),
            Environment::new(["cirq"]),
            GraphOptions::default(),
        )
        .unwrap();
        assert!(graph.has_edge("a", "b"));

        let native_only = GraphOptions {
            require_native: true,
            ..GraphOptions::default()
        };
        let graph = ConversionGraph::from_registry(registry, Environment::new(["cirq"]), native_only).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_invalid_bias_rejected() {
        let options = GraphOptions {
            edge_bias: f64::NAN,
            require_native: false,
        };
        assert!(matches!(
            ConversionGraph::from_registry(Arc::default(), Environment::default(), options),
            Err(TranspileError::InvalidBias(_))
        ));
    }

    #[test]
    fn test_add_conversion_overwrite() {
        let mut graph = ConversionGraph::from_conversions([edge("a", "b")]);
        assert!(matches!(
            graph.add_conversion(edge("a", "b"), false),
            Err(TranspileError::ConversionExists { .. })
        ));

        let heavier = Conversion::builder("a", "b", ConversionFn::new("a_to_b", Ok))
            .weight(0.5)
            .build()
            .unwrap();
        graph.add_conversion(heavier, true).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.get_conversion("a", "b").unwrap().weight(), 0.5);
    }

    #[test]
    fn test_remove_prunes_orphans() {
        let mut graph = ConversionGraph::from_conversions([edge("a", "b"), edge("b", "c")]);
        graph.add_node("c");

        let removed = graph.remove_conversion("b", "c").unwrap();
        assert_eq!(removed.to_string(), "b -> c");
        assert!(graph.has_node("b"));
        assert!(graph.has_node("c"));

        graph.remove_conversion("a", "b").unwrap();
        assert!(!graph.has_node("a"));
        assert!(!graph.has_node("b"));
        assert_eq!(graph.nodes(), [&ProgramType::from("c")]);

        assert!(matches!(
            graph.remove_conversion("a", "b"),
            Err(TranspileError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn test_reset() {
        let mut graph = ConversionGraph::from_conversions([edge("a", "b")]);
        graph.add_node("z");
        graph.reset(Some(vec![edge("x", "y")]));
        assert!(graph.has_edge("x", "y"));
        assert!(!graph.has_node("a"));
        assert!(graph.has_node("z"));

        graph.reset(None);
        assert!(graph.has_edge("qasm2", "qasm3"));
        assert!(graph.has_node("z"));
    }

    #[test]
    fn test_copy_is_independent() {
        let graph = ConversionGraph::from_conversions([edge("a", "b")]);
        let mut copy = graph.copy();
        assert_eq!(copy, graph);
        copy.add_conversion(edge("b", "c"), false).unwrap();
        assert_ne!(copy, graph);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_to_dot() {
        let dot = ConversionGraph::from_conversions([edge("a", "b")]).to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("\"a\""));
        assert!(dot.contains("label = \"1.00\""));
    }
}

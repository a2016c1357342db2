//! Conversion schemes.
//!
//! A [`ConversionScheme`] bundles the settings of a transpile request: an
//! optional graph to search instead of the transpiler's own, how many
//! candidate paths to try, and how long a path may be.
//! [`ConversionScheme::update_graph_for_target`] narrows the graph down to
//! the part that can reach a set of targets within the depth limit.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use petgraph::Direction;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::error::TranspileResult;
use crate::graph::ConversionGraph;
use crate::program::ProgramType;

/// Paths tried per request unless configured otherwise.
pub const DEFAULT_MAX_PATH_ATTEMPTS: usize = 3;

/// Settings of a transpile request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionScheme {
    graph: Option<ConversionGraph>,
    max_path_attempts: usize,
    max_path_depth: Option<usize>,
    options: Map<String, Value>,
}

impl Default for ConversionScheme {
    fn default() -> Self {
        Self {
            graph: None,
            max_path_attempts: DEFAULT_MAX_PATH_ATTEMPTS,
            max_path_depth: None,
            options: Map::new(),
        }
    }
}

impl ConversionScheme {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_graph(mut self, graph: ConversionGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    #[must_use]
    pub fn with_max_path_attempts(mut self, attempts: usize) -> Self {
        self.max_path_attempts = attempts;
        self
    }

    /// Limit paths to `depth` conversions; `None` is unbounded.
    #[must_use]
    pub fn with_max_path_depth(mut self, depth: Option<usize>) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Set a free-form option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn graph(&self) -> Option<&ConversionGraph> {
        self.graph.as_ref()
    }

    pub fn max_path_attempts(&self) -> usize {
        self.max_path_attempts
    }

    pub fn max_path_depth(&self) -> Option<usize> {
        self.max_path_depth
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    /// The scheme's settings as JSON. The graph is summarized by its size.
    pub fn to_json(&self) -> Value {
        json!({
            "max_path_attempts": self.max_path_attempts,
            "max_path_depth": self.max_path_depth,
            "options": self.options,
            "graph": self.graph.as_ref().map(|g| json!({
                "nodes": g.node_count(),
                "edges": g.edge_count(),
            })),
        })
    }

    /// Replace the scheme's graph with the part of it (or of the default
    /// graph, if the scheme has none) that leads to `targets`.
    ///
    /// Edges out of a target are dropped, and an edge is kept only if some
    /// path of at most `max_path_depth` conversions runs through it to a
    /// target. The targets stay in the graph even if nothing reaches them.
    pub fn update_graph_for_target(&mut self, targets: &[ProgramType]) -> TranspileResult<&ConversionGraph> {
        let base = self.graph.take().unwrap_or_default();
        let hops = match find_nodes_reachable_within_max_edges(&base, targets, self.max_path_depth) {
            Ok(hops) => hops,
            Err(err) => {
                self.graph = Some(base);
                return Err(err);
            }
        };

        let target_set: BTreeSet<&ProgramType> = targets.iter().collect();
        let depth = self.max_path_depth;
        let mut pruned = base.restricted(
            |label| hops.contains_key(label),
            |conversion| {
                !target_set.contains(conversion.source())
                    && hops
                        .get(conversion.target())
                        .is_some_and(|&distance| depth.is_none_or(|d| distance < d))
            },
        );
        for target in targets {
            pruned.add_node(target.clone());
        }

        info!(
            "Pruned conversion graph for {:?}: {} -> {} edges",
            targets.iter().map(ProgramType::as_str).collect::<Vec<_>>(),
            base.edge_count(),
            pruned.edge_count()
        );
        Ok(&*self.graph.insert(pruned))
    }
}

/// Nodes that reach one of `targets` in at most `max_edges` conversions,
/// with their distance to the nearest target. `None` means no limit.
pub fn find_nodes_reachable_within_max_edges(
    graph: &ConversionGraph,
    targets: &[ProgramType],
    max_edges: Option<usize>,
) -> TranspileResult<BTreeMap<ProgramType, usize>> {
    let limit = max_edges.unwrap_or(graph.edge_count());
    let inner = graph.inner();

    let mut hops = FxHashMap::default();
    let mut queue = VecDeque::new();
    for target in targets {
        let index = graph.index(target.as_str())?;
        if hops.insert(index, 0).is_none() {
            queue.push_back((index, 0));
        }
    }

    while let Some((node, distance)) = queue.pop_front() {
        if distance == limit {
            continue;
        }
        for predecessor in inner.neighbors_directed(node, Direction::Incoming) {
            if !hops.contains_key(&predecessor) {
                hops.insert(predecessor, distance + 1);
                queue.push_back((predecessor, distance + 1));
            }
        }
    }

    debug!("{} node(s) reach the targets within {} edge(s)", hops.len(), limit);
    Ok(hops
        .into_iter()
        .map(|(index, distance)| (inner[index].clone(), distance))
        .collect())
}

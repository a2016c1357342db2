//! Path queries.

use petgraph::algo::{all_simple_paths, astar, dijkstra, has_path_connecting};
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::ConversionGraph;
use crate::conversion::Conversion;
use crate::error::{TranspileError, TranspileResult};
use crate::program::ProgramType;

/// Render a path as `a -> b -> c`. An empty path renders as an empty string.
pub fn render_path(path: &[Conversion]) -> String {
    let Some(first) = path.first() else {
        return String::new();
    };
    std::iter::once(first.source())
        .chain(path.iter().map(Conversion::target))
        .map(ProgramType::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ConversionGraph {
    /// Whether `target` is reachable from `source`. A label always reaches
    /// itself, even when it is not in the graph.
    pub fn has_path(&self, source: &str, target: &str) -> TranspileResult<bool> {
        if source == target {
            return Ok(true);
        }
        let a = self.index(source)?;
        let b = self.index(target)?;
        Ok(has_path_connecting(&self.graph, a, b, None))
    }

    /// The path of minimum total adjusted cost.
    pub fn find_shortest_conversion_path(
        &self,
        source: &str,
        target: &str,
    ) -> TranspileResult<Vec<Conversion>> {
        let a = self.index(source)?;
        let b = self.index(target)?;
        let (_, nodes) = astar(&self.graph, a, |n| n == b, |e| e.weight().cost(), |_| 0.0)
            .ok_or_else(|| TranspileError::NoPath {
                from: source.into(),
                to: target.into(),
            })?;
        Ok(self.edges_along(&nodes))
    }

    /// Up to `k` simple paths, fewest hops first. Paths of equal length keep
    /// their discovery order; cost is not considered.
    pub fn find_top_shortest_conversion_paths(
        &self,
        source: &str,
        target: &str,
        k: usize,
    ) -> TranspileResult<Vec<Vec<Conversion>>> {
        let a = self.index(source)?;
        let b = self.index(target)?;
        if a == b {
            return Ok(vec![Vec::new()]);
        }

        let mut paths: Vec<Vec<NodeIndex>> =
            all_simple_paths::<Vec<_>, _>(&self.graph, a, b, 0, None).collect();
        if paths.is_empty() {
            return Err(TranspileError::NoPath {
                from: source.into(),
                to: target.into(),
            });
        }
        paths.sort_by_key(Vec::len);

        Ok(paths
            .into_iter()
            .take(k)
            .map(|nodes| self.edges_along(&nodes))
            .collect())
    }

    /// The minimum-cost path rendered as `a -> b -> c`.
    pub fn shortest_path(&self, source: &str, target: &str) -> TranspileResult<String> {
        let path = self.find_shortest_conversion_path(source, target)?;
        if path.is_empty() {
            return Ok(source.to_string());
        }
        Ok(render_path(&path))
    }

    /// Every simple path, rendered, fewest hops first.
    pub fn all_paths(&self, source: &str, target: &str) -> TranspileResult<Vec<String>> {
        Ok(self
            .find_top_shortest_conversion_paths(source, target, usize::MAX)?
            .iter()
            .map(|path| render_path(path))
            .collect())
    }

    /// The candidate reachable from `source` in the fewest hops; ties go to
    /// the earlier candidate.
    pub fn closest_target(&self, source: &str, candidates: &[ProgramType]) -> Option<ProgramType> {
        let start = *self.nodes.get(source)?;
        let hops = dijkstra(&self.graph, start, None, |_| 1usize);

        candidates
            .iter()
            .filter_map(|candidate| {
                let index = self.nodes.get(candidate.as_str())?;
                hops.get(index).map(|&distance| (candidate, distance))
            })
            .min_by_key(|&(_, distance)| distance)
            .map(|(candidate, _)| candidate.clone())
    }

    fn edges_along(&self, nodes: &[NodeIndex]) -> Vec<Conversion> {
        nodes
            .windows(2)
            .filter_map(|pair| self.graph.find_edge(pair[0], pair[1]))
            .map(|edge| self.graph[edge].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionFn;

    fn edge(a: &str, b: &str, weight: f64) -> Conversion {
        Conversion::builder(a, b, ConversionFn::new(format!("{a}_to_{b}"), Ok))
            .weight(weight)
            .build()
            .unwrap()
    }

    fn labels(candidates: &[&str]) -> Vec<ProgramType> {
        candidates.iter().map(|&c| ProgramType::from(c)).collect()
    }

    #[test]
    fn test_has_path() {
        let graph = ConversionGraph::from_conversions([edge("a", "b", 1.0), edge("b", "c", 1.0)]);
        assert!(graph.has_path("a", "c").unwrap());
        assert!(!graph.has_path("c", "a").unwrap());
        assert!(graph.has_path("zzz", "zzz").unwrap());
        assert!(matches!(
            graph.has_path("a", "zzz"),
            Err(TranspileError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_top_paths_ordered_by_hops_not_cost() {
        let graph = ConversionGraph::from_conversions([
            edge("a", "b", 1.0),
            edge("b", "c", 1.0),
            edge("a", "c", 0.1),
        ]);

        assert_eq!(graph.shortest_path("a", "c").unwrap(), "a -> b -> c");

        let top = graph.find_top_shortest_conversion_paths("a", "c", 2).unwrap();
        assert_eq!(render_path(&top[0]), "a -> c");
        assert_eq!(render_path(&top[1]), "a -> b -> c");

        let first = graph.find_top_shortest_conversion_paths("a", "c", 1).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(graph.all_paths("a", "c").unwrap(), ["a -> c", "a -> b -> c"]);
    }

    #[test]
    fn test_no_path_is_not_a_lookup_error() {
        let mut graph = ConversionGraph::from_conversions([edge("a", "b", 1.0)]);
        graph.add_node("c");

        let err = graph.find_shortest_conversion_path("a", "c").unwrap_err();
        assert!(err.is_no_path());
        assert!(!err.is_lookup());
        let err = graph.find_top_shortest_conversion_paths("a", "c", 3).unwrap_err();
        assert!(err.is_no_path());

        assert!(
            graph
                .find_shortest_conversion_path("a", "missing")
                .unwrap_err()
                .is_lookup()
        );
    }

    #[test]
    fn test_same_source_and_target() {
        let graph = ConversionGraph::from_conversions([edge("a", "b", 1.0)]);
        assert!(graph.find_shortest_conversion_path("a", "a").unwrap().is_empty());
        assert_eq!(graph.shortest_path("a", "a").unwrap(), "a");
        assert_eq!(
            graph.find_top_shortest_conversion_paths("a", "a", 3).unwrap(),
            vec![Vec::<Conversion>::new()]
        );
    }

    #[test]
    fn test_zero_weight_edge_is_last_resort() {
        let graph = ConversionGraph::from_conversions([edge("a", "b", 0.0)]);
        assert!(graph.has_edge("a", "b"));
        assert!(graph.get_conversion("a", "b").unwrap().cost().is_infinite());
        assert_eq!(graph.find_shortest_conversion_path("a", "b").unwrap().len(), 1);
    }

    #[test]
    fn test_closest_target() {
        let graph = ConversionGraph::from_conversions([
            edge("a", "b", 1.0),
            edge("b", "c", 1.0),
            edge("a", "d", 1.0),
        ]);
        assert_eq!(
            graph.closest_target("a", &labels(&["c", "b"])),
            Some("b".into())
        );
        assert_eq!(
            graph.closest_target("a", &labels(&["d", "b"])),
            Some("d".into())
        );
        assert_eq!(
            graph.closest_target("a", &labels(&["b", "d"])),
            Some("b".into())
        );
        assert_eq!(graph.closest_target("c", &labels(&["a"])), None);
        assert_eq!(graph.closest_target("a", &[]), None);
        assert_eq!(graph.closest_target("missing", &labels(&["a"])), None);
    }
}

//! Experiment-type categorization and capability subgraphs.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::visit::Bfs;
use tracing::debug;

use super::ConversionGraph;
use crate::error::{TranspileError, TranspileResult};
use crate::experiment::ExperimentType;
use crate::program::ProgramType;

impl ConversionGraph {
    /// The experiment type of every node, from the terminal nodes it
    /// reaches. Reaching terminals of two types is an
    /// [`TranspileError::ExperimentTypeConflict`]; reaching none gives
    /// [`ExperimentType::Other`].
    pub fn get_node_experiment_types(&self) -> TranspileResult<BTreeMap<ProgramType, ExperimentType>> {
        let mut kinds = BTreeMap::new();

        for start in self.graph.node_indices() {
            let mut reached = BTreeSet::new();
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(node) = bfs.next(&self.graph) {
                if let Some(kind) = self.terminals.get(&self.graph[node]) {
                    reached.insert(*kind);
                }
            }

            let label = self.graph[start].clone();
            if reached.len() > 1 {
                return Err(TranspileError::ExperimentTypeConflict {
                    node: label,
                    categories: reached.into_iter().collect(),
                });
            }
            let kind = reached.pop_first().unwrap_or(ExperimentType::Other);
            kinds.insert(label, kind);
        }

        Ok(kinds)
    }

    /// Induced subgraph over the nodes of the given experiment types. Every
    /// matching node is kept, including ones whose edges all lead outside.
    pub fn subgraph(&self, kinds: &[ExperimentType]) -> TranspileResult<Self> {
        let keep: BTreeSet<ProgramType> = self
            .get_node_experiment_types()?
            .into_iter()
            .filter(|(_, kind)| kinds.contains(kind))
            .map(|(label, _)| label)
            .collect();
        if keep.is_empty() {
            return Err(TranspileError::EmptySubgraph(kinds.to_vec()));
        }

        let mut sub = self.restricted(|label| keep.contains(label), |_| true);
        for label in &keep {
            sub.node_index(label);
        }
        debug!(
            "Subgraph for {:?}: {} of {} nodes",
            kinds,
            sub.node_count(),
            self.node_count()
        );
        Ok(sub)
    }
}

//! Graph command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use qbridge_transpiler::ExperimentType;

use super::common::load_transpiler;

/// Execute the graph command.
pub fn execute(format: &str, experiment: &[String], config: Option<&Path>) -> Result<()> {
    let transpiler = load_transpiler(config)?;

    let graph = if experiment.is_empty() {
        transpiler.active_graph().copy()
    } else {
        let kinds = experiment
            .iter()
            .map(|e| e.parse::<ExperimentType>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(anyhow::Error::msg)?;
        transpiler
            .active_graph()
            .subgraph(&kinds)
            .context("Failed to select subgraph")?
    };

    match format.to_lowercase().as_str() {
        "dot" => print!("{}", graph.to_dot()),
        "types" => {
            let types = graph.get_node_experiment_types()?;
            for (label, kind) in types {
                println!("  {:<16} {}", style(label).cyan(), style(kind).yellow());
            }
        }
        other => anyhow::bail!("Unknown graph format: '{other}'. Available: dot, types"),
    }

    Ok(())
}

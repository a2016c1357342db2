//! Path command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qbridge_transpiler::{Conversion, render_path};

use super::common::load_transpiler;

/// Execute the path command.
pub fn execute(source: &str, target: &str, top: Option<usize>, config: Option<&Path>) -> Result<()> {
    let transpiler = load_transpiler(config)?;
    let graph = transpiler.active_graph();

    match top {
        Some(k) => {
            let paths = graph.find_top_shortest_conversion_paths(source, target, k)?;
            println!(
                "{} {} path(s) from {} to {}:",
                style("→").cyan().bold(),
                paths.len(),
                style(source).green(),
                style(target).green()
            );
            for (i, path) in paths.iter().enumerate() {
                print_path(i + 1, source, path);
            }
        }
        None => {
            let path = graph.find_shortest_conversion_path(source, target)?;
            print_path(1, source, &path);
        }
    }

    Ok(())
}

fn print_path(rank: usize, source: &str, path: &[Conversion]) {
    let cost: f64 = path.iter().map(Conversion::cost).sum();
    let rendered = if path.is_empty() {
        source.to_string()
    } else {
        render_path(path)
    };
    println!(
        "  {:>2}. {}  ({} hop(s), cost {:.3})",
        rank,
        style(rendered).cyan(),
        path.len(),
        style(cost).yellow()
    );
}

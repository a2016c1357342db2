//! Conversions command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use serde_json::json;

use super::common::load_transpiler;

/// Execute the conversions command.
pub fn execute(as_json: bool, config: Option<&Path>) -> Result<()> {
    let transpiler = load_transpiler(config)?;
    let graph = transpiler.active_graph();
    let conversions = graph.conversions();

    if as_json {
        let entries: Vec<_> = conversions
            .iter()
            .map(|c| {
                json!({
                    "source": c.source().as_str(),
                    "target": c.target().as_str(),
                    "function": c.func().name(),
                    "origin": c.func().origin(),
                    "weight": c.weight(),
                    "cost": c.cost(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{} {} conversion(s) between {} program type(s):",
        style("→").cyan().bold(),
        conversions.len(),
        graph.node_count()
    );
    for conversion in conversions {
        let origin = if conversion.is_native() {
            style("builtin").dim()
        } else {
            style("extension").magenta()
        };
        println!(
            "  {:<24} weight {:.2}  cost {:.3}  {}",
            style(conversion.to_string()).cyan(),
            conversion.weight(),
            conversion.cost(),
            origin
        );
    }

    Ok(())
}

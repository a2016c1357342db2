//! Transpile command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qbridge_transpiler::qasm_program_from_text;

use super::common::{load_transpiler, read_input, render_program, write_output};

/// Execute the transpile command.
pub fn execute(
    input: &str,
    target: &str,
    via: &[String],
    output: Option<&str>,
    config: Option<&Path>,
) -> Result<()> {
    let transpiler = load_transpiler(config)?;

    let source = read_input(input)?;
    let program = qasm_program_from_text(&source)?;

    let targets: Vec<&str> = via
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(target))
        .collect();

    eprintln!(
        "{} Converting {} to {}",
        style("→").cyan().bold(),
        style(input).green(),
        style(targets.join(" => ")).yellow()
    );

    let converted = transpiler.translate(&program, &targets)?;
    eprintln!("{} Conversion complete", style("✓").green().bold());

    write_output(&render_program(&converted)?, output)
}

//! Decompose command implementation.

use anyhow::Result;
use console::style;

use qbridge_compile::decompose_qasm3;

use super::common::{read_input, write_output};

/// Execute the decompose command.
pub fn execute(input: &str, output: Option<&str>) -> Result<()> {
    eprintln!(
        "{} Decomposing controlled rotations in {}",
        style("→").cyan().bold(),
        style(input).green()
    );

    let source = read_input(input)?;
    let decomposed = decompose_qasm3(&source)?;
    write_output(&decomposed, output)
}

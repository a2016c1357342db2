//! Rebase command implementation.

use anyhow::{Context, Result};
use console::style;

use qbridge_compile::{BasisGates, rebase};

use super::common::{read_input, write_output};

/// Execute the rebase command.
pub fn execute(input: &str, basis: &str, output: Option<&str>, verify: bool) -> Result<()> {
    let basis: BasisGates = basis
        .parse()
        .with_context(|| format!("Invalid basis '{basis}'"))?;

    eprintln!(
        "{} Rebasing {} onto {}",
        style("→").cyan().bold(),
        style(input).green(),
        style(&basis).yellow()
    );

    let source = read_input(input)?;
    let rebased = rebase(&source, &basis, verify)?;

    if rebased == source {
        eprintln!("{} Program already fits the basis", style("✓").green().bold());
    } else {
        eprintln!("{} Rebase complete", style("✓").green().bold());
    }

    write_output(&rebased, output)
}

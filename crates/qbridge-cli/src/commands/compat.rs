//! Compat command implementation.

use anyhow::Result;
use console::style;

use qbridge_compile::TextPipeline;
use qbridge_compile::compat::{
    DeclarationsToQasm2, PiToDecimal, RemoveUnusedGates, RenameDirection, RenameGates,
    SimplifyParentheses,
};

use super::common::{read_input, write_output};

/// Which text passes to run.
#[derive(Debug, Default)]
pub struct CompatOptions {
    pub rename: Option<String>,
    pub force: bool,
    pub pi_to_decimal: bool,
    pub simplify_parens: bool,
    pub remove_unused: bool,
    pub qasm2_declarations: bool,
}

/// Build the pipeline for `options`. Passes run in a fixed order: renames
/// first, unused-gate removal last.
pub fn build_pipeline(options: &CompatOptions) -> Result<TextPipeline> {
    let mut pipeline = TextPipeline::new();

    if let Some(rename) = &options.rename {
        let direction = match rename.to_lowercase().as_str() {
            "standard" | "openqasm" => RenameDirection::ToStandard,
            "vendor" => RenameDirection::ToVendor,
            other => anyhow::bail!("Unknown rename direction: '{other}'. Available: standard, vendor"),
        };
        pipeline.add_pass(RenameGates {
            direction,
            force_replace: options.force,
        });
    }
    if options.qasm2_declarations {
        pipeline.add_pass(DeclarationsToQasm2);
    }
    if options.pi_to_decimal {
        pipeline.add_pass(PiToDecimal);
    }
    if options.simplify_parens {
        pipeline.add_pass(SimplifyParentheses);
    }
    if options.remove_unused {
        pipeline.add_pass(RemoveUnusedGates);
    }

    Ok(pipeline)
}

/// Execute the compat command.
pub fn execute(input: &str, output: Option<&str>, options: &CompatOptions) -> Result<()> {
    let pipeline = build_pipeline(options)?;
    if pipeline.is_empty() {
        anyhow::bail!("No compatibility passes selected");
    }

    eprintln!(
        "{} Running {} on {}",
        style("→").cyan().bold(),
        style(pipeline.pass_names().join(", ")).yellow(),
        style(input).green()
    );

    let source = read_input(input)?;
    write_output(&pipeline.run(&source), output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order() {
        let options = CompatOptions {
            rename: Some("vendor".into()),
            pi_to_decimal: true,
            remove_unused: true,
            qasm2_declarations: true,
            ..CompatOptions::default()
        };
        let pipeline = build_pipeline(&options).unwrap();
        assert_eq!(
            pipeline.pass_names(),
            ["RenameGates", "DeclarationsToQasm2", "PiToDecimal", "RemoveUnusedGates"]
        );
    }

    #[test]
    fn test_unknown_direction() {
        let options = CompatOptions {
            rename: Some("sideways".into()),
            ..CompatOptions::default()
        };
        assert!(build_pipeline(&options).is_err());
    }

    #[test]
    fn test_rename_to_vendor() {
        let options = CompatOptions {
            rename: Some("vendor".into()),
            ..CompatOptions::default()
        };
        let pipeline = build_pipeline(&options).unwrap();
        assert_eq!(
            pipeline.run("OPENQASM 3.0;\nqubit[2] q;\ncx q[0], q[1];\n"),
            "OPENQASM 3.0;\nqubit[2] q;\ncnot q[0], q[1];\n"
        );
    }
}

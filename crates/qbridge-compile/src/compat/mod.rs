//! Text-level OpenQASM compatibility passes.
//!
//! These work on program text rather than the AST, so they also apply to
//! programs the parser does not accept (vendor dialects, partial programs).
//! Each pass is a plain function; [`TextPipeline`] chains them.

mod declarations;
mod gates;
mod parentheses;
mod pi;
mod unused;

use tracing::debug;

pub use declarations::declarations_to_qasm2;
pub use gates::{GATE_NAME_PAIRS, RenameDirection, replace_gate_name, replace_gate_names};
pub use parentheses::{has_redundant_parentheses, simplify_parentheses};
pub use pi::convert_pi_to_decimal;
pub use unused::{GateDefinition, count_identifier, find_gate_definitions, remove_unused_gates};

/// A rewrite of OpenQASM source text.
pub trait TextPass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Rewrite the text.
    fn apply(&self, qasm: &str) -> String;
}

/// Gate-name substitution, see [`replace_gate_names`].
#[derive(Debug, Clone, Copy)]
pub struct RenameGates {
    pub direction: RenameDirection,
    pub force_replace: bool,
}

impl TextPass for RenameGates {
    fn name(&self) -> &'static str {
        "RenameGates"
    }

    fn apply(&self, qasm: &str) -> String {
        replace_gate_names(qasm, self.direction, self.force_replace)
    }
}

/// See [`convert_pi_to_decimal`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PiToDecimal;

impl TextPass for PiToDecimal {
    fn name(&self) -> &'static str {
        "PiToDecimal"
    }

    fn apply(&self, qasm: &str) -> String {
        convert_pi_to_decimal(qasm)
    }
}

/// See [`simplify_parentheses`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplifyParentheses;

impl TextPass for SimplifyParentheses {
    fn name(&self) -> &'static str {
        "SimplifyParentheses"
    }

    fn apply(&self, qasm: &str) -> String {
        simplify_parentheses(qasm)
    }
}

/// See [`remove_unused_gates`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveUnusedGates;

impl TextPass for RemoveUnusedGates {
    fn name(&self) -> &'static str {
        "RemoveUnusedGates"
    }

    fn apply(&self, qasm: &str) -> String {
        remove_unused_gates(qasm)
    }
}

/// See [`declarations_to_qasm2`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationsToQasm2;

impl TextPass for DeclarationsToQasm2 {
    fn name(&self) -> &'static str {
        "DeclarationsToQasm2"
    }

    fn apply(&self, qasm: &str) -> String {
        declarations_to_qasm2(qasm)
    }
}

/// An ordered sequence of text passes.
#[derive(Default)]
pub struct TextPipeline {
    passes: Vec<Box<dyn TextPass>>,
}

impl TextPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass.
    #[must_use]
    pub fn with_pass(mut self, pass: impl TextPass + 'static) -> Self {
        self.add_pass(pass);
        self
    }

    /// Append a pass.
    pub fn add_pass(&mut self, pass: impl TextPass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run every pass in order.
    pub fn run(&self, qasm: &str) -> String {
        self.passes.iter().fold(qasm.to_string(), |text, pass| {
            let out = pass.apply(&text);
            if out == text {
                debug!("Text pass {} made no changes", pass.name());
            } else {
                debug!("Text pass {} rewrote the program", pass.name());
            }
            out
        })
    }

    /// Pass names, in run order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_runs_in_order() {
        let pipeline = TextPipeline::new()
            .with_pass(RenameGates {
                direction: RenameDirection::ToStandard,
                force_replace: false,
            })
            .with_pass(SimplifyParentheses)
            .with_pass(RemoveUnusedGates);

        assert_eq!(
            pipeline.pass_names(),
            ["RenameGates", "SimplifyParentheses", "RemoveUnusedGates"]
        );

        let qasm = "OPENQASM 3.0;\ngate unused a { h a; }\nqubit[2] q;\ncnot q[0], q[1];\nrz(-(0.5)) q[0];\n";
        assert_eq!(
            pipeline.run(qasm),
            "OPENQASM 3.0;\nqubit[2] q;\ncx q[0], q[1];\nrz(-0.5) q[0];\n"
        );
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = TextPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.run("OPENQASM 3.0;"), "OPENQASM 3.0;");
    }
}

//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qbridge_qasm::syntax::Program;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{BasisVerification, DecomposeControlledRotations};
use crate::property::{BasisGates, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given program.
    #[instrument(skip(self, program, properties))]
    pub fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on program with {} statements",
            self.passes.len(),
            program.statements.len()
        );

        for pass in &self.passes {
            if pass.should_run(program, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(program, properties)?;
                debug!(
                    "Pass {} completed, statements: {}",
                    pass.name(),
                    program.statements.len()
                );
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the rebase pipeline: decomposition followed by an optional
/// basis check.
pub struct PassManagerBuilder {
    properties: PropertySet,
    verify: bool,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            properties: PropertySet::new(),
            verify: true,
        }
    }

    /// Set the target basis.
    #[must_use]
    pub fn with_basis(mut self, basis_gates: BasisGates) -> Self {
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Enable or disable the basis verification pass.
    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        pm.add_pass(DecomposeControlledRotations);
        if self.verify {
            pm.add_pass(BasisVerification);
        }
        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

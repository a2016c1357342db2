//! Pass trait and types for compilation passes.

use qbridge_qasm::syntax::Program;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the program.
    Analysis,
    /// Transformation pass that modifies the program.
    Transformation,
}

/// A compilation pass that operates on a parsed OpenQASM program.
///
/// Analysis passes read the program and write findings to the
/// [`PropertySet`]; transformation passes rewrite the program and may read
/// the `PropertySet`.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given program.
    fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _program: &Program, _properties: &PropertySet) -> bool {
        true
    }
}

//! Basis verification.

use tracing::debug;

use qbridge_qasm::syntax::Program;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{BasisViolations, PropertySet};

/// Analysis pass recording every top-level gate name outside a concrete
/// basis. Skipped for the `any` basis, which names no gates.
pub struct BasisVerification;

impl Pass for BasisVerification {
    fn name(&self) -> &'static str {
        "BasisVerification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;

        let mut offending: Vec<String> = Vec::new();
        for call in program.gate_calls() {
            if !basis.contains(&call.name) && !offending.contains(&call.name) {
                offending.push(call.name.clone());
            }
        }

        debug!(
            "Basis verification found {} gate names outside {}",
            offending.len(),
            basis
        );
        properties.insert(BasisViolations(offending));
        Ok(())
    }

    fn should_run(&self, _program: &Program, properties: &PropertySet) -> bool {
        properties
            .basis_gates
            .as_ref()
            .is_some_and(|basis| !basis.is_any())
    }
}

//! Rebasing OpenQASM programs onto a target gate set.

use tracing::{debug, info, instrument, warn};

use crate::compat::declarations_to_qasm2;
use crate::error::{CompileError, CompileResult};
use crate::manager::PassManagerBuilder;
use crate::property::{BasisGates, BasisViolations, DecompositionStats};

/// Decompose the controlled rotations of `qasm` that fall outside `basis`
/// and check the result against it.
///
/// When the result still uses gates outside a concrete basis, this fails
/// with [`CompileError::RebaseFailed`] if `require_predicates` is set and
/// otherwise returns `qasm` unchanged. If no gate was decomposed the input
/// text is returned verbatim, so formatting and comments survive.
///
/// # Examples
///
/// ```
/// use qbridge_compile::{BasisGates, rebase};
///
/// let qasm = "OPENQASM 3.0;\nqubit[2] q;\ncrz(theta) q[0], q[1];\n";
/// let out = rebase(qasm, &BasisGates::rotations(), true).unwrap();
/// assert!(out.contains("rz(theta / 2) q[1];"));
/// assert!(!out.contains("crz"));
/// ```
#[instrument(skip(qasm))]
pub fn rebase(qasm: &str, basis: &BasisGates, require_predicates: bool) -> CompileResult<String> {
    let mut program = qbridge_qasm::parse(qasm)?;

    let (pm, mut props) = PassManagerBuilder::new()
        .with_basis(basis.clone())
        .with_verification(!basis.is_any())
        .build();
    pm.run(&mut program, &mut props)?;

    let replaced = props
        .get::<DecompositionStats>()
        .map_or(0, |stats| stats.replaced);

    let violations = props.remove::<BasisViolations>().unwrap_or_default();
    if !violations.is_empty() {
        if require_predicates {
            return Err(CompileError::RebaseFailed {
                program: qasm.to_string(),
                basis: basis.to_string(),
                offending: violations.0,
            });
        }
        warn!(
            "Program still uses {:?} outside basis {}, returning it unchanged",
            violations.0, basis
        );
        return Ok(qasm.to_string());
    }

    if replaced == 0 {
        debug!("No gates decomposed, returning input unchanged");
        return Ok(qasm.to_string());
    }

    info!("Rebased program onto {basis}, {replaced} gates decomposed");
    Ok(render(&program))
}

/// Expand every controlled rotation in the decomposition table, with no
/// basis requirement.
pub fn decompose_qasm3(qasm: &str) -> CompileResult<String> {
    rebase(qasm, &BasisGates::any(), false)
}

fn render(program: &qbridge_qasm::syntax::Program) -> String {
    let text = qbridge_qasm::emit(program);
    if program.is_qasm2() {
        declarations_to_qasm2(&text)
    } else {
        text
    }
}

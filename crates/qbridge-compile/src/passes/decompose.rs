//! Controlled-rotation decomposition.
//!
//! Identities (control `c`, target `t`):
//!
//! ```text
//! crx(θ) c,t = rz(π/2) t; ry(θ/2) t; cx c,t; ry(-θ/2) t; cx c,t; rz(-π/2) t
//! cry(θ) c,t = ry(θ/2) t; cx c,t; ry(-θ/2) t; cx c,t
//! crz(θ) c,t = rz(θ/2) t; cx c,t; rz(-θ/2) t; cx c,t
//! cy c,t     = cry(π) c,t; s c
//! cz c,t     = crz(π) c,t; s c
//! ```

use tracing::debug;

use qbridge_qasm::syntax::{Expression, GateCall, Program, QubitRef, Statement};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{BasisGates, DecompositionStats, PropertySet};

/// Replaces top-level `crx`, `cry`, `crz`, `cy` and `cz` calls outside the
/// basis with their fixed expansions.
///
/// Expansions go back on a worklist, so `cy`/`cz` bottom out in `ry`/`rz`,
/// `cx` and `s`. Calls with modifiers, wrong arity, or inside gate bodies and
/// control flow are left alone.
pub struct DecomposeControlledRotations;

impl Pass for DecomposeControlledRotations {
    fn name(&self) -> &'static str {
        "DecomposeControlledRotations"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, program: &mut Program, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;

        let mut replaced = 0;
        let mut statements = Vec::with_capacity(program.statements.len());

        for statement in program.statements.drain(..) {
            let Statement::Gate(call) = statement else {
                statements.push(statement);
                continue;
            };

            let mut worklist = vec![call];
            while let Some(call) = worklist.pop() {
                match expand(&call, basis) {
                    Some(expansion) => {
                        debug!("Decomposing {} into {} gates", call.name, expansion.len());
                        replaced += 1;
                        worklist.extend(expansion.into_iter().rev());
                    }
                    None => statements.push(Statement::Gate(call)),
                }
            }
        }

        program.statements = statements;
        match properties.get_mut::<DecompositionStats>() {
            Some(stats) => stats.replaced += replaced,
            None => properties.insert(DecompositionStats { replaced }),
        }

        Ok(())
    }

    fn should_run(&self, _program: &Program, properties: &PropertySet) -> bool {
        properties.basis_gates.is_some()
    }
}

fn expand(call: &GateCall, basis: &BasisGates) -> Option<Vec<GateCall>> {
    if !call.modifiers.is_empty() || !basis.wants_decomposition(&call.name) {
        return None;
    }
    decomposition_for(call)
}

/// The fixed expansion of a table gate, or `None` for anything else.
pub fn decomposition_for(call: &GateCall) -> Option<Vec<GateCall>> {
    let [control, target] = call.qubits.as_slice() else {
        return None;
    };

    match (call.name.as_str(), call.params.as_slice()) {
        ("crx", [theta]) => Some(vec![
            gate("rz", Expression::Pi.halved(), target),
            gate("ry", theta.halved(), target),
            cx(control, target),
            gate("ry", theta.negated_half(), target),
            cx(control, target),
            gate("rz", Expression::Pi.negated_half(), target),
        ]),
        ("cry", [theta]) => Some(controlled_rotation("ry", theta, control, target)),
        ("crz", [theta]) => Some(controlled_rotation("rz", theta, control, target)),
        ("cy", []) => Some(phase_corrected("cry", control, target)),
        ("cz", []) => Some(phase_corrected("crz", control, target)),
        _ => None,
    }
}

fn controlled_rotation(
    axis: &str,
    theta: &Expression,
    control: &QubitRef,
    target: &QubitRef,
) -> Vec<GateCall> {
    vec![
        gate(axis, theta.halved(), target),
        cx(control, target),
        gate(axis, theta.negated_half(), target),
        cx(control, target),
    ]
}

fn phase_corrected(rotation: &str, control: &QubitRef, target: &QubitRef) -> Vec<GateCall> {
    vec![
        GateCall::new(
            rotation,
            vec![Expression::Pi],
            vec![control.clone(), target.clone()],
        ),
        GateCall::new("s", vec![], vec![control.clone()]),
    ]
}

fn gate(name: &str, param: Expression, target: &QubitRef) -> GateCall {
    GateCall::new(name, vec![param], vec![target.clone()])
}

fn cx(control: &QubitRef, target: &QubitRef) -> GateCall {
    GateCall::new("cx", vec![], vec![control.clone(), target.clone()])
}

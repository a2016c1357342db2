//! Built-in conversion functions.

mod ionq;
mod qasm;

pub use ionq::{IONQ_CIRCUIT_FORMAT, IonQGate, IonQProgram, qasm3_to_ionq};
pub use qasm::{
    decompose_qasm2, decompose_qasm3, openqasm3_to_qasm3, qasm2_to_qasm3, qasm3_to_openqasm3,
    qasm3_to_qasm2,
};

use crate::conversion::ConversionFn;

/// Every built-in conversion with its declared weight.
pub(crate) fn builtin() -> Vec<ConversionFn> {
    vec![
        ConversionFn::builtin("qasm2_to_qasm3", 1.0, qasm2_to_qasm3),
        ConversionFn::builtin("qasm3_to_qasm2", 0.9, qasm3_to_qasm2),
        ConversionFn::builtin("qasm3_to_openqasm3", 1.0, qasm3_to_openqasm3),
        ConversionFn::builtin("openqasm3_to_qasm3", 1.0, openqasm3_to_qasm3),
        ConversionFn::builtin("qasm3_to_ionq", 0.9, qasm3_to_ionq),
    ]
}

//! IonQ native-gate JSON.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use qbridge_compile::compat::GATE_NAME_PAIRS;
use qbridge_qasm::syntax::{GateCall, QubitRef, Statement};

use crate::error::BoxError;
use crate::program::{Program, Qasm3};

use super::qasm::payload;

/// Format tag of the circuit JSON.
pub const IONQ_CIRCUIT_FORMAT: &str = "ionq.circuit.v0";

/// A circuit in IonQ's `ionq.circuit.v0` JSON format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonQProgram {
    pub format: String,
    pub qubits: usize,
    pub circuit: Vec<IonQGate>,
}

/// One gate of an [`IonQProgram`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonQGate {
    pub gate: String,
    pub targets: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<usize>,
    /// Rotation angle in radians.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl IonQProgram {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

const ONE_QUBIT: [&str; 10] = ["x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg"];
const ROTATIONS: [&str; 3] = ["rx", "ry", "rz"];

/// OpenQASM 3 text to IonQ JSON.
///
/// Only flat programs over the IonQ gate set convert: gates outside it,
/// symbolic parameters, gate modifiers, register broadcasts and control flow
/// are errors. Measurements and barriers are dropped, since IonQ measures
/// every qubit at the end.
pub fn qasm3_to_ionq(program: Program) -> Result<Program, BoxError> {
    let Qasm3(text) = payload(program)?;
    let ast = qbridge_qasm::parse(&text)?;

    let mut registers = Registers::default();
    let mut circuit = Vec::new();

    for statement in &ast.statements {
        match statement {
            Statement::QubitDecl { name, size } => registers.declare(name, size.unwrap_or(1)),
            Statement::Include(_)
            | Statement::BitDecl { .. }
            | Statement::Measure { .. }
            | Statement::Barrier { .. } => {}
            Statement::Gate(call) => circuit.push(ionq_gate(call, &registers)?),
            other => return Err(format!("IonQ circuits cannot contain {}", describe(other)).into()),
        }
    }

    Ok(Program::new(IonQProgram {
        format: IONQ_CIRCUIT_FORMAT.to_string(),
        qubits: registers.total,
        circuit,
    }))
}

#[derive(Default)]
struct Registers {
    offsets: FxHashMap<String, (usize, usize)>,
    total: usize,
}

impl Registers {
    fn declare(&mut self, name: &str, size: u32) {
        let size = size as usize;
        self.offsets.insert(name.to_string(), (self.total, size));
        self.total += size;
    }

    fn resolve(&self, qubit: &QubitRef) -> Result<usize, BoxError> {
        let QubitRef::Single { register, index } = qubit else {
            return Err("qubit ranges are not supported".into());
        };
        let (offset, size) = *self
            .offsets
            .get(register)
            .ok_or_else(|| format!("undeclared qubit register '{register}'"))?;

        let index = match index {
            Some(i) => *i as usize,
            None if size == 1 => 0,
            None => return Err(format!("register broadcast over '{register}' is not supported").into()),
        };
        if index >= size {
            return Err(format!("qubit {register}[{index}] is out of range").into());
        }
        Ok(offset + index)
    }
}

fn ionq_gate(call: &GateCall, registers: &Registers) -> Result<IonQGate, BoxError> {
    if !call.modifiers.is_empty() {
        return Err(format!("gate modifiers on '{}' are not supported by IonQ", call.name).into());
    }

    let qubits = call
        .qubits
        .iter()
        .map(|q| registers.resolve(q))
        .collect::<Result<Vec<_>, _>>()?;
    let name = call.name.as_str();

    let gate = match (name, call.params.as_slice(), qubits.as_slice()) {
        (n, [], [target]) if ONE_QUBIT.contains(&n) => IonQGate {
            gate: vendor_name(n),
            targets: vec![*target],
            controls: vec![],
            rotation: None,
        },
        (n, [angle], [target]) if ROTATIONS.contains(&n) => IonQGate {
            gate: n.to_string(),
            targets: vec![*target],
            controls: vec![],
            rotation: Some(
                angle
                    .as_f64()
                    .ok_or_else(|| format!("parameter of '{n}' is not a constant"))?,
            ),
        },
        ("cx" | "CX", [], [control, target]) => IonQGate {
            gate: "cnot".to_string(),
            targets: vec![*target],
            controls: vec![*control],
            rotation: None,
        },
        ("swap", [], [a, b]) => IonQGate {
            gate: "swap".to_string(),
            targets: vec![*a, *b],
            controls: vec![],
            rotation: None,
        },
        _ => return Err(format!("gate '{name}' is not supported by IonQ").into()),
    };
    Ok(gate)
}

fn vendor_name(standard: &str) -> String {
    GATE_NAME_PAIRS
        .iter()
        .find(|(_, std_name, _)| *std_name == standard)
        .map_or(standard, |&(vendor, _, _)| vendor)
        .to_string()
}

fn describe(statement: &Statement) -> &'static str {
    match statement {
        Statement::Reset { .. } => "resets",
        Statement::Delay { .. } => "delays",
        Statement::If { .. } => "conditionals",
        Statement::For { .. } => "loops",
        Statement::GateDef { .. } | Statement::Opaque { .. } => "gate definitions",
        Statement::Assignment { .. } => "classical assignments",
        Statement::ClassicalDecl { .. } => "classical declarations",
        _ => "this statement",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(body: &str) -> Result<IonQProgram, BoxError> {
        let text = format!("OPENQASM 3.0;\ninclude \"stdgates.inc\";\nqubit[2] q;\nqubit a;\nbit[3] c;\n{body}");
        let out = qasm3_to_ionq(Program::new(Qasm3(text)))?;
        Ok(out.downcast::<IonQProgram>().ok_or("wrong payload")?)
    }

    #[test]
    fn test_bell_circuit() {
        let program = convert("h q[0];\ncx q[0], q[1];\nc[0] = measure q[0];\n").unwrap();
        assert_eq!(program.qubits, 3);
        assert_eq!(program.format, IONQ_CIRCUIT_FORMAT);
        assert_eq!(
            program.circuit,
            vec![
                IonQGate {
                    gate: "h".into(),
                    targets: vec![0],
                    controls: vec![],
                    rotation: None,
                },
                IonQGate {
                    gate: "cnot".into(),
                    targets: vec![1],
                    controls: vec![0],
                    rotation: None,
                },
            ]
        );
    }

    #[test]
    fn test_vendor_names_and_rotations() {
        let program = convert("sdg a;\nsx q[1];\nrz(pi / 2) q[0];\n").unwrap();
        let names: Vec<&str> = program.circuit.iter().map(|g| g.gate.as_str()).collect();
        assert_eq!(names, ["si", "v", "rz"]);
        assert_eq!(program.circuit[0].targets, [2]);
        let rotation = program.circuit[2].rotation.unwrap();
        assert!((rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_gates_fail() {
        assert!(
            convert("crx(0.5) q[0], q[1];\n")
                .unwrap_err()
                .to_string()
                .contains("not supported by IonQ")
        );
        assert!(convert("rz(theta) q[0];\n").is_err());
        assert!(convert("h q;\n").is_err());
        assert!(convert("h q[5];\n").is_err());
        assert!(convert("for i in [0:1] { h a; }\n").is_err());
    }

    #[test]
    fn test_classical_declarations_fail() {
        let err = convert("input float theta;\nrx(theta) a;\n").unwrap_err();
        assert!(err.to_string().contains("cannot contain classical declarations"));
    }

    #[test]
    fn test_json_shape() {
        let program = convert("cx q[0], q[1];\nrx(0.5) a;\n").unwrap();
        let json: serde_json::Value = serde_json::from_str(&program.to_json().unwrap()).unwrap();
        assert_eq!(json["format"], "ionq.circuit.v0");
        assert_eq!(json["circuit"][0]["gate"], "cnot");
        assert_eq!(json["circuit"][0]["controls"][0], 0);
        assert!(json["circuit"][0].get("rotation").is_none());
        assert_eq!(json["circuit"][1]["rotation"], 0.5);

        let back = IonQProgram::from_json(&program.to_json().unwrap()).unwrap();
        assert_eq!(back, program);
    }
}

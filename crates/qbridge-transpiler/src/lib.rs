//! qbridge Conversion Graph and Transpiler
//!
//! This crate moves quantum programs between representations. Each
//! representation is a [`ProgramType`] label; a [`Conversion`] turns a
//! program of one type into another. The [`ConversionGraph`] connects the
//! types, and a [`Transpiler`] walks its paths.
//!
//! # Architecture
//!
//! ```text
//! ProgramTypeRegistry      ConversionRegistry
//!  (payload → label,        ((source, target) → fn)
//!   decomposers)                    │
//!        │                          ▼
//!        │                  ConversionGraph ◄── ConversionScheme
//!        │                  (petgraph, cost = ln(1/w) + bias)
//!        │                          │ top-k paths
//!        ▼                          ▼
//!     Transpiler ── run path, decompose and retry once ──► Program
//! ```
//!
//! # Example
//!
//! ```rust
//! use qbridge_transpiler::{IonQProgram, Program, Qasm2, transpile};
//!
//! let bell = Program::new(Qasm2(
//!     "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\nh q[0];\ncx q[0], q[1];\n".into(),
//! ));
//!
//! let ionq = transpile(&bell, "ionq").unwrap();
//! let circuit = ionq.downcast_ref::<IonQProgram>().unwrap();
//! assert_eq!(circuit.qubits, 2);
//! assert_eq!(circuit.circuit[1].gate, "cnot");
//! ```
//!
//! # Custom Conversions
//!
//! ```rust
//! use qbridge_transpiler::{Conversion, ConversionFn, ConversionGraph, Program};
//!
//! let mut graph = ConversionGraph::new();
//! let to_cirq = ConversionFn::new("qasm3_to_cirq", |p: Program| Ok(p)).requires("cirq");
//! let edge = Conversion::builder("qasm3", "cirq", to_cirq).weight(0.8).build().unwrap();
//! graph.add_conversion(edge, false).unwrap();
//!
//! assert_eq!(graph.shortest_path("qasm2", "cirq").unwrap(), "qasm2 -> qasm3 -> cirq");
//! ```

pub mod config;
pub mod conversion;
pub mod conversions;
pub mod error;
pub mod experiment;
pub mod graph;
pub mod program;
pub mod registry;
pub mod scheme;
pub mod transpiler;
pub mod types;

pub use config::{ConfigError, TranspilerConfig};
pub use conversion::{
    Conversion, ConversionBuilder, ConversionFn, ConversionOrigin, DEFAULT_EDGE_BIAS,
    DependencyResolver, Environment, adjusted_cost,
};
pub use conversions::{IonQGate, IonQProgram};
pub use error::{BoxError, PathAttempt, TranspileError, TranspileResult, error_chain};
pub use experiment::ExperimentType;
pub use graph::{ConversionGraph, GraphOptions, render_path};
pub use program::{Program, ProgramData, ProgramType, Qasm2, Qasm3, qasm_program_from_text};
pub use registry::ConversionRegistry;
pub use scheme::{ConversionScheme, DEFAULT_MAX_PATH_ATTEMPTS, find_nodes_reachable_within_max_edges};
pub use transpiler::{Transpiler, translate, transpile};
pub use types::{Decomposer, ProgramTypeRegistry, TypeResolver};

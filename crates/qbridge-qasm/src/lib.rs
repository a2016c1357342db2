//! `OpenQASM` 2/3 Parser and Emitter for qbridge
//!
//! This crate parses OpenQASM source into a syntax tree and writes syntax
//! trees back out as text. It is the front end of the rebase engine and of
//! the native QASM conversions.
//!
//! # Supported Features
//!
//! | Feature | Example |
//! |---------|---------|
//! | Version declaration | `OPENQASM 2.0;`, `OPENQASM 3.0;` |
//! | Registers | `qubit[5] q;`, `qreg q[5];`, `bit[5] c;`, `creg c[5];` |
//! | Gate calls | `rx(pi/4) q[0];`, `CX q[0], q[1];` |
//! | Gate modifiers | `ctrl @ inv @ x q[0], q[1];` |
//! | Gate definitions | `gate g(theta) a { rz(theta) a; }`, `opaque g a;` |
//! | Classical declarations | `input float theta;`, `const int[8] n = 2;`, `output bit r;` |
//! | Measurements | `c = measure q;`, `measure q -> c;` |
//! | Control flow | `if (c == 1) x q;`, `for i in [0:3] { ... }` |
//! | Barriers, reset, delay | `barrier q;`, `reset q[0];`, `delay[100] q;` |
//!
//! # Example: Round-Trip
//!
//! ```rust
//! use qbridge_qasm::{emit, parse};
//!
//! let program = parse(r#"
//!     OPENQASM 3.0;
//!     include "stdgates.inc";
//!     qubit[2] q;
//!     crx(pi/2) q[0], q[1];
//! "#).unwrap();
//!
//! assert_eq!(program.gate_calls().count(), 1);
//! assert!(emit(&program).contains("crx(pi / 2) q[0], q[1];"));
//! ```

mod ast;
mod emitter;
mod error;
mod lexer;
mod parser;

pub use emitter::{emit, emit_expression, emit_gate_call};
pub use error::{ParseError, ParseResult};
pub use parser::parse;

// Re-export AST types for advanced users
pub mod syntax {
    pub use crate::ast::*;
}

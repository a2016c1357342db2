//! qbridge OpenQASM Rebase Engine
//!
//! This crate rewrites OpenQASM programs so they only use a chosen gate set.
//! It parses the program with `qbridge-qasm`, runs a small pass pipeline over
//! the syntax tree and writes the result back out as text.
//!
//! # Architecture
//!
//! ```text
//! OpenQASM text
//!       │  parse
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (basis gates, decomposition stats)
//! └─────────────┘
//!       │
//!       ├── DecomposeControlledRotations   crx, cry, crz, cy, cz
//!       └── BasisVerification
//!       │  emit
//!       ▼
//! OpenQASM text
//! ```
//!
//! The [`compat`] module holds regex-based text rewrites for dialect
//! differences that never go through the parser.
//!
//! # Example
//!
//! ```rust
//! use qbridge_compile::{BasisGates, CompileError, rebase};
//!
//! let qasm = "OPENQASM 3.0;\nqubit[2] q;\ncrx(0.5) q[0], q[1];\n";
//!
//! let h_only: BasisGates = "h".parse().unwrap();
//! assert!(matches!(
//!     rebase(qasm, &h_only, true),
//!     Err(CompileError::RebaseFailed { .. })
//! ));
//! assert_eq!(rebase(qasm, &h_only, false).unwrap(), qasm);
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use qbridge_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use qbridge_qasm::syntax::Program;
//!
//! struct StripBarriers;
//!
//! impl Pass for StripBarriers {
//!     fn name(&self) -> &str { "strip_barriers" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, program: &mut Program, _props: &mut PropertySet) -> CompileResult<()> {
//!         program.statements.retain(|s| {
//!             !matches!(s, qbridge_qasm::syntax::Statement::Barrier { .. })
//!         });
//!         Ok(())
//!     }
//! }
//! ```

pub mod compat;
pub mod error;
pub mod manager;
pub mod pass;
pub mod property;
mod rebase;

// Built-in passes
pub mod passes;

pub use compat::{RenameDirection, TextPass, TextPipeline};
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use property::{BasisGates, BasisViolations, DecompositionStats, PropertySet};
pub use rebase::{decompose_qasm3, rebase};

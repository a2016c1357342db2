//! Error types for the compilation crate.

use qbridge_qasm::ParseError;
use thiserror::Error;

/// Errors that can occur during rebasing and compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The input program is not valid OpenQASM.
    #[error("Failed to parse program: {0}")]
    Parse(#[from] ParseError),

    /// Basis gate argument was empty or malformed.
    #[error("Invalid basis gates: {0}")]
    InvalidBasis(String),

    /// Missing basis gates.
    #[error("Missing basis gates for translation")]
    MissingBasisGates,

    /// The decomposed program still uses gates outside the requested basis.
    #[error("Cannot rebase program to basis {basis}: gates {offending:?} remain in\n{program}")]
    RebaseFailed {
        program: String,
        basis: String,
        offending: Vec<String>,
    },

    /// Pass execution failed.
    #[error("Pass '{name}' failed: {reason}")]
    PassFailed { name: String, reason: String },

    /// Invalid pass configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;

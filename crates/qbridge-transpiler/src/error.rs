//! Error types for the transpiler crate.

use std::error::Error as StdError;
use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;

use crate::experiment::ExperimentType;
use crate::program::ProgramType;

/// Error returned by conversion and decomposition functions.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// One failed path of a transpile request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathAttempt {
    /// The path as `a -> b -> c`.
    pub path: String,
    /// The formatted error chain that ended the attempt.
    pub error: String,
}

/// Errors that can occur while building graphs or transpiling programs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranspileError {
    /// Conversion weight outside `[0, 1]`.
    #[error("Invalid conversion weight {0}: must be within [0, 1]")]
    InvalidWeight(f64),

    /// Edge bias is NaN or infinite.
    #[error("Invalid edge bias {0}: must be finite")]
    InvalidBias(f64),

    /// Malformed conversion definition.
    #[error("Invalid conversion: {0}")]
    InvalidConversion(String),

    /// Configuration value rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Label is not a node of the graph.
    #[error("Node '{0}' not found in conversion graph")]
    NodeNotFound(ProgramType),

    /// No edge between the two labels.
    #[error("No conversion from '{from}' to '{to}' in conversion graph")]
    EdgeNotFound { from: ProgramType, to: ProgramType },

    /// The program's payload type has no label.
    #[error("Program type '{0}' is not registered")]
    UnregisteredType(String),

    /// A label or payload type is already registered differently.
    #[error("Program type conflict: {0}")]
    TypeConflict(String),

    /// An edge already exists and overwrite was not requested.
    #[error("Conversion from '{from}' to '{to}' already exists")]
    ConversionExists { from: ProgramType, to: ProgramType },

    /// Both nodes exist but no path connects them.
    #[error("No conversion path from '{from}' to '{to}'")]
    NoPath { from: ProgramType, to: ProgramType },

    /// Paths exist but all of them are longer than the depth limit.
    #[error("No conversion path from '{from}' to '{to}' within {max_depth} steps")]
    NoPathWithinDepth {
        from: ProgramType,
        to: ProgramType,
        max_depth: usize,
    },

    /// Program handed to an edge with a different source type.
    #[error("Program type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch {
        expected: ProgramType,
        actual: ProgramType,
    },

    /// A conversion function failed.
    #[error(transparent)]
    Conversion(BoxError),

    /// A decomposer failed.
    #[error("Failed to decompose '{label}' program")]
    Decomposition {
        label: ProgramType,
        #[source]
        cause: BoxError,
    },

    /// A node reaches terminals of more than one experiment type.
    #[error("Node '{node}' reaches terminals of conflicting experiment types {categories:?}")]
    ExperimentTypeConflict {
        node: ProgramType,
        categories: Vec<ExperimentType>,
    },

    /// No node matches the requested experiment types.
    #[error("No nodes match experiment types {0:?}")]
    EmptySubgraph(Vec<ExperimentType>),

    /// Every candidate path failed.
    #[error(
        "Failed to transpile program from '{from}' to '{to}', {} path(s) attempted:{}",
        .attempts.len(),
        render_attempts(.attempts)
    )]
    AllPathsFailed {
        from: ProgramType,
        to: ProgramType,
        attempts: Vec<PathAttempt>,
    },
}

impl TranspileError {
    /// Whether the driver may retry the failed step after decomposing.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TranspileError::Conversion(_))
    }

    /// Whether this is an unknown label, edge or type.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            TranspileError::NodeNotFound(_)
                | TranspileError::EdgeNotFound { .. }
                | TranspileError::UnregisteredType(_)
                | TranspileError::TypeConflict(_)
                | TranspileError::ConversionExists { .. }
        )
    }

    /// Whether the graph has both nodes but no (short enough) path.
    pub fn is_no_path(&self) -> bool {
        matches!(
            self,
            TranspileError::NoPath { .. } | TranspileError::NoPathWithinDepth { .. }
        )
    }
}

/// Result type for transpiler operations.
pub type TranspileResult<T> = Result<T, TranspileError>;

/// Format an error and all its sources as `outer: inner: innermost`.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {cause}");
        source = cause.source();
    }
    out
}

fn render_attempts(attempts: &[PathAttempt]) -> String {
    let mut out = String::new();
    for (i, attempt) in attempts.iter().enumerate() {
        let _ = write!(out, "\n  {}. {}: {}", i + 1, attempt.path, attempt.error);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let a = ProgramType::from("a");
        let b = ProgramType::from("b");

        assert!(TranspileError::Conversion("boom".into()).is_retryable());
        assert!(
            !TranspileError::TypeMismatch {
                expected: a.clone(),
                actual: b.clone(),
            }
            .is_retryable()
        );
        assert!(TranspileError::NodeNotFound(a.clone()).is_lookup());
        assert!(
            TranspileError::NoPath {
                from: a.clone(),
                to: b.clone(),
            }
            .is_no_path()
        );
        assert!(!TranspileError::NodeNotFound(a).is_no_path());
    }

    #[test]
    fn test_error_chain() {
        let err = TranspileError::Decomposition {
            label: ProgramType::from("qasm3"),
            cause: "parse failed".into(),
        };
        assert_eq!(
            error_chain(&err),
            "Failed to decompose 'qasm3' program: parse failed"
        );
        assert_eq!(
            error_chain(&TranspileError::Conversion("bad gate".into())),
            "bad gate"
        );
    }

    #[test]
    fn test_all_paths_failed_lists_attempts() {
        let err = TranspileError::AllPathsFailed {
            from: "a".into(),
            to: "c".into(),
            attempts: vec![
                PathAttempt {
                    path: "a -> c".into(),
                    error: "first".into(),
                },
                PathAttempt {
                    path: "a -> b -> c".into(),
                    error: "second".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 path(s) attempted"));
        assert!(msg.contains("1. a -> c: first"));
        assert!(msg.contains("2. a -> b -> c: second"));
    }
}

//! Error types for the OpenQASM parser.

use thiserror::Error;

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at line {line} (offset {position}): {message}")]
    LexerError {
        line: usize,
        position: usize,
        message: String,
    },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// Invalid version.
    #[error("Invalid OPENQASM version: {0}")]
    InvalidVersion(String),

    /// Integer literal that does not fit the slot it is used in.
    #[error("Integer {value} out of range at line {line}")]
    IntegerOutOfRange { line: usize, value: u64 },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

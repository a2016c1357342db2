//! CLI command implementations.

pub mod common;
pub mod compat;
pub mod conversions;
pub mod decompose;
pub mod graph;
pub mod path;
pub mod rebase;
pub mod transpile;
pub mod version;

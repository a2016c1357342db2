//! Built-in compilation passes.

mod decompose;
mod verification;

pub use decompose::{DecomposeControlledRotations, decomposition_for};
pub use verification::BasisVerification;

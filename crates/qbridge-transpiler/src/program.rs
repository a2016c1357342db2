//! Program values and program-type labels.

use std::any::{Any, TypeId};
use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TranspileError, TranspileResult};

/// Label naming a program representation, such as `"qasm3"` or `"ionq"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramType(String);

impl ProgramType {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProgramType {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for ProgramType {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl Borrow<str> for ProgramType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProgramType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A value that can travel through the conversion graph.
///
/// Implemented for every `Clone + Debug + Send + Sync + 'static` type.
pub trait ProgramData: Any + fmt::Debug + Send + Sync {
    fn clone_box(&self) -> Box<dyn ProgramData>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
    fn type_name(&self) -> &'static str;
}

impl<T> ProgramData for T
where
    T: Any + Clone + fmt::Debug + Send + Sync,
{
    fn clone_box(&self) -> Box<dyn ProgramData> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An owned, type-erased program. Cloning deep-copies the payload.
pub struct Program(Box<dyn ProgramData>);

impl Program {
    pub fn new<T: ProgramData>(payload: T) -> Self {
        Self(Box::new(payload))
    }

    /// `TypeId` of the payload.
    pub fn payload_type_id(&self) -> TypeId {
        let any: &dyn Any = self.0.as_any();
        any.type_id()
    }

    /// Rust type name of the payload, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.payload_type_id() == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    /// Take the payload out, or `None` if it is not a `T`.
    pub fn downcast<T: Any>(self) -> Option<T> {
        self.0.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl Clone for Program {
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Program").field(&self.0).finish()
    }
}

/// OpenQASM 2 source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qasm2(pub String);

/// OpenQASM 3 source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qasm3(pub String);

/// Wrap OpenQASM text as [`Qasm2`] or [`Qasm3`] according to its
/// `OPENQASM` header. Comments and blank lines before the header are skipped.
pub fn qasm_program_from_text(text: &str) -> TranspileResult<Program> {
    let major = qasm_major_version(text).ok_or_else(|| {
        TranspileError::UnregisteredType("OpenQASM text without a version header".into())
    })?;

    match major {
        2 => Ok(Program::new(Qasm2(text.to_string()))),
        3 => Ok(Program::new(Qasm3(text.to_string()))),
        other => Err(TranspileError::UnregisteredType(format!(
            "OpenQASM version {other}"
        ))),
    }
}

fn qasm_major_version(text: &str) -> Option<u32> {
    let mut in_block_comment = false;
    for line in text.lines() {
        let mut line = line.trim();
        if in_block_comment {
            let Some(end) = line.find("*/") else {
                continue;
            };
            line = line[end + 2..].trim();
            in_block_comment = false;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some(rest) = line.strip_prefix("/*") {
            match rest.find("*/") {
                Some(end) => line = rest[end + 2..].trim(),
                None => {
                    in_block_comment = true;
                    continue;
                }
            }
            if line.is_empty() {
                continue;
            }
        }

        let version = line.strip_prefix("OPENQASM")?.trim_start();
        let digits: String = version.chars().take_while(char::is_ascii_digit).collect();
        return digits.parse().ok();
    }
    None
}

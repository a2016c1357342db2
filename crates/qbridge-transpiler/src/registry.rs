//! Conversion function registry.
//!
//! Conversion functions are keyed by their `(source, target)` pair. The
//! graph builds one edge per registered function.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::conversion::ConversionFn;
use crate::conversions;
use crate::error::{TranspileError, TranspileResult};
use crate::program::ProgramType;

/// Registry of conversion functions.
#[derive(Default, Clone)]
pub struct ConversionRegistry {
    functions: BTreeMap<(ProgramType, ProgramType), ConversionFn>,
}

impl ConversionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The conversions shipped with this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for func in conversions::builtin() {
            // Builtin names are well-formed.
            let _ = registry.register_named(func);
        }
        registry
    }

    /// Register a conversion between two labels, replacing any previous one.
    /// Returns the replaced function.
    pub fn register(
        &mut self,
        source: impl Into<ProgramType>,
        target: impl Into<ProgramType>,
        func: ConversionFn,
    ) -> Option<ConversionFn> {
        let key = (source.into(), target.into());
        debug!("Registering conversion: {} -> {} ({})", key.0, key.1, func.name());
        self.functions.insert(key, func)
    }

    /// Register a function named `{source}_to_{target}`.
    pub fn register_named(&mut self, func: ConversionFn) -> TranspileResult<Option<ConversionFn>> {
        let (source, target) = func
            .name()
            .split_once("_to_")
            .filter(|(s, t)| !s.is_empty() && !t.is_empty())
            .map(|(s, t)| (ProgramType::from(s), ProgramType::from(t)))
            .ok_or_else(|| {
                TranspileError::InvalidConversion(format!(
                    "'{}' is not named '<source>_to_<target>'",
                    func.name()
                ))
            })?;
        Ok(self.register(source, target, func))
    }

    /// Remove the conversion between two labels.
    pub fn unregister(&mut self, source: &str, target: &str) -> Option<ConversionFn> {
        let removed = self
            .functions
            .remove(&(ProgramType::from(source), ProgramType::from(target)));
        if removed.is_some() {
            debug!("Unregistering conversion: {} -> {}", source, target);
        }
        removed
    }

    pub fn get(&self, source: &str, target: &str) -> Option<&ConversionFn> {
        self.functions
            .get(&(ProgramType::from(source), ProgramType::from(target)))
    }

    /// Registered conversions, sorted by `(source, target)`.
    pub fn iter(&self) -> impl Iterator<Item = (&ProgramType, &ProgramType, &ConversionFn)> {
        self.functions.iter().map(|((s, t), f)| (s, t, f))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.functions.values().map(ConversionFn::name))
            .finish()
    }
}

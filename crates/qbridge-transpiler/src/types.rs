//! Program-type registry.
//!
//! Maps payload Rust types to [`ProgramType`] labels and holds the optional
//! decomposer of each label, used by the driver to retry a failed step.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::conversions::{IonQProgram, decompose_qasm2, decompose_qasm3};
use crate::error::{BoxError, TranspileError, TranspileResult};
use crate::program::{Program, ProgramData, ProgramType, Qasm2, Qasm3};

/// Resolves the label of a program.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, program: &Program) -> TranspileResult<ProgramType>;
}

/// Rewrites a program into an equivalent one of the same type with fewer
/// unsupported constructs.
pub type Decomposer = Arc<dyn Fn(Program) -> Result<Program, BoxError> + Send + Sync>;

/// Registry of program types.
#[derive(Default, Clone)]
pub struct ProgramTypeRegistry {
    by_type: FxHashMap<TypeId, ProgramType>,
    by_label: BTreeMap<ProgramType, TypeId>,
    decomposers: FxHashMap<ProgramType, Decomposer>,
}

impl ProgramTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in types: `qasm2`, `qasm3`, `openqasm3` and `ionq`, with
    /// decomposers on the two text types.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert::<Qasm2>("qasm2".into());
        registry.insert::<Qasm3>("qasm3".into());
        registry.insert::<qbridge_qasm::syntax::Program>("openqasm3".into());
        registry.insert::<IonQProgram>("ionq".into());
        registry
            .decomposers
            .insert("qasm2".into(), Arc::new(decompose_qasm2));
        registry
            .decomposers
            .insert("qasm3".into(), Arc::new(decompose_qasm3));
        registry
    }

    /// Register `T` under `label`. Re-registering the same pair is a no-op;
    /// reusing either side for something else is a [`TranspileError::TypeConflict`].
    pub fn register<T: ProgramData>(&mut self, label: impl Into<ProgramType>) -> TranspileResult<()> {
        let label = label.into();
        let type_id = TypeId::of::<T>();

        if let Some(existing) = self.by_type.get(&type_id).filter(|l| **l != label) {
            return Err(TranspileError::TypeConflict(format!(
                "{} is already registered as '{existing}'",
                std::any::type_name::<T>()
            )));
        }
        if self.by_label.get(&label).is_some_and(|id| *id != type_id) {
            return Err(TranspileError::TypeConflict(format!(
                "label '{label}' is already registered for another type"
            )));
        }

        debug!("Registering program type: {}", label);
        self.insert::<T>(label);
        Ok(())
    }

    fn insert<T: ProgramData>(&mut self, label: ProgramType) {
        self.by_type.insert(TypeId::of::<T>(), label.clone());
        self.by_label.insert(label, TypeId::of::<T>());
    }

    /// Remove a label and its decomposer. Returns whether it was registered.
    pub fn unregister(&mut self, label: &str) -> bool {
        self.decomposers.remove(label);
        match self.by_label.remove(label) {
            Some(type_id) => {
                debug!("Unregistering program type: {}", label);
                self.by_type.remove(&type_id);
                true
            }
            None => false,
        }
    }

    /// Attach a decomposer to a registered label, replacing any previous one.
    pub fn register_decomposer(
        &mut self,
        label: impl Into<ProgramType>,
        decomposer: impl Fn(Program) -> Result<Program, BoxError> + Send + Sync + 'static,
    ) -> TranspileResult<()> {
        let label = label.into();
        if !self.by_label.contains_key(&label) {
            return Err(TranspileError::UnregisteredType(label.to_string()));
        }
        debug!("Registering decomposer for {}", label);
        self.decomposers.insert(label, Arc::new(decomposer));
        Ok(())
    }

    pub fn is_registered(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    pub fn has_decomposer(&self, label: &str) -> bool {
        self.decomposers.contains_key(label)
    }

    /// Run the decomposer of `label`. Fails with
    /// [`TranspileError::UnregisteredType`] if there is none.
    pub fn decompose(&self, label: &ProgramType, program: Program) -> TranspileResult<Program> {
        let decomposer = self
            .decomposers
            .get(label)
            .ok_or_else(|| TranspileError::UnregisteredType(format!("no decomposer for '{label}'")))?;
        decomposer(program).map_err(|cause| TranspileError::Decomposition {
            label: label.clone(),
            cause,
        })
    }

    /// Registered labels, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &ProgramType> {
        self.by_label.keys()
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

impl TypeResolver for ProgramTypeRegistry {
    fn resolve(&self, program: &Program) -> TranspileResult<ProgramType> {
        self.by_type
            .get(&program.payload_type_id())
            .cloned()
            .ok_or_else(|| TranspileError::UnregisteredType(program.type_name().to_string()))
    }
}

impl fmt::Debug for ProgramTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut decomposable: Vec<&str> = self.decomposers.keys().map(ProgramType::as_str).collect();
        decomposable.sort_unstable();
        f.debug_struct("ProgramTypeRegistry")
            .field("labels", &self.by_label.keys().collect::<Vec<_>>())
            .field("decomposable", &decomposable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Custom;

    #[test]
    fn test_builtin_resolution() {
        let registry = ProgramTypeRegistry::builtin();
        let label = registry
            .resolve(&Program::new(Qasm3("OPENQASM 3.0;".into())))
            .unwrap();
        assert_eq!(label.as_str(), "qasm3");
        assert!(registry.has_decomposer("qasm2"));
        assert!(!registry.has_decomposer("ionq"));
        assert_eq!(
            registry.labels().map(ProgramType::as_str).collect::<Vec<_>>(),
            ["ionq", "openqasm3", "qasm2", "qasm3"]
        );
    }

    #[test]
    fn test_unregistered_payload() {
        let registry = ProgramTypeRegistry::builtin();
        let err = registry.resolve(&Program::new(Custom)).unwrap_err();
        assert!(matches!(err, TranspileError::UnregisteredType(_)));
        assert!(err.is_lookup());
    }

    #[test]
    fn test_register_conflicts() {
        let mut registry = ProgramTypeRegistry::builtin();
        registry.register::<Custom>("custom").unwrap();
        registry.register::<Custom>("custom").unwrap();

        assert!(matches!(
            registry.register::<Custom>("other"),
            Err(TranspileError::TypeConflict(_))
        ));
        assert!(matches!(
            registry.register::<Qasm2>("custom"),
            Err(TranspileError::TypeConflict(_))
        ));
    }

    #[test]
    fn test_unregister_and_decomposers() {
        let mut registry = ProgramTypeRegistry::new();
        assert!(registry.register_decomposer("custom", Ok).is_err());

        registry.register::<Custom>("custom").unwrap();
        registry.register_decomposer("custom", Ok).unwrap();
        assert!(registry.has_decomposer("custom"));

        assert!(registry.unregister("custom"));
        assert!(!registry.unregister("custom"));
        assert!(!registry.has_decomposer("custom"));
        assert!(registry.resolve(&Program::new(Custom)).is_err());
    }

    #[test]
    fn test_decompose_wraps_errors() {
        let mut registry = ProgramTypeRegistry::new();
        registry.register::<Custom>("custom").unwrap();
        registry
            .register_decomposer("custom", |_| Err("cannot".into()))
            .unwrap();

        let err = registry
            .decompose(&"custom".into(), Program::new(Custom))
            .unwrap_err();
        assert!(matches!(err, TranspileError::Decomposition { .. }));
    }
}

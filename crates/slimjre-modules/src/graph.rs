use std::collections::{BTreeMap, BTreeSet};

use crate::{ModuleInfo, ModuleName, ModulesError, Result};

/// The platform's module-requires graph (§3 `ModuleGraph`), built once from
/// the running platform's module descriptors.
///
/// Immutable once constructed; `ModuleResolver` (in `slimjre-resolve`)
/// performs the actual transitive-closure walk over it.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    available: BTreeSet<ModuleName>,
    requires: BTreeMap<ModuleName, BTreeSet<ModuleName>>,
}

impl ModuleGraph {
    /// Build a graph from the platform's module descriptors.
    ///
    /// Errors on a duplicate descriptor for the same module name, since
    /// that would make `requires` ambiguous and the platform's own module
    /// system never allows two modules of the same name to coexist.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ModuleInfo>) -> Result<Self> {
        let mut available = BTreeSet::new();
        let mut requires = BTreeMap::new();

        for info in descriptors {
            if !available.insert(info.name.clone()) {
                return Err(ModulesError::DuplicateModule(info.name));
            }
            requires.insert(info.name.clone(), info.requires_names());
        }

        Ok(Self { available, requires })
    }

    pub fn available(&self) -> &BTreeSet<ModuleName> {
        &self.available
    }

    pub fn contains(&self, module: &ModuleName) -> bool {
        self.available.contains(module)
    }

    /// The direct `requires` set of `module`, if the platform has a
    /// descriptor for it.
    pub fn requires_of(&self, module: &ModuleName) -> Option<&BTreeSet<ModuleName>> {
        self.requires.get(module)
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

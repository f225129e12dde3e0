//! Transitive closure over the platform's module-requires graph (§4.14).
//!
//! Grounded on `crates/nova-build/src/module_graph.rs`'s worklist-adjacent
//! dedup/sort idiom: a plain `Vec`-backed stack, a result set that also
//! serves as the "already visited" check, and a final sort for determinism.

use std::collections::BTreeSet;

use slimjre_modules::{ModuleGraph, ModuleName};

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("required platform module `{0}` is not present on this platform")]
    MissingModule(ModuleName),
}

/// Resolves an initial set of module names into the smallest set closed
/// under the platform's `requires` relation, rooted in a specific
/// [`ModuleGraph`].
#[derive(Debug, Clone, Copy)]
pub struct ModuleResolver<'a> {
    graph: &'a ModuleGraph,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(graph: &'a ModuleGraph) -> Self {
        Self { graph }
    }

    /// Resolve `initial` into its transitive closure, sorted
    /// lexicographically. `java.base` is always present in the result.
    ///
    /// A module from `initial` (or reached transitively) that is absent
    /// from the platform is fatal when it carries a platform prefix
    /// (`java.`, `jdk.`, ...); an application module that is merely
    /// referenced but never installed (this never happens for a module
    /// *required* by another platform module, only for something a
    /// caller passed in directly) is skipped silently per §4.14 step 3.
    pub fn resolve(&self, initial: impl IntoIterator<Item = ModuleName>) -> Result<Vec<ModuleName>> {
        let mut result: BTreeSet<ModuleName> = BTreeSet::new();
        let mut stack: Vec<ModuleName> = initial.into_iter().collect();

        while let Some(module) = stack.pop() {
            if result.contains(&module) {
                continue;
            }

            if !self.graph.contains(&module) {
                if module.is_platform_module() {
                    return Err(ResolveError::MissingModule(module));
                }
                tracing::debug!(
                    target: "slimjre.resolve",
                    module = %module,
                    "skipping application module absent from the platform"
                );
                continue;
            }

            result.insert(module.clone());

            if let Some(requires) = self.graph.requires_of(&module) {
                for required in requires {
                    if !result.contains(required) {
                        stack.push(required.clone());
                    }
                }
            }
        }

        result.insert(ModuleName::base());

        Ok(result.into_iter().collect())
    }
}

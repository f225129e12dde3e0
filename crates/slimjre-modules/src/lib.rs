//! Module descriptor types shared between the class-file parser, the
//! platform abstraction, and the resolver.
//!
//! These mirror the shape `module-info.class` parsing naturally produces
//! (name, `requires`/`exports`/`opens`/`uses`/`provides`) without pulling in
//! anything else: a module descriptor is a flat record, not a graph.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

mod graph;

pub use graph::ModuleGraph;

/// Platform module name prefixes, in the sense of GLOSSARY's "Platform
/// module": a module whose name begins with one of these is resolved
/// strictly (a missing platform module is fatal); anything else is an
/// application module and missing ones are skipped silently by the
/// resolver.
pub const PLATFORM_PREFIXES: &[&str] = &["java.", "jdk.", "javafx.", "oracle."];

/// The base module, unconditionally present in every resolved set.
pub const BASE_MODULE: &str = "java.base";

/// An opaque module identifier.
///
/// Deliberately just a `String` wrapper: nothing in this domain needs to
/// validate module-name syntax beyond what `module-info.class` already
/// guarantees by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn base() -> Self {
        Self::new(BASE_MODULE)
    }

    /// True if this name begins with a reserved platform-family prefix.
    pub fn is_platform_module(&self) -> bool {
        PLATFORM_PREFIXES.iter().any(|prefix| self.0.starts_with(prefix))
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModuleName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `requires` directive of a module descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requires {
    pub module: ModuleName,
    pub is_transitive: bool,
    pub is_static: bool,
}

/// `exports` directive, optionally qualified to specific modules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Exports {
    pub package: String,
    /// Empty means an unqualified (public) export.
    pub to: Vec<String>,
}

/// `opens` directive, optionally qualified to specific modules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Opens {
    pub package: String,
    pub to: Vec<String>,
}

/// `uses` directive (service consumer declaration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uses {
    pub service: String,
}

/// `provides ... with ...` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provides {
    pub service: String,
    pub implementations: Vec<String>,
}

/// The kind of module a descriptor describes.
///
/// Every descriptor this workspace parses comes from a real
/// `module-info.class` (platform jmods, or explicit application/library
/// modules); automatic and unnamed modules never produce a `ModuleInfo` of
/// their own; they are simply absent from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Explicit,
}

/// A fully parsed module descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub kind: ModuleKind,
    pub name: ModuleName,
    pub is_open: bool,
    pub requires: Vec<Requires>,
    pub exports: Vec<Exports>,
    pub opens: Vec<Opens>,
    pub uses: Vec<Uses>,
    pub provides: Vec<Provides>,
}

impl ModuleInfo {
    pub fn requires_names(&self) -> BTreeSet<ModuleName> {
        self.requires.iter().map(|r| r.module.clone()).collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModulesError {
    #[error("duplicate module descriptor for `{0}`")]
    DuplicateModule(ModuleName),
}

pub type Result<T> = std::result::Result<T, ModulesError>;

/// A `requires` adjacency map keyed by module name, used both by
/// [`ModuleGraph`] and directly by callers that only need the raw
/// descriptor data (e.g. the modular-archive path of `StaticDepAnalyzer`,
/// which reads `requires` off a single descriptor without building a full
/// graph).
pub type RequiresMap = BTreeMap<ModuleName, BTreeSet<ModuleName>>;

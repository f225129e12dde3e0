//! Abstraction over "the platform whose modules we are inferring
//! requirements against": a real installed JDK (`JdkPlatform`, backed by
//! `$JAVA_HOME/jmods/*.jmod`) or an in-memory fixture (`FakePlatform`, for
//! tests).
//!
//! Grounded on `nova-jdk`'s declared dependency shape (`nova-classfile`,
//! `nova-modules`, `nova-process`; its `src/` is absent from the retrieval
//! pack) as the nearest analogue to "construct the platform's module graph
//! and run platform tools against it".

mod jdk;

pub use jdk::JdkPlatform;

use std::path::{Path, PathBuf};

use slimjre_classfile::ClassFile;
use slimjre_modules::{ModuleGraph, ModuleName};
use slimjre_process::CommandOutput;

pub type Result<T> = std::result::Result<T, PlatformError>;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("module {0} is not present on this platform")]
    UnknownModule(ModuleName),
    #[error("failed to read resource {resource} from module {module}")]
    ResourceRead {
        module: ModuleName,
        resource: String,
        #[source]
        source: slimjre_archive::ArchiveError,
    },
    #[error("module {module} has no resource {resource}")]
    MissingResource { module: ModuleName, resource: String },
    #[error("failed to invoke the static dependency analysis tool")]
    ToolInvocation(#[source] std::io::Error),
    #[error("failed to enumerate platform modules")]
    Io(#[source] std::io::Error),
    #[error("failed to parse {0} as a class file")]
    MalformedClass(String, #[source] slimjre_classfile::Error),
    #[error("platform module discovery failed")]
    ModuleGraph(#[source] slimjre_modules::ModulesError),
}

/// The running platform: its module graph, resource access, and the
/// external static-dependency tool it ships.
///
/// `Send + Sync` so the orchestrator can share one `&dyn Platform` across the
/// `rayon::scope` workers that fan out the analyzers (§5).
pub trait Platform: Send + Sync {
    fn available_modules(&self) -> &ModuleGraph;

    /// Read a resource (class file, service descriptor, ...) out of a
    /// specific platform module. Returns `Ok(None)` when the resource is
    /// absent rather than erroring, matching `Archive::read`'s convention.
    fn module_resource(&self, module: &ModuleName, resource: &str) -> Result<Option<Vec<u8>>>;

    /// Every resource path (`/`-separated, relative to the module's own
    /// root) contained in `module`. Used by the reflection scanner (§4.8)
    /// to build its process-wide `class_fqcn -> module` index by walking
    /// every module's `.class` resources.
    fn module_resources(&self, module: &ModuleName) -> Result<Vec<String>>;

    /// Invoke the platform's static dependency analysis tool (e.g. `jdeps`)
    /// against `targets`, with `classpath` entries made available for
    /// resolution but not themselves analyzed.
    fn invoke_static_dep_tool(
        &self,
        cwd: &Path,
        classpath: &[PathBuf],
        targets: &[PathBuf],
    ) -> Result<CommandOutput>;

    /// Names of `public static final Locale`-typed fields on the platform's
    /// own `java.util.Locale` class, excluding the English/root locales that
    /// never act as triggers (§4.11's Tier-1 trigger set).
    fn locale_trigger_fields(&self) -> Result<Vec<String>> {
        const EXCLUDED: &[&str] = &["ENGLISH", "ROOT", "US", "UK", "CANADA"];
        const ACC_PUBLIC: u16 = 0x0001;
        const ACC_STATIC: u16 = 0x0008;
        const ACC_FINAL: u16 = 0x0010;
        const LOCALE_DESCRIPTOR: &str = "Ljava/util/Locale;";

        let base = ModuleName::base();
        let bytes = self
            .module_resource(&base, "java/util/Locale.class")?
            .ok_or_else(|| PlatformError::MissingResource {
                module: base.clone(),
                resource: "java/util/Locale.class".to_string(),
            })?;

        let class = ClassFile::parse(&bytes)
            .map_err(|source| PlatformError::MalformedClass("java/util/Locale".to_string(), source))?;

        let required = ACC_PUBLIC | ACC_STATIC | ACC_FINAL;
        let fields = class
            .fields
            .iter()
            .filter(|f| (f.access_flags & required) == required)
            .filter(|f| f.descriptor == LOCALE_DESCRIPTOR)
            .map(|f| f.name.clone())
            .filter(|name| !EXCLUDED.contains(&name.as_str()))
            .collect();

        Ok(fields)
    }
}

/// An in-memory [`Platform`] fixture for tests: a fixed module graph plus a
/// map of `(module, resource) -> bytes`.
#[derive(Debug, Default)]
pub struct FakePlatform {
    graph: ModuleGraph,
    resources: std::collections::BTreeMap<(ModuleName, String), Vec<u8>>,
    static_dep_output: Option<CommandOutput>,
}

impl FakePlatform {
    pub fn new(graph: ModuleGraph) -> Self {
        Self {
            graph,
            resources: std::collections::BTreeMap::new(),
            static_dep_output: None,
        }
    }

    pub fn with_resource(mut self, module: ModuleName, resource: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.resources.insert((module, resource.into()), bytes);
        self
    }
}

impl Platform for FakePlatform {
    fn available_modules(&self) -> &ModuleGraph {
        &self.graph
    }

    fn module_resource(&self, module: &ModuleName, resource: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .resources
            .get(&(module.clone(), resource.to_string()))
            .cloned())
    }

    fn module_resources(&self, module: &ModuleName) -> Result<Vec<String>> {
        Ok(self
            .resources
            .keys()
            .filter(|(m, _)| m == module)
            .map(|(_, resource)| resource.clone())
            .collect())
    }

    fn invoke_static_dep_tool(
        &self,
        _cwd: &Path,
        _classpath: &[PathBuf],
        _targets: &[PathBuf],
    ) -> Result<CommandOutput> {
        self.static_dep_output
            .clone()
            .ok_or_else(|| PlatformError::ToolInvocation(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "FakePlatform has no configured static-dep tool output",
            )))
    }
}

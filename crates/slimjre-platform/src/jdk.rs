use std::path::{Path, PathBuf};

use slimjre_archive::Archive;
use slimjre_classfile::parse_module_info_class;
use slimjre_modules::{ModuleGraph, ModuleName};
use slimjre_process::{CommandOutput, CommandRunner, DefaultCommandRunner};

use crate::{Platform, PlatformError, Result};

/// A real installed JDK, backed by `$JAVA_HOME/jmods/*.jmod`.
pub struct JdkPlatform {
    java_home: PathBuf,
    graph: ModuleGraph,
    runner: Box<dyn CommandRunner>,
}

impl std::fmt::Debug for JdkPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JdkPlatform")
            .field("java_home", &self.java_home)
            .field("modules", &self.graph.len())
            .finish()
    }
}

impl JdkPlatform {
    /// Enumerate `$java_home/jmods/*.jmod`, parsing each one's
    /// `module-info.class` to build the platform's module graph.
    pub fn discover(java_home: impl Into<PathBuf>) -> Result<Self> {
        let java_home = java_home.into();
        let jmods_dir = java_home.join("jmods");

        let entries = std::fs::read_dir(&jmods_dir).map_err(|source| {
            PlatformError::ToolInvocation(source)
        })?;

        let mut descriptors = Vec::new();
        for entry in entries {
            let entry = entry.map_err(PlatformError::ToolInvocation)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jmod") {
                continue;
            }

            let archive = Archive::open_jmod(&path);
            let Some(bytes) = archive
                .read("classes/module-info.class")
                .map_err(|source| PlatformError::ResourceRead {
                    module: ModuleName::new(path.display().to_string()),
                    resource: "classes/module-info.class".to_string(),
                    source,
                })?
            else {
                continue;
            };

            let info = parse_module_info_class(&bytes)
                .map_err(|source| PlatformError::MalformedClass(path.display().to_string(), source))?;
            descriptors.push(info);
        }

        let graph = ModuleGraph::from_descriptors(descriptors).map_err(PlatformError::ModuleGraph)?;

        Ok(Self {
            java_home,
            graph,
            runner: Box::new(DefaultCommandRunner::default()),
        })
    }

    fn jmod_path_for(&self, module: &ModuleName) -> PathBuf {
        self.java_home
            .join("jmods")
            .join(format!("{}.jmod", module.as_str()))
    }

    fn jdeps_path(&self) -> PathBuf {
        self.java_home.join("bin").join("jdeps")
    }
}

impl Platform for JdkPlatform {
    fn available_modules(&self) -> &ModuleGraph {
        &self.graph
    }

    fn module_resource(&self, module: &ModuleName, resource: &str) -> Result<Option<Vec<u8>>> {
        if !self.graph.contains(module) {
            return Err(PlatformError::UnknownModule(module.clone()));
        }
        let path = self.jmod_path_for(module);
        let archive = Archive::open_jmod(&path);
        let classes_path = format!("classes/{resource}");
        archive
            .read(&classes_path)
            .map_err(|source| PlatformError::ResourceRead {
                module: module.clone(),
                resource: resource.to_string(),
                source,
            })
    }

    fn module_resources(&self, module: &ModuleName) -> Result<Vec<String>> {
        if !self.graph.contains(module) {
            return Err(PlatformError::UnknownModule(module.clone()));
        }
        let path = self.jmod_path_for(module);
        let archive = Archive::open_jmod(&path);
        let names = archive.entry_names().map_err(|source| PlatformError::ResourceRead {
            module: module.clone(),
            resource: "<entry listing>".to_string(),
            source,
        })?;
        Ok(names
            .into_iter()
            .filter_map(|name| name.strip_prefix("classes/").map(str::to_string))
            .collect())
    }

    fn invoke_static_dep_tool(
        &self,
        cwd: &Path,
        classpath: &[PathBuf],
        targets: &[PathBuf],
    ) -> Result<CommandOutput> {
        let classpath_str = std::env::join_paths(classpath)
            .map_err(|err| PlatformError::ToolInvocation(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                err,
            )))?
            .to_string_lossy()
            .into_owned();

        let mut args = vec![
            "--ignore-missing-deps".to_string(),
            "--print-module-deps".to_string(),
            "--multi-release".to_string(),
            "base".to_string(),
        ];
        if !classpath.is_empty() {
            args.push("-classpath".to_string());
            args.push(classpath_str);
        }
        for target in targets {
            args.push(target.display().to_string());
        }

        self.runner
            .run(cwd, &self.jdeps_path(), &args)
            .map_err(PlatformError::ToolInvocation)
    }
}

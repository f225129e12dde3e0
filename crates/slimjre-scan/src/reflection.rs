//! `Class.forName`-style reflective references: string constants that look
//! like a fully-qualified platform class name, resolved against an index of
//! every class resource every platform module actually carries.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use slimjre_classfile::ClassVisitor;
use slimjre_diagnostics::WarningSink;
use slimjre_modules::ModuleName;
use slimjre_platform::Platform;

use crate::common::for_each_class;
use crate::ScannerOutput;

/// `class_fqcn (dotted) -> module` index built from every platform module's
/// `.class` resources. Built once per analysis run and shared by reference
/// across the parallel scanners that need it, rather than behind a
/// process-wide lazy-static lock: the orchestrator owns exactly one instance
/// per run and hands out `&ReflectionClassIndex` to whichever scanner asks.
pub struct ReflectionClassIndex {
    fqcn_to_module: BTreeMap<String, ModuleName>,
}

impl ReflectionClassIndex {
    pub fn build(platform: &dyn Platform) -> slimjre_platform::Result<Self> {
        let mut fqcn_to_module = BTreeMap::new();
        for module in platform.available_modules().available() {
            for resource in platform.module_resources(module)? {
                let Some(class_path) = resource.strip_suffix(".class") else {
                    continue;
                };
                let fqcn = class_path.replace('/', ".");
                fqcn_to_module.entry(fqcn).or_insert_with(|| module.clone());
            }
        }
        Ok(Self { fqcn_to_module })
    }

    pub fn lookup(&self, fqcn: &str) -> Option<&ModuleName> {
        self.fqcn_to_module.get(fqcn)
    }

    pub fn len(&self) -> usize {
        self.fqcn_to_module.len()
    }
}

/// Recognized first-segment roots (§4.8). `com.sun` is listed as a two-label
/// unit, not bare `com`, so an application class under `com.example` is
/// never mistaken for a platform reference.
const VALID_ROOTS: &[&str] = &["java", "javax", "jdk", "sun", "com.sun"];

/// A string constant's shape-only validity filter: does it look like a
/// fully-qualified platform class name at all, before even consulting the
/// index. Keeps the scanner from wasting index lookups on arbitrary string
/// literals that happen to contain dots.
fn looks_like_platform_class_name(candidate: &str) -> bool {
    if !candidate.contains('.') {
        return false;
    }
    if candidate
        .chars()
        .any(|c| c.is_whitespace() || c == '=' || c == '/' || c == '\\')
    {
        return false;
    }

    let starts_with_valid_root = VALID_ROOTS
        .iter()
        .any(|root| candidate == *root || candidate.starts_with(&format!("{root}.")));
    if !starts_with_valid_root {
        return false;
    }

    candidate.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
    })
}

struct ReflectionVisitor<'a> {
    index: &'a ReflectionClassIndex,
    modules: &'a mut BTreeSet<ModuleName>,
}

impl ClassVisitor for ReflectionVisitor<'_> {
    fn visit_loaded_string(&mut self, value: &str) {
        if looks_like_platform_class_name(value) {
            if let Some(module) = self.index.lookup(value) {
                self.modules.insert(module.clone());
            }
        }
    }
}

pub struct ReflectionScanner;

impl ReflectionScanner {
    pub fn scan(archives: &[PathBuf], index: &ReflectionClassIndex, warnings: &WarningSink) -> ScannerOutput {
        let mut modules = BTreeSet::new();
        for_each_class(archives, warnings, |_path, class| {
            let mut visitor = ReflectionVisitor { index, modules: &mut modules };
            class.accept(&mut visitor);
        });
        ScannerOutput { modules }
    }
}

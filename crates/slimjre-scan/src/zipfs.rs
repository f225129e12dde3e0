//! `jar:`/`zip:` filesystem-provider usage: references to the NIO
//! filesystem factory or the bundled zip filesystem provider imply
//! `jdk.zipfs`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use slimjre_classfile::{ClassVisitor, FieldType};
use slimjre_diagnostics::WarningSink;
use slimjre_modules::ModuleName;

use crate::common::for_each_class;
use crate::PatternDetection;

const ZIP_FS_FACTORY_CLASS: &str = "java/nio/file/FileSystems";
const ZIP_FS_PROVIDER_CLASS: &str = "jdk/nio/zipfs/ZipFileSystemProvider";
const ZIP_FS_MODULE: &str = "jdk.zipfs";

#[derive(Default)]
struct ZipFsVisitor {
    patterns: BTreeSet<String>,
}

impl ZipFsVisitor {
    fn check_class(&mut self, class: &str) {
        if class == ZIP_FS_FACTORY_CLASS || class == ZIP_FS_PROVIDER_CLASS {
            self.patterns.insert(class.to_string());
        }
    }
}

impl ClassVisitor for ZipFsVisitor {
    fn visit_type_instruction(&mut self, class: &str) {
        self.check_class(class);
    }

    fn visit_field_type(&mut self, field_type: &FieldType) {
        if let FieldType::Object(name) = field_type {
            self.check_class(name);
        }
    }

    fn visit_loaded_string(&mut self, value: &str) {
        if value == "jar" || value == "zip" || value.starts_with("jar:") {
            self.patterns.insert(format!("string:{value}"));
        }
    }

    fn visit_method_invocation(&mut self, owner: &str, name: &str, _descriptor: &str) {
        if owner == ZIP_FS_FACTORY_CLASS && matches!(name, "newFileSystem" | "getFileSystem") {
            self.patterns.insert(format!("{owner}.{name}"));
        }
        if owner == ZIP_FS_PROVIDER_CLASS {
            self.patterns.insert(format!("{owner}.{name}"));
        }
    }
}

pub struct ZipFsScanner;

impl ZipFsScanner {
    pub fn scan(archives: &[PathBuf], warnings: &WarningSink) -> PatternDetection {
        let mut patterns = BTreeSet::new();
        let mut archives_hit = BTreeSet::new();

        for_each_class(archives, warnings, |path: &Path, class| {
            let mut visitor = ZipFsVisitor::default();
            class.accept(&mut visitor);
            if !visitor.patterns.is_empty() {
                archives_hit.insert(path.to_path_buf());
                patterns.extend(visitor.patterns);
            }
        });

        let modules = if patterns.is_empty() {
            BTreeSet::new()
        } else {
            BTreeSet::from([ModuleName::new(ZIP_FS_MODULE)])
        };

        PatternDetection {
            modules,
            patterns,
            archives: archives_hit,
        }
    }
}

//! Static API usage: every type a class references (superclass, interfaces,
//! field/method descriptors, thrown/caught exceptions, instruction owners
//! and operands), mapped through the package-module table.

use std::collections::BTreeSet;
use std::path::PathBuf;

use slimjre_classfile::{ClassVisitor, FieldType};
use slimjre_diagnostics::WarningSink;
use slimjre_modules::ModuleName;

use crate::common::for_each_class;
use crate::package_map::PackageModuleMap;
use crate::ScannerOutput;

struct ApiVisitor<'a> {
    modules: &'a mut BTreeSet<ModuleName>,
}

impl ApiVisitor<'_> {
    fn record(&mut self, internal_name: &str) {
        if let Some(module) = PackageModuleMap::lookup_class(internal_name) {
            self.modules.insert(module);
        }
    }
}

impl ClassVisitor for ApiVisitor<'_> {
    fn visit_superclass(&mut self, superclass: &str) {
        self.record(superclass);
    }

    fn visit_interface(&mut self, interface: &str) {
        self.record(interface);
    }

    fn visit_field_type(&mut self, field_type: &FieldType) {
        if let FieldType::Object(name) = field_type {
            self.record(name);
        }
    }

    fn visit_declared_exception(&mut self, exception_class: &str) {
        self.record(exception_class);
    }

    fn visit_catch_type(&mut self, catch_class: &str) {
        self.record(catch_class);
    }

    fn visit_method_invocation(&mut self, owner: &str, _name: &str, _descriptor: &str) {
        self.record(owner);
    }

    fn visit_field_access(&mut self, owner: &str, _name: &str, _descriptor: &str) {
        self.record(owner);
    }

    fn visit_type_instruction(&mut self, class: &str) {
        self.record(class);
    }
}

pub struct ApiUsageScanner;

impl ApiUsageScanner {
    pub fn scan(archives: &[PathBuf], warnings: &WarningSink) -> ScannerOutput {
        let mut modules = BTreeSet::new();
        for_each_class(archives, warnings, |_path, class| {
            let mut visitor = ApiVisitor { modules: &mut modules };
            class.accept(&mut visitor);
        });
        ScannerOutput { modules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slimjre_classfile::ClassFile;

    fn class_referencing_sql_driver() -> ClassFile {
        ClassFile {
            minor_version: 0,
            major_version: 61,
            access_flags: 0,
            this_class: "com/example/App".to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: vec![slimjre_classfile::ClassMember {
                access_flags: 0,
                name: "connect".to_string(),
                descriptor: "()Ljava/sql/Connection;".to_string(),
                signature: None,
                runtime_visible_annotations: Vec::new(),
                runtime_invisible_annotations: Vec::new(),
                constant_value: None,
                exceptions: Vec::new(),
                code: None,
            }],
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    #[test]
    fn method_return_type_maps_to_owning_module() {
        let class = class_referencing_sql_driver();
        let mut modules = BTreeSet::new();
        let mut visitor = ApiVisitor { modules: &mut modules };
        class.accept(&mut visitor);
        assert_eq!(modules, BTreeSet::from([ModuleName::new("java.sql")]));
    }

    #[test]
    fn base_module_only_class_yields_no_modules() {
        let class = ClassFile {
            minor_version: 0,
            major_version: 61,
            access_flags: 0,
            this_class: "com/example/Plain".to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            inner_classes: Vec::new(),
        };
        let mut modules = BTreeSet::new();
        let mut visitor = ApiVisitor { modules: &mut modules };
        class.accept(&mut visitor);
        assert!(modules.is_empty());
    }
}

//! Remote JMX management API usage. Deliberately narrower than the full
//! `javax.management` surface: only the `javax.management.remote` namespace
//! (connectors, service URLs, RMI transport) implies the remote-management
//! agent module; the local-only management API lives in `java.base`/
//! `java.management` and is already covered by `PackageModuleMap`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use slimjre_classfile::{ClassVisitor, FieldType};
use slimjre_diagnostics::WarningSink;
use slimjre_modules::ModuleName;

use crate::common::for_each_class;
use crate::PatternDetection;

const JMX_REMOTE_PREFIX: &str = "javax/management/remote/";
const JMX_REMOTE_CLASSES: &[&str] = &[
    "javax/management/remote/JMXConnectorFactory",
    "javax/management/remote/JMXServiceURL",
    "javax/management/remote/JMXConnector",
    "javax/management/remote/JMXConnectorServer",
    "javax/management/remote/JMXAuthenticator",
    "javax/management/remote/JMXPrincipal",
    "javax/management/remote/rmi/RMIConnector",
    "javax/management/remote/rmi/RMIConnectorServer",
];
const JMX_MODULE: &str = "jdk.management.agent";

fn is_jmx_remote_class(class: &str) -> bool {
    class.starts_with(JMX_REMOTE_PREFIX) || JMX_REMOTE_CLASSES.contains(&class)
}

#[derive(Default)]
struct JmxVisitor {
    patterns: BTreeSet<String>,
}

impl JmxVisitor {
    fn check(&mut self, class: &str) {
        if is_jmx_remote_class(class) {
            self.patterns.insert(class.to_string());
        }
    }
}

impl ClassVisitor for JmxVisitor {
    fn visit_superclass(&mut self, superclass: &str) {
        self.check(superclass);
    }

    fn visit_interface(&mut self, interface: &str) {
        self.check(interface);
    }

    fn visit_field_type(&mut self, field_type: &FieldType) {
        if let FieldType::Object(name) = field_type {
            self.check(name);
        }
    }

    fn visit_catch_type(&mut self, catch_class: &str) {
        self.check(catch_class);
    }

    fn visit_type_instruction(&mut self, class: &str) {
        self.check(class);
    }

    fn visit_method_invocation(&mut self, owner: &str, _name: &str, _descriptor: &str) {
        self.check(owner);
    }

    fn visit_field_access(&mut self, owner: &str, _name: &str, _descriptor: &str) {
        self.check(owner);
    }
}

pub struct JmxScanner;

impl JmxScanner {
    pub fn scan(archives: &[PathBuf], warnings: &WarningSink) -> PatternDetection {
        let mut patterns = BTreeSet::new();
        let mut archives_hit = BTreeSet::new();

        for_each_class(archives, warnings, |path: &Path, class| {
            let mut visitor = JmxVisitor::default();
            class.accept(&mut visitor);
            if !visitor.patterns.is_empty() {
                archives_hit.insert(path.to_path_buf());
                patterns.extend(visitor.patterns);
            }
        });

        let modules = if patterns.is_empty() {
            BTreeSet::new()
        } else {
            BTreeSet::from([ModuleName::new(JMX_MODULE)])
        };

        PatternDetection {
            modules,
            patterns,
            archives: archives_hit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jmx_connector_factory() {
        let mut visitor = JmxVisitor::default();
        visitor.check("javax/management/remote/JMXConnectorFactory");
        assert!(!visitor.patterns.is_empty());
    }

    #[test]
    fn local_management_api_is_not_remote() {
        let mut visitor = JmxVisitor::default();
        visitor.check("javax/management/MBeanServer");
        assert!(visitor.patterns.is_empty());
    }

    #[test]
    fn rmi_transport_classes_match() {
        let mut visitor = JmxVisitor::default();
        visitor.check("javax/management/remote/rmi/RMIConnector");
        assert!(!visitor.patterns.is_empty());
    }
}

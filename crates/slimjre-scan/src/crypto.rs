//! TLS/crypto API usage: a fixed set of well-known class names and package
//! prefixes that, if referenced at all, imply the crypto provider module is
//! needed regardless of what `PackageModuleMap` would otherwise infer (those
//! classes live in `java.base`; the provider that backs them at runtime does
//! not).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use slimjre_classfile::ClassVisitor;
use slimjre_diagnostics::WarningSink;
use slimjre_modules::ModuleName;

use crate::common::{descriptor_object_types, for_each_class};

const CRYPTO_CLASS_NAMES: &[&str] = &[
    "javax/net/ssl/SSLContext",
    "javax/net/ssl/SSLSocket",
    "javax/net/ssl/SSLServerSocket",
    "javax/net/ssl/SSLEngine",
    "javax/net/ssl/TrustManagerFactory",
    "javax/net/ssl/KeyManagerFactory",
    "javax/net/ssl/HttpsURLConnection",
    "javax/crypto/Cipher",
    "javax/crypto/KeyGenerator",
    "javax/crypto/Mac",
    "javax/crypto/SecretKey",
    "java/net/http/HttpClient",
];

const CRYPTO_PACKAGE_PREFIXES: &[&str] = &["javax/net/ssl/", "java/net/http/", "javax/crypto/"];

const CRYPTO_PROVIDER_MODULE: &str = "jdk.crypto.ec";

fn is_crypto_reference(class: &str) -> bool {
    CRYPTO_CLASS_NAMES.contains(&class) || CRYPTO_PACKAGE_PREFIXES.iter().any(|prefix| class.starts_with(prefix))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CryptoDetection {
    pub modules: BTreeSet<ModuleName>,
    pub patterns_matched: BTreeSet<String>,
    pub archives_implicated: BTreeSet<PathBuf>,
}

#[derive(Default)]
struct CryptoVisitor {
    patterns: BTreeSet<String>,
}

impl CryptoVisitor {
    fn check(&mut self, class: &str) {
        if is_crypto_reference(class) {
            self.patterns.insert(class.to_string());
        }
    }

    fn check_descriptor(&mut self, descriptor: &str) {
        for ty in descriptor_object_types(descriptor) {
            self.check(&ty);
        }
    }
}

impl ClassVisitor for CryptoVisitor {
    fn visit_superclass(&mut self, superclass: &str) {
        self.check(superclass);
    }

    fn visit_interface(&mut self, interface: &str) {
        self.check(interface);
    }

    fn visit_catch_type(&mut self, catch_class: &str) {
        self.check(catch_class);
    }

    fn visit_method_invocation(&mut self, owner: &str, _name: &str, descriptor: &str) {
        self.check(owner);
        self.check_descriptor(descriptor);
    }

    fn visit_field_access(&mut self, owner: &str, _name: &str, descriptor: &str) {
        self.check(owner);
        self.check_descriptor(descriptor);
    }

    fn visit_type_instruction(&mut self, class: &str) {
        self.check(class);
    }
}

pub struct CryptoScanner;

impl CryptoScanner {
    pub fn scan(archives: &[PathBuf], warnings: &WarningSink) -> CryptoDetection {
        let mut patterns_matched = BTreeSet::new();
        let mut archives_implicated = BTreeSet::new();

        for_each_class(archives, warnings, |path: &Path, class| {
            let mut visitor = CryptoVisitor::default();
            class.accept(&mut visitor);
            if !visitor.patterns.is_empty() {
                archives_implicated.insert(path.to_path_buf());
                patterns_matched.extend(visitor.patterns);
            }
        });

        let modules = if patterns_matched.is_empty() {
            BTreeSet::new()
        } else {
            BTreeSet::from([ModuleName::new(CRYPTO_PROVIDER_MODULE)])
        };

        CryptoDetection {
            modules,
            patterns_matched,
            archives_implicated,
        }
    }
}

//! Locale-sensitive API usage, in three confidence tiers: a class that
//! references a non-English/root `Locale` constant (Tier 1, "definite") is a
//! stronger signal than one that merely calls a locale-aware formatting API
//! (Tier 2, "strong"), which is in turn stronger than a bare call to
//! `Locale.getDefault`/`setDefault`/`getAvailableLocales` (Tier 3,
//! "possible"). Only Tier 1 actually adds `jdk.localedata` to the resolved
//! module set; Tiers 2 and 3 are carried as advisory detail only.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use slimjre_classfile::{ClassVisitor, FieldType};
use slimjre_diagnostics::WarningSink;
use slimjre_modules::ModuleName;
use slimjre_platform::Platform;

use crate::common::for_each_class;

const TIER2_TRIGGER_CLASSES: &[&str] = &[
    "java/util/ResourceBundle",
    "java/text/MessageFormat",
    "java/text/ChoiceFormat",
    "java/text/Collator",
    "java/text/RuleBasedCollator",
];

const LOCALEDATA_MODULE: &str = "jdk.localedata";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LocaleConfidence {
    #[default]
    None,
    Possible,
    Strong,
    Definite,
}

#[derive(Debug, Clone, Default)]
pub struct LocaleDetection {
    pub modules: BTreeSet<ModuleName>,
    pub tier1_hits: BTreeSet<String>,
    pub tier2_hits: BTreeSet<String>,
    pub tier3_hits: BTreeSet<String>,
    pub archives_implicated: BTreeSet<PathBuf>,
    pub confidence: LocaleConfidence,
}

#[derive(Default)]
struct LocaleVisitor {
    trigger_fields: BTreeSet<String>,
    tier1_hits: BTreeSet<String>,
    tier2_hits: BTreeSet<String>,
    tier3_hits: BTreeSet<String>,
}

impl LocaleVisitor {
    fn check_tier2_class(&mut self, class: &str) {
        if TIER2_TRIGGER_CLASSES.contains(&class) {
            self.tier2_hits.insert(class.to_string());
        }
    }

    fn has_hits(&self) -> bool {
        !self.tier1_hits.is_empty() || !self.tier2_hits.is_empty() || !self.tier3_hits.is_empty()
    }
}

impl ClassVisitor for LocaleVisitor {
    fn visit_field_access(&mut self, owner: &str, name: &str, _descriptor: &str) {
        if owner == "java/util/Locale" && self.trigger_fields.contains(name) {
            self.tier1_hits.insert(name.to_string());
        }
    }

    fn visit_superclass(&mut self, superclass: &str) {
        self.check_tier2_class(superclass);
    }

    fn visit_interface(&mut self, interface: &str) {
        self.check_tier2_class(interface);
    }

    fn visit_field_type(&mut self, field_type: &FieldType) {
        if let FieldType::Object(name) = field_type {
            self.check_tier2_class(name);
        }
    }

    fn visit_type_instruction(&mut self, class: &str) {
        self.check_tier2_class(class);
    }

    fn visit_method_invocation(&mut self, owner: &str, name: &str, descriptor: &str) {
        if owner == "java/time/format/DateTimeFormatter"
            && matches!(name, "ofLocalizedDate" | "ofLocalizedDateTime" | "ofLocalizedTime")
        {
            self.tier2_hits.insert(format!("{owner}.{name}"));
        }
        if (owner == "java/text/NumberFormat" || owner == "java/text/DateFormat")
            && descriptor.contains("Ljava/util/Locale;")
        {
            self.tier2_hits.insert(format!("{owner}.{name}"));
        }
        if owner == "java/util/Locale" && matches!(name, "getDefault" | "setDefault" | "getAvailableLocales") {
            self.tier3_hits.insert(format!("{owner}.{name}"));
        }
    }
}

pub struct LocaleScanner;

impl LocaleScanner {
    pub fn scan(
        archives: &[PathBuf],
        platform: &dyn Platform,
        warnings: &WarningSink,
    ) -> slimjre_platform::Result<LocaleDetection> {
        let trigger_fields: BTreeSet<String> = platform.locale_trigger_fields()?.into_iter().collect();

        let mut tier1 = BTreeSet::new();
        let mut tier2 = BTreeSet::new();
        let mut tier3 = BTreeSet::new();
        let mut archives_implicated = BTreeSet::new();

        for_each_class(archives, warnings, |path: &Path, class| {
            let mut visitor = LocaleVisitor {
                trigger_fields: trigger_fields.clone(),
                ..Default::default()
            };
            class.accept(&mut visitor);
            if visitor.has_hits() {
                archives_implicated.insert(path.to_path_buf());
            }
            tier1.extend(visitor.tier1_hits);
            tier2.extend(visitor.tier2_hits);
            tier3.extend(visitor.tier3_hits);
        });

        let confidence = if !tier1.is_empty() {
            LocaleConfidence::Definite
        } else if !tier2.is_empty() {
            LocaleConfidence::Strong
        } else if !tier3.is_empty() {
            LocaleConfidence::Possible
        } else {
            LocaleConfidence::None
        };

        let modules = if confidence == LocaleConfidence::Definite {
            BTreeSet::from([ModuleName::new(LOCALEDATA_MODULE)])
        } else {
            BTreeSet::new()
        };

        Ok(LocaleDetection {
            modules,
            tier1_hits: tier1,
            tier2_hits: tier2,
            tier3_hits: tier3,
            archives_implicated,
            confidence,
        })
    }
}

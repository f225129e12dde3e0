//! The package-prefix map plus the eight bytecode/pattern scanners (§4.6-
//! §4.13): one submodule per scanner, all built on `slimjre-classfile`'s
//! `ClassVisitor` trait so every scanner shares the same read-only walk
//! over a parsed class file instead of re-deriving its own traversal.

mod aot_metadata;
mod api_usage;
mod common;
mod crypto;
mod jmx;
mod locale;
mod package_map;
mod reflection;
mod service_provider;
mod zipfs;

pub use aot_metadata::{AotMetadataOutput, AotMetadataScanner, MavenCoordinate};
pub use api_usage::ApiUsageScanner;
pub use crypto::{CryptoDetection, CryptoScanner};
pub use jmx::JmxScanner;
pub use locale::{LocaleConfidence, LocaleDetection, LocaleScanner};
pub use package_map::PackageModuleMap;
pub use reflection::{ReflectionClassIndex, ReflectionScanner};
pub use service_provider::ServiceProviderScanner;
pub use zipfs::ZipFsScanner;

use std::collections::BTreeSet;
use std::path::PathBuf;

use slimjre_modules::ModuleName;

/// The plain "set of required modules" shape every scanner that does not
/// need tagged provenance returns (§3's `ScannerOutput`). Empty-set is the
/// identity; union is how the orchestrator merges across scanners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerOutput {
    pub modules: BTreeSet<ModuleName>,
}

impl ScannerOutput {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// The `{modules, patterns, archives}` shape shared by `ZipFsScanner` and
/// `JmxScanner` (§3's `DetectionResult` tagged *ZipFs / Jmx* variants).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternDetection {
    pub modules: BTreeSet<ModuleName>,
    pub patterns: BTreeSet<String>,
    pub archives: BTreeSet<PathBuf>,
}

//! The `Config` record the orchestrator takes as input (§3), plus TOML
//! loading.
//!
//! Grounded on `nova-config::NovaConfig`'s shape: `#[schemars(deny_unknown_
//! fields)]` structs, `#[serde(default = "...")]` per-field default
//! functions, a plain `#[serde(rename_all = "lowercase")]` enum for
//! `CryptoMode` mirroring `BuildIntegrationMode`, and a `ConfigError` with
//! an `Io { path, #[source] }` variant plus a `Toml(String)` variant fed by
//! a `From<toml::de::Error>` impl.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use slimjre_modules::ModuleName;

/// `crypto_mode`'s three effects (§3, §4.10).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CryptoMode {
    /// Take the crypto scanner's output as-is.
    #[default]
    Auto,
    /// Force-add the crypto provider module unconditionally.
    Always,
    /// Suppress the crypto scanner's output, recording an advisory warning
    /// when it would otherwise have been non-empty.
    Never,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct Config {
    /// Ordered sequence of archive paths to analyze. Required, non-empty
    /// (enforced by the orchestrator, not at deserialization time, so a
    /// caller building a `Config` programmatically can still populate it
    /// incrementally).
    #[schemars(with = "Vec<String>")]
    pub archives: Vec<PathBuf>,

    /// Directory the image-linker collaborator will write the produced
    /// runtime image to. Required by that collaborator; unused by the core
    /// itself.
    #[schemars(with = "String")]
    pub output_path: PathBuf,

    /// Modules forcibly added before transitive closure.
    #[serde(default, with = "module_name_set")]
    #[schemars(with = "Vec<String>")]
    pub additional_modules: BTreeSet<ModuleName>,

    /// Modules forcibly removed after merging but before transitive
    /// closure.
    #[serde(default, with = "module_name_set")]
    #[schemars(with = "Vec<String>")]
    pub exclude_modules: BTreeSet<ModuleName>,

    #[serde(default = "default_true")]
    pub scan_service_providers: bool,

    #[serde(default = "default_true")]
    pub scan_aot_metadata: bool,

    #[serde(default)]
    pub crypto_mode: CryptoMode,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// A minimal config over `archives`, with every other field at its
    /// default.
    pub fn new(archives: Vec<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            archives,
            output_path: output_path.into(),
            additional_modules: BTreeSet::new(),
            exclude_modules: BTreeSet::new(),
            scan_service_providers: true,
            scan_aot_metadata: true,
            crypto_mode: CryptoMode::default(),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&text)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_string())
    }
}

/// `ModuleName` has no `serde` dependency of its own (its only dependency is
/// `thiserror`, matching the teacher's `nova-modules/Cargo.toml`); this
/// module bridges a `BTreeSet<ModuleName>` to/from a plain list of strings
/// for TOML (de)serialization, kept local to the one crate that needs it.
mod module_name_set {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(set: &BTreeSet<ModuleName>, serializer: S) -> Result<S::Ok, S::Error> {
        let names: Vec<&str> = set.iter().map(ModuleName::as_str).collect();
        names.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<ModuleName>, D::Error> {
        let names: Vec<String> = Vec::deserialize(deserializer)?;
        Ok(names.into_iter().map(ModuleName::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_toml_config() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"
            archives = ["a.jar", "b.jar"]
            output_path = "out"
            "#,
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.archives, vec![PathBuf::from("a.jar"), PathBuf::from("b.jar")]);
        assert_eq!(config.output_path, PathBuf::from("out"));
        assert!(config.scan_service_providers);
        assert!(config.scan_aot_metadata);
        assert_eq!(config.crypto_mode, CryptoMode::Auto);
        assert!(config.additional_modules.is_empty());
    }

    #[test]
    fn loads_full_toml_config() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"
            archives = ["app.jar"]
            output_path = "out"
            additional_modules = ["java.sql"]
            exclude_modules = ["java.desktop"]
            scan_service_providers = false
            scan_aot_metadata = false
            crypto_mode = "always"
            "#,
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert!(!config.scan_service_providers);
        assert!(!config.scan_aot_metadata);
        assert_eq!(config.crypto_mode, CryptoMode::Always);
        assert_eq!(
            config.additional_modules,
            BTreeSet::from([ModuleName::new("java.sql")])
        );
        assert_eq!(
            config.exclude_modules,
            BTreeSet::from([ModuleName::new("java.desktop")])
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load_from_path("/no/such/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

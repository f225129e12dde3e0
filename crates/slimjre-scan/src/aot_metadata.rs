//! Ahead-of-time / native-image metadata: `META-INF/native-image/**` GraalVM
//! reachability-metadata JSON, plus `META-INF/maven/**/pom.properties`
//! coordinates carried along for provenance reporting.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;
use slimjre_archive::Archive;
use slimjre_diagnostics::{Warning, WarningSink};

use crate::reflection::ReflectionClassIndex;
use crate::ScannerOutput;

#[derive(Deserialize)]
struct ReflectConfigEntry {
    name: String,
}

#[derive(Deserialize)]
struct ResourceConfig {
    #[serde(default)]
    resources: ResourceIncludes,
}

#[derive(Deserialize, Default)]
struct ResourceIncludes {
    #[serde(default)]
    includes: Vec<ResourcePattern>,
}

#[derive(Deserialize)]
struct ResourcePattern {
    pattern: String,
}

/// A `groupId:artifactId:version` triple lifted from a `pom.properties` file,
/// kept purely for reporting; it never contributes to the resolved module
/// set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenCoordinate {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AotMetadataOutput {
    pub scanner_output: ScannerOutput,
    pub maven_coordinates: Vec<MavenCoordinate>,
}

pub struct AotMetadataScanner;

impl AotMetadataScanner {
    pub fn scan(archives: &[PathBuf], index: &ReflectionClassIndex, warnings: &WarningSink) -> AotMetadataOutput {
        let mut modules = BTreeSet::new();
        let mut maven_coordinates = Vec::new();

        for path in archives {
            let archive = Archive::open(path);
            let entries = match archive.entry_names() {
                Ok(entries) => entries,
                Err(err) => {
                    warnings.push(Warning::for_archive("corrupt-archive", path, err.to_string()));
                    continue;
                }
            };

            for entry in entries {
                if entry.starts_with("META-INF/native-image/")
                    && (entry.ends_with("reflect-config.json") || entry.ends_with("jni-config.json"))
                {
                    if let Some(bytes) = read_or_warn(&archive, &entry, path, warnings) {
                        ingest_name_list(&bytes, index, &mut modules, path, &entry, warnings);
                    }
                } else if entry.starts_with("META-INF/native-image/") && entry.ends_with("resource-config.json") {
                    if let Some(bytes) = read_or_warn(&archive, &entry, path, warnings) {
                        ingest_resource_config(&bytes, index, &mut modules, path, &entry, warnings);
                    }
                } else if entry.starts_with("META-INF/maven/") && entry.ends_with("pom.properties") {
                    if let Some(bytes) = read_or_warn(&archive, &entry, path, warnings) {
                        if let Some(coordinate) = parse_pom_properties(&bytes) {
                            maven_coordinates.push(coordinate);
                        }
                    }
                }
            }
        }

        AotMetadataOutput {
            scanner_output: ScannerOutput { modules },
            maven_coordinates,
        }
    }
}

fn read_or_warn(archive: &Archive, entry: &str, path: &std::path::Path, warnings: &WarningSink) -> Option<Vec<u8>> {
    match archive.read(entry) {
        Ok(bytes) => bytes,
        Err(err) => {
            warnings.push(Warning::for_archive(
                "corrupt-archive",
                path,
                format!("failed to read `{entry}`: {err}"),
            ));
            None
        }
    }
}

fn ingest_name_list(
    bytes: &[u8],
    index: &ReflectionClassIndex,
    modules: &mut BTreeSet<slimjre_modules::ModuleName>,
    path: &std::path::Path,
    entry: &str,
    warnings: &WarningSink,
) {
    match serde_json::from_slice::<Vec<ReflectConfigEntry>>(bytes) {
        Ok(entries) => {
            for config_entry in entries {
                if let Some(module) = index.lookup(&config_entry.name) {
                    modules.insert(module.clone());
                }
            }
        }
        Err(err) => {
            warnings.push(Warning::for_archive(
                "malformed-aot-metadata",
                path,
                format!("failed to parse `{entry}`: {err}"),
            ));
        }
    }
}

fn ingest_resource_config(
    bytes: &[u8],
    index: &ReflectionClassIndex,
    modules: &mut BTreeSet<slimjre_modules::ModuleName>,
    path: &std::path::Path,
    entry: &str,
    warnings: &WarningSink,
) {
    match serde_json::from_slice::<ResourceConfig>(bytes) {
        Ok(config) => {
            for include in config.resources.includes {
                let Some(class_path) = include.pattern.strip_suffix(".class") else {
                    continue;
                };
                let fqcn = class_path.trim_start_matches('/').replace('/', ".");
                if let Some(module) = index.lookup(&fqcn) {
                    modules.insert(module.clone());
                }
            }
        }
        Err(err) => {
            warnings.push(Warning::for_archive(
                "malformed-aot-metadata",
                path,
                format!("failed to parse `{entry}`: {err}"),
            ));
        }
    }
}

fn parse_pom_properties(bytes: &[u8]) -> Option<MavenCoordinate> {
    let text = String::from_utf8_lossy(bytes);
    let mut coordinate = MavenCoordinate::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "groupId" => coordinate.group_id = Some(value.trim().to_string()),
            "artifactId" => coordinate.artifact_id = Some(value.trim().to_string()),
            "version" => coordinate.version = Some(value.trim().to_string()),
            _ => {}
        }
    }
    if coordinate.group_id.is_none() && coordinate.artifact_id.is_none() && coordinate.version.is_none() {
        None
    } else {
        Some(coordinate)
    }
}

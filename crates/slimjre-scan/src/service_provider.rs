//! `META-INF/services/*` provider-configuration file scanning.

use std::path::PathBuf;

use slimjre_archive::Archive;
use slimjre_diagnostics::{Warning, WarningSink};
use slimjre_modules::ModuleName;

use crate::ScannerOutput;

const SERVICES_PREFIX: &str = "META-INF/services/";

/// Explicit `service-interface FQCN -> module` table for the common JDK
/// service types that aren't obviously named after their owning package.
const SERVICE_MODULE_TABLE: &[(&str, &str)] = &[
    ("java.sql.Driver", "java.sql"),
    ("javax.sql.DataSource", "java.sql"),
    ("javax.xml.parsers.DocumentBuilderFactory", "java.xml"),
    ("javax.xml.parsers.SAXParserFactory", "java.xml"),
    ("javax.xml.transform.TransformerFactory", "java.xml"),
    ("javax.xml.xpath.XPathFactory", "java.xml"),
    ("javax.xml.validation.SchemaFactory", "java.xml"),
    ("javax.xml.stream.XMLInputFactory", "java.xml"),
    ("javax.xml.stream.XMLOutputFactory", "java.xml"),
    ("javax.management.remote.JMXConnectorProvider", "java.management"),
    ("javax.management.remote.JMXConnectorServerProvider", "java.management"),
    ("javax.naming.spi.InitialContextFactory", "java.naming"),
    ("javax.script.ScriptEngineFactory", "java.scripting"),
    ("javax.print.PrintServiceLookup", "java.desktop"),
    ("javax.sound.sampled.spi.MixerProvider", "java.desktop"),
    ("java.nio.file.spi.FileSystemProvider", "java.base"),
    ("java.security.Provider", "java.base"),
];

/// Package-prefix fallback for service interfaces not in the explicit table.
const SERVICE_PACKAGE_FALLBACK: &[(&str, &str)] = &[
    ("javax.xml.", "java.xml"),
    ("javax.sql.", "java.sql"),
    ("javax.management.", "java.management"),
    ("javax.naming.", "java.naming"),
    ("javax.script.", "java.scripting"),
    ("javax.sound.", "java.desktop"),
    ("javax.print.", "java.desktop"),
    ("javax.imageio.", "java.desktop"),
];

fn module_for_service(fqcn: &str) -> Option<ModuleName> {
    if let Some((_, module)) = SERVICE_MODULE_TABLE.iter().find(|(svc, _)| *svc == fqcn) {
        return Some(ModuleName::new(*module));
    }
    SERVICE_PACKAGE_FALLBACK
        .iter()
        .find(|(prefix, _)| fqcn.starts_with(prefix))
        .map(|(_, module)| ModuleName::new(*module))
}

pub struct ServiceProviderScanner;

impl ServiceProviderScanner {
    /// Record a required module for every recognized `META-INF/services/*`
    /// provider-configuration file name. Unrecognized service interfaces are
    /// surfaced as advisory warnings rather than silently dropped.
    pub fn scan(archives: &[PathBuf], warnings: &WarningSink) -> ScannerOutput {
        let mut modules = std::collections::BTreeSet::new();

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
                let Some(rest) = entry.strip_prefix(SERVICES_PREFIX) else {
                    continue;
                };
                if rest.is_empty() || rest.contains('/') {
                    continue;
                }

                match module_for_service(rest) {
                    Some(module) => {
                        modules.insert(module);
                    }
                    None => {
                        warnings.push(Warning::for_archive(
                            "unknown-service-interface",
                            path,
                            format!("no known owning module for service interface `{rest}`"),
                        ));
                    }
                }
            }
        }

        ScannerOutput { modules }
    }
}

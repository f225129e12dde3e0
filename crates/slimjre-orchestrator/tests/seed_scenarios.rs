//! End-to-end coverage for the analysis entry point against on-disk jars,
//! exercising a handful of the representative deployments this tool is
//! meant to size a runtime image for.

use std::io::Write;

use slimjre_config::Config;
use slimjre_modules::{ModuleGraph, ModuleInfo, ModuleKind, ModuleName, Requires};
use slimjre_orchestrator::Orchestrator;
use slimjre_platform::FakePlatform;
use zip::write::FileOptions;
use zip::ZipWriter;

fn write_test_jar(entries: &[(&str, &[u8])]) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut zip = ZipWriter::new(file.reopen().unwrap());
    let options = FileOptions::default();
    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap();
    file
}

fn descriptor(name: &str, requires: &[&str]) -> ModuleInfo {
    ModuleInfo {
        kind: ModuleKind::Explicit,
        name: ModuleName::new(name),
        is_open: false,
        requires: requires
            .iter()
            .map(|r| Requires {
                module: ModuleName::new(*r),
                is_transitive: false,
                is_static: false,
            })
            .collect(),
        exports: Vec::new(),
        opens: Vec::new(),
        uses: Vec::new(),
        provides: Vec::new(),
    }
}

/// The platform graph shared by these tests: `java.base` plus a handful of
/// modules a real JDK declares as requiring it, wired up enough for the
/// resolver's transitive closure to have something to walk.
fn seed_platform() -> FakePlatform {
    let graph = ModuleGraph::from_descriptors([
        descriptor("java.base", &[]),
        descriptor("java.sql", &["java.base", "java.logging", "java.xml"]),
        descriptor("java.logging", &["java.base"]),
        descriptor("java.xml", &["java.base"]),
        descriptor("java.naming", &["java.base"]),
    ])
    .unwrap();
    FakePlatform::new(graph)
}

#[test]
fn base_only_archive_resolves_to_just_java_base() {
    let jar = write_test_jar(&[("com/example/Main.class", b"")]);
    let platform = seed_platform();
    let config = Config::new(vec![jar.path().to_path_buf()], "out");

    let result = Orchestrator::new(&platform).analyze(&config).unwrap();

    assert_eq!(
        result.all_modules,
        [ModuleName::new("java.base")].into_iter().collect()
    );
    assert!(result.service_provider.modules.is_empty());
}

#[test]
fn sql_service_provider_file_pulls_in_java_sql_and_its_requires() {
    let jar = write_test_jar(&[
        ("com/example/Main.class", b""),
        ("META-INF/services/java.sql.Driver", b"com.example.MyDriver\n"),
    ]);
    let platform = seed_platform();
    let config = Config::new(vec![jar.path().to_path_buf()], "out");

    let result = Orchestrator::new(&platform).analyze(&config).unwrap();

    assert!(result.service_provider.modules.contains(&ModuleName::new("java.sql")));
    // java.sql's declared requires must appear in the closure too.
    assert!(result.all_modules.contains(&ModuleName::new("java.sql")));
    assert!(result.all_modules.contains(&ModuleName::new("java.logging")));
    assert!(result.all_modules.contains(&ModuleName::new("java.xml")));
    assert!(result.all_modules.contains(&ModuleName::new("java.base")));
}

#[test]
fn unrecognized_service_interface_is_an_advisory_warning_not_a_failure() {
    let jar = write_test_jar(&[(
        "META-INF/services/com.example.spi.WidgetFactory",
        b"com.example.DefaultWidgetFactory\n",
    )]);
    let platform = seed_platform();
    let config = Config::new(vec![jar.path().to_path_buf()], "out");

    let result = Orchestrator::new(&platform).analyze(&config).unwrap();

    assert!(result
        .warnings
        .iter()
        .any(|w| w.code == "unknown-service-interface"));
}

#[test]
fn additional_and_exclude_modules_are_applied_around_the_scan_union() {
    let jar = write_test_jar(&[("com/example/Main.class", b"")]);
    let platform = seed_platform();
    let mut config = Config::new(vec![jar.path().to_path_buf()], "out");
    config.additional_modules.insert(ModuleName::new("java.naming"));

    let result = Orchestrator::new(&platform).analyze(&config).unwrap();
    assert!(result.all_modules.contains(&ModuleName::new("java.naming")));

    let mut config2 = Config::new(vec![jar.path().to_path_buf()], "out");
    config2.additional_modules.insert(ModuleName::new("java.naming"));
    config2.exclude_modules.insert(ModuleName::new("java.naming"));

    let result2 = Orchestrator::new(&platform).analyze(&config2).unwrap();
    assert!(!result2.all_modules.contains(&ModuleName::new("java.naming")));
}

#[test]
fn crypto_mode_always_forces_the_crypto_module_with_no_evidence_present() {
    let jar = write_test_jar(&[("com/example/Main.class", b"")]);
    let platform = seed_platform();
    let mut config = Config::new(vec![jar.path().to_path_buf()], "out");
    config.crypto_mode = slimjre_config::CryptoMode::Always;

    let result = Orchestrator::new(&platform).analyze(&config).unwrap();
    assert!(result.crypto.modules.contains(&ModuleName::new("jdk.crypto.ec")));
}

#[test]
fn multiple_archives_are_all_scanned_for_service_providers() {
    let jar_a = write_test_jar(&[("META-INF/services/java.sql.Driver", b"a.Driver\n")]);
    let jar_b = write_test_jar(&[("com/example/Other.class", b"")]);
    let platform = seed_platform();
    let config = Config::new(
        vec![jar_a.path().to_path_buf(), jar_b.path().to_path_buf()],
        "out",
    );

    let result = Orchestrator::new(&platform).analyze(&config).unwrap();
    assert!(result.all_modules.contains(&ModuleName::new("java.sql")));
    assert!(result.per_archive.contains_key(jar_a.path()));
}

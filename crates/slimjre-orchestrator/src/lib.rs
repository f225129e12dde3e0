//! The single entry point that composes discovery, every analyzer, and the
//! resolver into one `analyze(config) -> AnalysisResult` call (§4.15).
//!
//! Grounded on `nova-scheduler`'s direct `rayon` dependency and this
//! workspace's convention (asserted by `nova-ai`'s regression tests) that
//! library code never configures the *global* rayon pool: `Orchestrator`
//! builds its own `rayon::ThreadPoolBuilder` pool and fans out across it via
//! `rayon::scope`, rather than touching `rayon::current_thread_pool()`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Mutex;

use slimjre_config::{Config, CryptoMode};
use slimjre_diagnostics::{Warning, WarningSink};
use slimjre_modules::ModuleName;
use slimjre_platform::Platform;
use slimjre_resolve::ModuleResolver;
use slimjre_scan::{
    AotMetadataOutput, AotMetadataScanner, ApiUsageScanner, CryptoDetection, CryptoScanner, JmxScanner,
    LocaleConfidence, LocaleDetection, LocaleScanner, PatternDetection, ReflectionClassIndex, ReflectionScanner,
    ScannerOutput, ServiceProviderScanner, ZipFsScanner,
};
use slimjre_staticdep::{StaticDepAnalyzer, StaticDepOutput};

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis requires at least one archive")]
    NoInputs,
    #[error("failed to resolve the transitive module closure")]
    Resolve(#[source] slimjre_resolve::ResolveError),
    #[error("static dependency analysis failed")]
    StaticDep(#[source] slimjre_staticdep::StaticDepError),
    #[error("platform query failed")]
    Platform(#[source] slimjre_platform::PlatformError),
    #[error("failed to build the analyzer worker pool")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
}

/// The complete output of one analysis run: each analyzer's contribution
/// kept separately, plus the resolved union and a per-archive breakdown.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub service_provider: ScannerOutput,
    pub api_usage: ScannerOutput,
    pub reflection: ScannerOutput,
    pub aot_metadata: ScannerOutput,
    pub crypto: CryptoDetection,
    pub locale: LocaleDetection,
    pub zipfs: PatternDetection,
    pub jmx: PatternDetection,
    pub static_dep_per_archive: BTreeMap<PathBuf, StaticDepOutput>,
    pub maven_coordinates: Vec<slimjre_scan::MavenCoordinate>,

    /// The final, resolver-closed module set.
    pub all_modules: BTreeSet<ModuleName>,
    /// Best-effort per-archive breakdown, built from `StaticDepAnalyzer`'s
    /// natural per-archive output augmented with the other detection
    /// scanners' archive-provenance fields where they track one.
    pub per_archive: BTreeMap<PathBuf, BTreeSet<ModuleName>>,

    pub warnings: Vec<Warning>,
}

pub struct Orchestrator<'a> {
    platform: &'a dyn Platform,
}

impl<'a> Orchestrator<'a> {
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    pub fn analyze(&self, config: &Config) -> Result<AnalysisResult> {
        if config.archives.is_empty() {
            return Err(AnalysisError::NoInputs);
        }

        tracing::info!(
            target: "slimjre.orchestrator",
            archive_count = config.archives.len(),
            "starting module requirement analysis"
        );

        let warnings = WarningSink::new();
        let archives = &config.archives;

        let reflection_index = ReflectionClassIndex::build(self.platform).map_err(AnalysisError::Platform)?;

        let service_provider = Mutex::new(ScannerOutput::default());
        let api_usage = Mutex::new(ScannerOutput::default());
        let reflection = Mutex::new(ScannerOutput::default());
        let aot_metadata = Mutex::new(AotMetadataOutput::default());
        let crypto = Mutex::new(CryptoDetection::default());
        let locale: Mutex<Result<LocaleDetection>> = Mutex::new(Ok(LocaleDetection::default()));
        let zipfs = Mutex::new(PatternDetection::default());
        let jmx = Mutex::new(PatternDetection::default());
        let static_dep: Mutex<BTreeMap<PathBuf, StaticDepOutput>> = Mutex::new(BTreeMap::new());
        let static_dep_error: Mutex<Option<slimjre_staticdep::StaticDepError>> = Mutex::new(None);

        let pool = rayon::ThreadPoolBuilder::new()
            .build()
            .map_err(AnalysisError::ThreadPool)?;

        pool.scope(|scope| {
            if config.scan_service_providers {
                scope.spawn(|_| {
                    *service_provider.lock().unwrap_or_else(|e| e.into_inner()) =
                        ServiceProviderScanner::scan(archives, &warnings);
                });
            }

            scope.spawn(|_| {
                *api_usage.lock().unwrap_or_else(|e| e.into_inner()) = ApiUsageScanner::scan(archives, &warnings);
            });

            scope.spawn(|_| {
                *reflection.lock().unwrap_or_else(|e| e.into_inner()) =
                    ReflectionScanner::scan(archives, &reflection_index, &warnings);
            });

            if config.scan_aot_metadata {
                scope.spawn(|_| {
                    *aot_metadata.lock().unwrap_or_else(|e| e.into_inner()) =
                        AotMetadataScanner::scan(archives, &reflection_index, &warnings);
                });
            }

            scope.spawn(|_| {
                *crypto.lock().unwrap_or_else(|e| e.into_inner()) = CryptoScanner::scan(archives, &warnings);
            });

            scope.spawn(|_| {
                let result = LocaleScanner::scan(archives, self.platform, &warnings).map_err(AnalysisError::Platform);
                *locale.lock().unwrap_or_else(|e| e.into_inner()) = result;
            });

            scope.spawn(|_| {
                *zipfs.lock().unwrap_or_else(|e| e.into_inner()) = ZipFsScanner::scan(archives, &warnings);
            });

            scope.spawn(|_| {
                *jmx.lock().unwrap_or_else(|e| e.into_inner()) = JmxScanner::scan(archives, &warnings);
            });

            let analyzer = StaticDepAnalyzer::new(self.platform);
            for archive_path in archives {
                scope.spawn(|_| {
                    if static_dep_error.lock().unwrap_or_else(|e| e.into_inner()).is_some() {
                        return;
                    }
                    match analyzer.analyze_per_archive(archive_path, archives) {
                        Ok(output) => {
                            static_dep
                                .lock()
                                .unwrap_or_else(|e| e.into_inner())
                                .insert(archive_path.clone(), output);
                        }
                        Err(err) => {
                            let mut slot = static_dep_error.lock().unwrap_or_else(|e| e.into_inner());
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                        }
                    }
                });
            }
        });

        if let Some(err) = static_dep_error.into_inner().unwrap_or_else(|e| e.into_inner()) {
            return Err(AnalysisError::StaticDep(err));
        }

        let service_provider = service_provider.into_inner().unwrap_or_else(|e| e.into_inner());
        let api_usage = api_usage.into_inner().unwrap_or_else(|e| e.into_inner());
        let reflection = reflection.into_inner().unwrap_or_else(|e| e.into_inner());
        let aot_metadata = aot_metadata.into_inner().unwrap_or_else(|e| e.into_inner());
        let mut crypto = crypto.into_inner().unwrap_or_else(|e| e.into_inner());
        let locale = locale.into_inner().unwrap_or_else(|e| e.into_inner())?;
        let zipfs = zipfs.into_inner().unwrap_or_else(|e| e.into_inner());
        let jmx = jmx.into_inner().unwrap_or_else(|e| e.into_inner());
        let static_dep_per_archive = static_dep.into_inner().unwrap_or_else(|e| e.into_inner());

        apply_crypto_mode(&mut crypto, config.crypto_mode, &warnings);

        let mut union: BTreeSet<ModuleName> = BTreeSet::new();
        union.extend(service_provider.modules.iter().cloned());
        union.extend(api_usage.modules.iter().cloned());
        union.extend(reflection.modules.iter().cloned());
        union.extend(aot_metadata.scanner_output.modules.iter().cloned());
        union.extend(crypto.modules.iter().cloned());
        union.extend(locale.modules.iter().cloned());
        union.extend(zipfs.modules.iter().cloned());
        union.extend(jmx.modules.iter().cloned());
        for output in static_dep_per_archive.values() {
            union.extend(output.modules.iter().cloned());
        }

        union.extend(config.additional_modules.iter().cloned());
        for excluded in &config.exclude_modules {
            union.remove(excluded);
        }

        let resolver = ModuleResolver::new(self.platform.available_modules());
        let resolved = resolver.resolve(union).map_err(AnalysisError::Resolve)?;
        let all_modules: BTreeSet<ModuleName> = resolved.into_iter().collect();

        tracing::info!(
            target: "slimjre.orchestrator",
            module_count = all_modules.len(),
            "module requirement analysis complete"
        );

        let mut per_archive: BTreeMap<PathBuf, BTreeSet<ModuleName>> = BTreeMap::new();
        for (path, output) in &static_dep_per_archive {
            per_archive.entry(path.clone()).or_default().extend(output.modules.iter().cloned());
        }
        for path in &crypto.archives_implicated {
            per_archive.entry(path.clone()).or_default().extend(crypto.modules.iter().cloned());
        }
        for path in &locale.archives_implicated {
            per_archive.entry(path.clone()).or_default().extend(locale.modules.iter().cloned());
        }
        for path in &zipfs.archives {
            per_archive.entry(path.clone()).or_default().extend(zipfs.modules.iter().cloned());
        }
        for path in &jmx.archives {
            per_archive.entry(path.clone()).or_default().extend(jmx.modules.iter().cloned());
        }

        Ok(AnalysisResult {
            service_provider,
            api_usage,
            reflection,
            aot_metadata: ScannerOutput { modules: aot_metadata.scanner_output.modules.clone() },
            crypto,
            locale,
            zipfs,
            jmx,
            static_dep_per_archive,
            maven_coordinates: aot_metadata.maven_coordinates,
            all_modules,
            per_archive,
            warnings: warnings.into_vec(),
        })
    }
}

/// §4.10's `crypto_mode` override, applied after every scanner has run but
/// before the final union.
fn apply_crypto_mode(crypto: &mut CryptoDetection, mode: CryptoMode, warnings: &WarningSink) {
    match mode {
        CryptoMode::Auto => {}
        CryptoMode::Always => {
            crypto.modules.insert(ModuleName::new("jdk.crypto.ec"));
        }
        CryptoMode::Never => {
            if !crypto.modules.is_empty() {
                warnings.push(Warning::new(
                    "crypto-mode-suppressed",
                    "crypto_mode=never suppressed a non-empty crypto scanner result",
                ));
            }
            crypto.modules.clear();
        }
    }
}

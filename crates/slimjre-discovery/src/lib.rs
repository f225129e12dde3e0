//! Produces the set of archives to analyze from a directory or archive
//! input (§4.3).
//!
//! Grounded on `nova-build::fs_cleanup`'s best-effort-delete-with-debug-log
//! idiom (kept for `DiscoveryResult`'s temp directory teardown) and
//! `nova-classpath`'s walkdir-based directory walk (sorted, canonicalized
//! paths). Manifest `Class-Path` chasing reuses `slimjre-archive`'s
//! manifest reader.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use slimjre_archive::Archive;
use slimjre_diagnostics::Warning;
use tempfile::TempDir;
use walkdir::WalkDir;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("discovery input path does not exist: {0}")]
    InputNotFound(PathBuf),
    #[error("failed to create temporary extraction directory")]
    TempDir(#[source] std::io::Error),
}

/// Owned set of archive paths plus an optional temp directory of extracted
/// nested archives, and advisory warnings collected along the way (§3).
pub struct DiscoveryResult {
    archives: Vec<PathBuf>,
    temp_dir: Option<TempDir>,
    warnings: Vec<Warning>,
}

impl DiscoveryResult {
    fn new(archives: Vec<PathBuf>, temp_dir: Option<TempDir>, warnings: Vec<Warning>) -> Self {
        Self { archives, temp_dir, warnings }
    }

    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(TempDir::path)
    }

    /// Recursively delete the owned temp directory, if any. Idempotent:
    /// the second and later calls are no-ops because the `TempDir` is
    /// taken on first dispose.
    pub fn dispose(&mut self) {
        if let Some(dir) = self.temp_dir.take() {
            if let Err(err) = dir.close() {
                tracing::debug!(
                    target: "slimjre.discovery",
                    error = %err,
                    "failed to remove discovery temp directory (best effort)"
                );
            }
        }
    }
}

impl Drop for DiscoveryResult {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Recognized nested-library locations inside an archive (§4.3 archive mode).
fn is_recognized_library_entry(name: &str) -> bool {
    if !name.to_ascii_lowercase().ends_with(".jar") {
        return false;
    }
    if name.starts_with("BOOT-INF/lib/") || name.starts_with("WEB-INF/lib/") || name.starts_with("lib/") {
        return true;
    }
    // `*/lib/*.jar`: any path with a `lib/` path component immediately
    // preceding the final `.jar` file name.
    let mut segments: Vec<&str> = name.split('/').collect();
    if segments.len() < 2 {
        return false;
    }
    segments.pop();
    matches!(segments.last(), Some(&"lib"))
}

pub struct Discovery;

impl Discovery {
    /// Discover archives from `input`: a directory (recursive `.jar` scan)
    /// or a single ZIP-format archive (nested-library extraction).
    pub fn discover(input: impl AsRef<Path>) -> Result<DiscoveryResult> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(DiscoveryError::InputNotFound(input.to_path_buf()));
        }

        if input.is_dir() {
            Ok(Self::discover_directory(input))
        } else {
            Self::discover_archive(input)
        }
    }

    fn discover_directory(dir: &Path) -> DiscoveryResult {
        let warnings = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut visited_dirs: HashSet<PathBuf> = HashSet::new();
        let mut archives = Vec::new();

        let filter_warnings = warnings.clone();
        let walker = WalkDir::new(dir).follow_links(true).into_iter().filter_entry(move |entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            match entry.path().canonicalize() {
                Ok(canonical) => {
                    let newly_visited = visited_dirs.insert(canonical);
                    if !newly_visited {
                        filter_warnings.borrow_mut().push(Warning::for_archive(
                            "symlink-loop",
                            entry.path(),
                            "directory already visited, skipping to avoid an infinite walk",
                        ));
                    }
                    newly_visited
                }
                Err(_) => true,
            }
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let message = if err.loop_ancestor().is_some() {
                        format!("symlink loop detected: {err}")
                    } else {
                        format!("failed to walk directory entry: {err}")
                    };
                    warnings.borrow_mut().push(Warning::new("directory-walk-error", message));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let is_jar = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"));
            if is_jar {
                archives.push(entry.into_path());
            }
        }

        archives.sort();
        let warnings = std::rc::Rc::try_unwrap(warnings)
            .map(std::cell::RefCell::into_inner)
            .unwrap_or_default();
        DiscoveryResult::new(archives, None, warnings)
    }

    fn discover_archive(path: &Path) -> Result<DiscoveryResult> {
        let mut warnings = Vec::new();
        let mut archives = vec![path.to_path_buf()];

        let archive = Archive::open(path);
        let entry_names = match archive.entry_names() {
            Ok(names) => names,
            Err(err) => {
                warnings.push(Warning::for_archive("corrupt-archive", path, err.to_string()));
                Vec::new()
            }
        };

        let nested: Vec<String> = entry_names.into_iter().filter(|name| is_recognized_library_entry(name)).collect();

        let mut temp_dir = None;
        if !nested.is_empty() {
            let dir = tempfile::Builder::new()
                .prefix("slimjre-discovery-")
                .tempdir()
                .map_err(DiscoveryError::TempDir)?;
            let dir_path = dir.path().to_path_buf();

            let extraction_warnings: std::sync::Mutex<Vec<Warning>> = std::sync::Mutex::new(Vec::new());
            let extracted: Vec<Option<PathBuf>> = nested
                .par_iter()
                .map(|name| match extract_nested_entry(&archive, name, &dir_path) {
                    Ok(dest) => Some(dest),
                    Err(err) => {
                        extraction_warnings
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .push(Warning::for_archive("corrupt-archive", path, format!("failed to extract `{name}`: {err}")));
                        None
                    }
                })
                .collect();

            warnings.extend(extraction_warnings.into_inner().unwrap_or_else(|e| e.into_inner()));
            archives.extend(extracted.into_iter().flatten());
            temp_dir = Some(dir);
        }

        if let Ok(Some(classpath)) = archive.manifest_classpath() {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            for token in classpath.split_whitespace() {
                let resolved = parent.join(token);
                if resolved.is_file() {
                    archives.push(resolved);
                } else {
                    warnings.push(Warning::for_archive(
                        "missing-classpath-entry",
                        path,
                        format!("Class-Path entry `{token}` does not exist at `{}`", resolved.display()),
                    ));
                }
            }
        }

        Ok(DiscoveryResult::new(archives, temp_dir, warnings))
    }
}

/// Extract one nested archive entry into `dest_dir`, using the entry's
/// basename plus a short random suffix to avoid collisions between
/// identically-named entries under different nested-lib directories.
fn extract_nested_entry(archive: &Archive, name: &str, dest_dir: &Path) -> std::io::Result<PathBuf> {
    let Some(bytes) = archive
        .read(name)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?
    else {
        return Err(std::io::Error::new(std::io::ErrorKind::NotFound, name.to_string()));
    };

    let file_name = Path::new(name).file_name().and_then(|n| n.to_str()).unwrap_or("nested.jar");
    let mut dest_file = tempfile::Builder::new()
        .prefix(&format!("{file_name}."))
        .suffix(".jar")
        .rand_bytes(6)
        .tempfile_in(dest_dir)?;
    std::io::Write::write_all(&mut dest_file, &bytes)?;
    let (_, dest_path) = dest_file.keep().map_err(|err| err.error)?;
    Ok(dest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
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

    #[test]
    fn discover_input_not_found() {
        let err = Discovery::discover(Path::new("/no/such/path/at/all")).unwrap_err();
        assert!(matches!(err, DiscoveryError::InputNotFound(_)));
    }

    #[test]
    fn discover_directory_collects_jars_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("z.jar"), b"").unwrap();
        std::fs::write(dir.path().join("a.jar"), b"").unwrap();
        std::fs::write(dir.path().join("ignore.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/m.JAR"), b"").unwrap();

        let result = Discovery::discover(dir.path()).unwrap();
        let names: Vec<String> = result
            .archives()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jar".to_string(), "m.JAR".to_string(), "z.jar".to_string()]);
    }

    #[test]
    fn discover_archive_extracts_nested_libs() {
        let inner = write_test_jar(&[("com/example/Foo.class", b"")]);
        let inner_bytes = std::fs::read(inner.path()).unwrap();

        let outer = write_test_jar(&[
            ("BOOT-INF/lib/inner.jar", &inner_bytes),
            ("BOOT-INF/classes/Main.class", b""),
        ]);

        let mut result = Discovery::discover(outer.path()).unwrap();
        assert_eq!(result.archives().len(), 2);
        assert!(result.archives().iter().any(|p| p == outer.path()));
        assert!(result.temp_dir().is_some());
        result.dispose();
        assert!(result.temp_dir().is_none());
        // second dispose is a no-op
        result.dispose();
    }

    #[test]
    fn recognized_library_entry_matches_any_lib_directory() {
        assert!(is_recognized_library_entry("BOOT-INF/lib/a.jar"));
        assert!(is_recognized_library_entry("WEB-INF/lib/a.jar"));
        assert!(is_recognized_library_entry("lib/a.jar"));
        assert!(is_recognized_library_entry("foo/bar/lib/a.jar"));
        assert!(!is_recognized_library_entry("foo/lib/nested/a.jar"));
        assert!(!is_recognized_library_entry("BOOT-INF/classes/a.jar"));
    }

    #[test]
    fn manifest_classpath_missing_entry_is_a_warning_not_fatal() {
        let manifest = b"Manifest-Version: 1.0\r\nClass-Path: does-not-exist.jar\r\n\r\n".to_vec();
        let outer = write_test_jar(&[("META-INF/MANIFEST.MF", &manifest)]);

        let result = Discovery::discover(outer.path()).unwrap();
        assert_eq!(result.archives().len(), 1);
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].code, "missing-classpath-entry");
    }
}

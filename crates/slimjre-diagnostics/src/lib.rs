//! Advisory warnings shared across the analysis pipeline.
//!
//! Analyzers that touch the filesystem or parse foreign data are maximally
//! permissive about per-entry errors: they record a [`Warning`] and keep
//! going rather than aborting the whole run. The resolver and orchestrator
//! remain strict elsewhere; this crate only models the permissive half.

use std::fmt;
use std::path::{Path, PathBuf};

/// A recoverable condition encountered while analyzing one archive or
/// entry. Warnings never mutate the resolved module set; they exist purely
/// for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Stable, short machine-readable identifier (e.g. `"corrupt-archive"`).
    pub code: &'static str,
    pub message: String,
    /// The archive this warning pertains to, if any.
    pub archive: Option<PathBuf>,
}

impl Warning {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        let warning = Self {
            code,
            message: message.into(),
            archive: None,
        };
        warning.emit();
        warning
    }

    pub fn for_archive(code: &'static str, archive: impl AsRef<Path>, message: impl Into<String>) -> Self {
        let warning = Self {
            code,
            message: message.into(),
            archive: Some(archive.as_ref().to_path_buf()),
        };
        warning.emit();
        warning
    }

    fn emit(&self) {
        match &self.archive {
            Some(path) => {
                tracing::debug!(target = "slimjre", code = self.code, archive = %path.display(), message = %self.message, "advisory warning");
            }
            None => {
                tracing::debug!(target = "slimjre", code = self.code, message = %self.message, "advisory warning");
            }
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.archive {
            Some(path) => write!(f, "[{}] {}: {}", self.code, path.display(), self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// A simple sink that collects warnings in insertion order. Analyzers take
/// `&WarningSink` (shared across parallel workers behind a `Mutex` at the
/// orchestrator layer) rather than returning `Vec<Warning>` individually, so
/// partial work before a recoverable error is never discarded.
#[derive(Debug, Default)]
pub struct WarningSink {
    warnings: std::sync::Mutex<Vec<Warning>>,
}

impl WarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, warning: Warning) {
        self.warnings.lock().unwrap_or_else(|e| e.into_inner()).push(warning);
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Vec<Warning> {
        self.warnings.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

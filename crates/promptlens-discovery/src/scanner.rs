//! Timeout-bounded directory scanning
//!
//! [`scan_directory`] never fails: every filesystem condition becomes a
//! [`ScanResult`] with a structured error code, and callers treat anything
//! unsuccessful as zero results.

use crate::fs::FileSystem;
use promptlens_types::{ScanErrorCode, ScanResult};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-scan deadline
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_millis(2000);

/// Options for a single directory scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// File name suffixes to keep (e.g. `.md`); empty keeps every entry
    pub extensions: Vec<String>,
    /// Deadline for the listing
    pub timeout: Duration,
}

impl ScanOptions {
    /// Keep only names ending in one of `extensions` (case-insensitive)
    #[must_use]
    pub fn with_extensions<I, S>(extensions: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self {
            extensions,
            timeout,
        }
    }

    /// Keep every entry
    #[must_use]
    pub fn all_entries(timeout: Duration) -> Self {
        Self {
            extensions: Vec::new(),
            timeout,
        }
    }

    fn accepts(&self, name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let lower = name.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::with_extensions([".md"], DEFAULT_SCAN_TIMEOUT)
    }
}

/// List `path`, racing the listing against `options.timeout`.
///
/// Returned paths are `path` joined with each accepted entry name, in listing order.
/// When the deadline wins, the listing future is dropped and its result discarded.
pub async fn scan_directory(fs: &dyn FileSystem, path: &Path, options: &ScanOptions) -> ScanResult {
    match tokio::time::timeout(options.timeout, fs.list_dir(path)).await {
        Err(_) => {
            warn!(
                "Scan of {} timed out after {:?}",
                path.display(),
                options.timeout
            );
            ScanResult::timed_out()
        }
        Ok(Err(e)) => {
            let code = ScanErrorCode::from_io(&e);
            match code {
                ScanErrorCode::NotFound => {
                    debug!("Directory does not exist: {}", path.display());
                }
                _ => warn!("Failed to scan {} ({}): {}", path.display(), code, e),
            }
            ScanResult::failed(code)
        }
        Ok(Ok(names)) => {
            let files: Vec<_> = names
                .into_iter()
                .filter(|name| options.accepts(name))
                .map(|name| path.join(name))
                .collect();
            debug!("Scanned {}: {} matching entries", path.display(), files.len());
            ScanResult::ok(files)
        }
    }
}

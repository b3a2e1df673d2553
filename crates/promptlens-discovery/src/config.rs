//! Configuration types for resource discovery

use crate::discovery::{ResourceLocations, DEFAULT_MAX_MATCHES};
use crate::error::{DiscoveryError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resource discovery configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Master switch; when off discovery reports itself as skipped
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Deadline for a single directory listing, in milliseconds
    #[serde(default = "default_scan_timeout_ms")]
    pub scan_timeout_ms: u64,

    /// Matches kept per resource type
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,

    /// Reuse parsed directory results while the directory mtime is unchanged
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// Project root for local resources (defaults to the working directory)
    #[serde(default)]
    pub project_root: Option<PathBuf>,

    /// Root for global resources (defaults to the home directory); `~` is expanded
    #[serde(default)]
    pub global_root: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_scan_timeout_ms() -> u64 {
    2000
}

fn default_max_matches() -> usize {
    DEFAULT_MAX_MATCHES
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            scan_timeout_ms: default_scan_timeout_ms(),
            max_matches: default_max_matches(),
            cache_enabled: default_cache_enabled(),
            project_root: None,
            global_root: None,
        }
    }
}

impl DiscoveryConfig {
    /// Per-scan deadline
    #[must_use]
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    /// Reject values discovery cannot work with
    ///
    /// # Errors
    /// Returns [`DiscoveryError::Config`] for a zero timeout or zero match limit
    pub fn validate(&self) -> Result<()> {
        if self.scan_timeout_ms == 0 {
            return Err(DiscoveryError::Config(
                "discovery.scan_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.max_matches == 0 {
            return Err(DiscoveryError::Config(
                "discovery.max_matches must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Resolve scope roots.
    ///
    /// `project_root` falls back to `cwd`; a missing `global_root` stays unresolved
    /// until discovery runs, where the home directory is looked up.
    #[must_use]
    pub fn locations(&self, cwd: &Path) -> ResourceLocations {
        let project_root = self
            .project_root
            .as_deref()
            .map_or_else(|| cwd.to_path_buf(), expand_tilde);
        let locations = ResourceLocations::new(project_root);
        match self.global_root.as_deref() {
            Some(root) => locations.with_global_root(expand_tilde(root)),
            None => locations,
        }
    }
}

/// Expand a leading `~` to the home directory
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DiscoveryConfig::default();
        assert!(config.enabled);
        assert!(config.cache_enabled);
        assert_eq!(config.max_matches, 5);
        assert_eq!(config.scan_timeout(), Duration::from_millis(2000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_override() {
        let toml_str = r#"
            scan_timeout_ms = 500
            global_root = "/srv/shared"
        "#;

        let config: DiscoveryConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
        assert_eq!(config.scan_timeout(), Duration::from_millis(500));
        assert_eq!(config.max_matches, 5);
        assert!(config.enabled);

        let locations = config.locations(Path::new("/work/project"));
        assert_eq!(locations.project_root, PathBuf::from("/work/project"));
        assert_eq!(
            locations.resolve_global_root().unwrap(),
            PathBuf::from("/srv/shared")
        );
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = DiscoveryConfig {
            scan_timeout_ms: 0,
            ..DiscoveryConfig::default()
        };
        assert!(matches!(config.validate(), Err(DiscoveryError::Config(_))));

        let config = DiscoveryConfig {
            max_matches: 0,
            ..DiscoveryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(Path::new("~/test/path"));
        if dirs::home_dir().is_some() {
            assert!(!expanded.to_string_lossy().starts_with('~'));
        }

        let no_tilde = expand_tilde(Path::new("/absolute/path"));
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));
    }
}

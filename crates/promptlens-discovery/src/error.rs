//! Error types for discovery operations

use thiserror::Error;

/// Discovery errors
///
/// Expected filesystem conditions (missing directories, timeouts) never surface
/// here; they become empty results. These are orchestrator-level failures.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Global scope root could not be resolved
    #[error("Home directory not found; cannot resolve global resource directories")]
    NoHomeDir,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, DiscoveryError>;

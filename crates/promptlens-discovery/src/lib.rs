//! `PromptLens` Resource Discovery
//!
//! Finds declaratively-described resources (agents, slash commands, skills and
//! output styles) in a project-local and a user-global scope, and ranks them
//! against a prompt.
//!
//! ## Features
//!
//! - Two scopes per resource type; the local definition wins on a name collision
//! - YAML header parsing with filename / directory-name fallback
//! - Timeout-bounded directory listing that never fails the caller
//! - Mtime-validated LRU cache owned by the caller
//! - Keyword relevance scoring with stable tie ordering
//!
//! ## Architecture
//!
//! Scan (per scope, concurrently) → Parse (per file) → Dedupe (local first) →
//! Match (per type, top N) → Format (listing or flag hints)

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod format;
pub mod fs;
pub mod kinds;
pub mod matcher;
pub mod parser;
pub mod scanner;

pub use cache::DiscoveryCache;
pub use config::DiscoveryConfig;
pub use discovery::{
    DiscoveryContext, DiscoveryResult, ItemCache, ResourceDiscovery, ResourceLocations,
    ResourceMatches,
};
pub use error::DiscoveryError;
pub use format::format_context;
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        format_context, DiscoveryCache, DiscoveryConfig, DiscoveryContext, DiscoveryResult,
        FileSystem, ItemCache, MemoryFileSystem, OsFileSystem, ResourceDiscovery,
        ResourceLocations,
    };
}

//! Resource discovery orchestration
//!
//! For every row of [`RESOURCE_KINDS`] the local and global scope directories are
//! scanned concurrently, each file is parsed, and items are deduplicated by
//! normalized name with the local scope inserted first. The four resource types
//! run as independent tasks; a failed task contributes zero items.

use crate::cache::DiscoveryCache;
use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::fs::{normalize_path, FileSystem};
use crate::kinds::{ResourceKind, DISABLED_SUFFIX, RESOURCE_KINDS, SKILL_MANIFEST};
use crate::matcher::match_items_by_keywords;
use crate::parser::parse_resource;
use crate::scanner::{scan_directory, ScanOptions, DEFAULT_SCAN_TIMEOUT};
use futures::future::join_all;
use promptlens_types::{DiscoveredItem, MatchedItem, ResourceType, Source};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Matches kept per resource type
pub const DEFAULT_MAX_MATCHES: usize = 5;

/// Phrases that ask the assistant to deliberate; matched case-insensitively
pub const THINK_TRIGGERS: &[&str] = &[
    "ultrathink",
    "megathink",
    "think harder",
    "think hard",
    "think deeply",
    "think carefully",
    "think step by step",
    "think it through",
];

/// Cache of parsed items, keyed by scope directory
pub type ItemCache = DiscoveryCache<Vec<DiscoveredItem>>;

/// Roots of the two discovery scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocations {
    /// Root that local resource directories are relative to
    pub project_root: PathBuf,
    /// Root that global resource directories are relative to; `None` means home
    pub global_root: Option<PathBuf>,
}

impl ResourceLocations {
    /// Local scope under `project_root`, global scope under the home directory
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            global_root: None,
        }
    }

    /// Use an explicit global root instead of the home directory
    #[must_use]
    pub fn with_global_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.global_root = Some(root.into());
        self
    }

    /// Global root, looking up the home directory when none was set
    ///
    /// # Errors
    /// Returns [`DiscoveryError::NoHomeDir`] when no home directory can be found
    pub fn resolve_global_root(&self) -> Result<PathBuf> {
        self.global_root
            .clone()
            .or_else(dirs::home_dir)
            .ok_or(DiscoveryError::NoHomeDir)
    }
}

/// Every discovered item, grouped by resource type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredResources {
    by_type: HashMap<ResourceType, Vec<DiscoveredItem>>,
}

impl DiscoveredResources {
    /// Items of one type, local-scope items first
    #[must_use]
    pub fn get(&self, resource_type: ResourceType) -> &[DiscoveredItem] {
        self.by_type
            .get(&resource_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of items across all types
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }
}

/// Ranked matches for one resource type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceMatches {
    /// Top matches, best first
    pub matched: Vec<MatchedItem>,
    /// Matches before truncation
    pub match_count: usize,
    /// Items discovered for this type, matched or not
    pub total: usize,
}

impl ResourceMatches {
    /// Matches dropped by truncation
    #[must_use]
    pub fn hidden(&self) -> usize {
        self.match_count.saturating_sub(self.matched.len())
    }
}

/// Discovery output handed to the formatter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryContext {
    /// Agent personas
    pub agents: ResourceMatches,
    /// Slash commands
    pub commands: ResourceMatches,
    /// Skill bundles
    pub skills: ResourceMatches,
    /// Output styles
    pub output_styles: ResourceMatches,
    /// Prompt contains a deliberation trigger phrase
    pub thinking_requested: bool,
}

impl DiscoveryContext {
    /// Matches for one resource type
    #[must_use]
    pub fn for_type(&self, resource_type: ResourceType) -> &ResourceMatches {
        match resource_type {
            ResourceType::Agent => &self.agents,
            ResourceType::Command => &self.commands,
            ResourceType::Skill => &self.skills,
            ResourceType::OutputStyle => &self.output_styles,
        }
    }

    fn for_type_mut(&mut self, resource_type: ResourceType) -> &mut ResourceMatches {
        match resource_type {
            ResourceType::Agent => &mut self.agents,
            ResourceType::Command => &mut self.commands,
            ResourceType::Skill => &mut self.skills,
            ResourceType::OutputStyle => &mut self.output_styles,
        }
    }

    /// At least one resource type has a match
    #[must_use]
    pub fn has_matches(&self) -> bool {
        ResourceType::ALL
            .iter()
            .any(|rt| !self.for_type(*rt).matched.is_empty())
    }

    /// Items discovered across all types
    #[must_use]
    pub fn total_discovered(&self) -> usize {
        ResourceType::ALL
            .iter()
            .map(|rt| self.for_type(*rt).total)
            .sum()
    }
}

/// Tagged outcome of a discovery call; never an `Err`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiscoveryResult {
    /// Discovery ran
    Success {
        /// Ranked matches
        context: DiscoveryContext,
    },
    /// Discovery was not attempted
    Skipped {
        /// Why it was skipped
        reason: String,
    },
    /// Discovery hit an orchestrator-level error
    Failed {
        /// Error message
        error: String,
    },
}

impl DiscoveryResult {
    /// Whether discovery ran successfully
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, DiscoveryResult::Success { .. })
    }

    /// Context of a successful run
    #[must_use]
    pub fn context(&self) -> Option<&DiscoveryContext> {
        match self {
            DiscoveryResult::Success { context } => Some(context),
            _ => None,
        }
    }
}

/// Whether the prompt asks for deliberation
#[must_use]
pub fn is_thinking_prompt(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    THINK_TRIGGERS.iter().any(|trigger| lower.contains(trigger))
}

/// Resource discovery engine
///
/// Cheap to clone; every branch of a discovery run works on its own clone.
#[derive(Clone)]
pub struct ResourceDiscovery {
    fs: Arc<dyn FileSystem>,
    locations: ResourceLocations,
    cache: Option<Arc<ItemCache>>,
    scan_timeout: Duration,
    max_matches: usize,
}

impl ResourceDiscovery {
    /// Create an engine without a cache
    pub fn new(fs: Arc<dyn FileSystem>, locations: ResourceLocations) -> Self {
        Self {
            fs,
            locations,
            cache: None,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }

    /// Create an engine from configuration, resolving the project root against `cwd`
    ///
    /// # Errors
    /// Returns [`DiscoveryError::Config`] when the configuration is invalid
    pub fn from_config(
        fs: Arc<dyn FileSystem>,
        config: &DiscoveryConfig,
        cwd: &Path,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(fs, config.locations(cwd))
            .with_scan_timeout(config.scan_timeout())
            .with_max_matches(config.max_matches))
    }

    /// Share a caller-owned cache across discovery runs
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ItemCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override the per-scan deadline
    #[must_use]
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Override the number of matches kept per resource type
    #[must_use]
    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = max_matches.max(1);
        self
    }

    /// Scope roots in use
    #[must_use]
    pub fn locations(&self) -> &ResourceLocations {
        &self.locations
    }

    /// Discover and rank resources for `prompt`.
    ///
    /// Never returns an error: orchestrator failures come back as
    /// [`DiscoveryResult::Failed`], and callers should carry on without context.
    pub async fn discover(&self, prompt: Option<&str>, enabled: bool) -> DiscoveryResult {
        if !enabled {
            debug!("Resource discovery disabled");
            return DiscoveryResult::Skipped {
                reason: "discovery disabled".to_string(),
            };
        }

        match self.discover_all().await {
            Ok(resources) => {
                let context = self.build_context(&resources, prompt);
                info!(
                    "Discovered {} resources: {} agents, {} commands, {} skills, {} output styles matched",
                    context.total_discovered(),
                    context.agents.matched.len(),
                    context.commands.matched.len(),
                    context.skills.matched.len(),
                    context.output_styles.matched.len()
                );
                DiscoveryResult::Success { context }
            }
            Err(e) => {
                warn!("Resource discovery failed: {}", e);
                DiscoveryResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Discover every resource type concurrently.
    ///
    /// # Errors
    /// Returns [`DiscoveryError::NoHomeDir`] when the global root cannot be resolved
    pub async fn discover_all(&self) -> Result<DiscoveredResources> {
        let global_root = self.locations.resolve_global_root()?;
        let mut tasks = JoinSet::new();

        for kind in &RESOURCE_KINDS {
            let engine = self.clone();
            let global_root = global_root.clone();
            tasks.spawn(async move {
                let items = engine.discover_kind(kind, &global_root).await;
                (kind.resource_type, items)
            });
        }

        let mut resources = DiscoveredResources::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((resource_type, items)) => {
                    resources.by_type.insert(resource_type, items);
                }
                Err(e) => {
                    // Graceful degradation: that type contributes nothing
                    warn!("Discovery task failed: {}", e);
                }
            }
        }

        debug!("Discovery finished with {} items", resources.total());
        Ok(resources)
    }

    /// Discover one resource type across both scopes.
    ///
    /// # Errors
    /// Returns [`DiscoveryError::NoHomeDir`] when the global root cannot be resolved
    pub async fn discover_type(&self, resource_type: ResourceType) -> Result<Vec<DiscoveredItem>> {
        let global_root = self.locations.resolve_global_root()?;
        Ok(self
            .discover_kind(ResourceKind::for_type(resource_type), &global_root)
            .await)
    }

    async fn discover_kind(&self, kind: &ResourceKind, global_root: &Path) -> Vec<DiscoveredItem> {
        let local_dir = self.locations.project_root.join(kind.local_dir);
        let global_dir = global_root.join(kind.global_dir);

        let (local, global) = tokio::join!(
            self.discover_scope(kind, Source::Local, &local_dir),
            self.discover_scope(kind, Source::Global, &global_dir),
        );

        dedupe_by_name(local.into_iter().chain(global))
    }

    /// One scope, bounded by a single scan window end to end
    async fn discover_scope(
        &self,
        kind: &ResourceKind,
        source: Source,
        dir: &Path,
    ) -> Vec<DiscoveredItem> {
        match tokio::time::timeout(self.scan_timeout, self.load_scope(kind, source, dir)).await {
            Ok(items) => items,
            Err(_) => {
                warn!(
                    "Discovery of {} in {} timed out after {:?}",
                    kind.resource_type.plural_label(),
                    dir.display(),
                    self.scan_timeout
                );
                Vec::new()
            }
        }
    }

    async fn load_scope(
        &self,
        kind: &ResourceKind,
        source: Source,
        dir: &Path,
    ) -> Vec<DiscoveredItem> {
        let cache_key = normalize_path(dir);
        // The mtime only matters for cache validation
        let mtime = if self.cache.is_some() {
            match self.fs.stat(dir).await {
                Ok(stat) if stat.is_dir() => Some(stat.mtime),
                _ => None,
            }
        } else {
            None
        };

        if let (Some(cache), Some(mtime)) = (&self.cache, mtime) {
            if let Some(items) = cache.get(&cache_key, mtime) {
                debug!("Cache hit for {} ({} items)", cache_key, items.len());
                return items;
            }
        }

        let options = if kind.directory_based {
            ScanOptions::all_entries(self.scan_timeout)
        } else {
            ScanOptions::with_extensions(kind.extensions.iter().copied(), self.scan_timeout)
        };
        let scan = scan_directory(self.fs.as_ref(), dir, &options).await;
        if !scan.success {
            return Vec::new();
        }

        let files = if kind.directory_based {
            self.resolve_manifests(scan.files).await
        } else {
            scan.files
        };

        let items: Vec<DiscoveredItem> = join_all(
            files
                .iter()
                .map(|path| self.load_item(path, kind.resource_type, source)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        debug!(
            "Found {} {} in {} scope ({})",
            items.len(),
            kind.resource_type.plural_label(),
            source,
            dir.display()
        );

        if let (Some(cache), Some(mtime)) = (&self.cache, mtime) {
            cache.set(cache_key, items.clone(), mtime);
        }
        items
    }

    /// Map skill directory entries to their manifest files, skipping disabled
    /// entries, plain files and directories without a manifest.
    async fn resolve_manifests(&self, entries: Vec<PathBuf>) -> Vec<PathBuf> {
        let candidates = entries.into_iter().filter(|entry| {
            let disabled = is_disabled(entry);
            if disabled {
                debug!("Skipping disabled skill {}", entry.display());
            }
            !disabled
        });

        join_all(candidates.map(|entry| async move {
            match self.fs.stat(&entry).await {
                Ok(stat) if stat.is_dir() => {}
                _ => return None,
            }
            let manifest = entry.join(SKILL_MANIFEST);
            match self.fs.stat(&manifest).await {
                Ok(stat) if stat.is_file() => Some(manifest),
                _ => {
                    debug!("No {} in {}", SKILL_MANIFEST, entry.display());
                    None
                }
            }
        }))
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    async fn load_item(
        &self,
        path: &Path,
        resource_type: ResourceType,
        source: Source,
    ) -> Option<DiscoveredItem> {
        match self.fs.read_to_string(path).await {
            Ok(content) => Some(parse_resource(&content, path, resource_type, source)),
            Err(e) => {
                debug!("Skipping unreadable {}: {}", path.display(), e);
                None
            }
        }
    }

    fn build_context(&self, resources: &DiscoveredResources, prompt: Option<&str>) -> DiscoveryContext {
        let prompt = prompt.map(str::trim).filter(|p| !p.is_empty());
        let mut context = DiscoveryContext {
            thinking_requested: prompt.is_some_and(is_thinking_prompt),
            ..DiscoveryContext::default()
        };

        for kind in &RESOURCE_KINDS {
            let items = resources.get(kind.resource_type);
            let entry = context.for_type_mut(kind.resource_type);
            entry.total = items.len();

            if let Some(prompt) = prompt {
                let mut matched =
                    match_items_by_keywords(prompt, items.to_vec(), |item| item.keywords.as_slice());
                entry.match_count = matched.len();
                matched.truncate(self.max_matches);
                entry.matched = matched;
            }
        }

        context
    }
}

fn is_disabled(entry: &Path) -> bool {
    entry
        .file_name()
        .is_some_and(|name| name.to_string_lossy().to_lowercase().ends_with(DISABLED_SUFFIX))
}

/// Keep the first item for each normalized name
fn dedupe_by_name(items: impl Iterator<Item = DiscoveredItem>) -> Vec<DiscoveredItem> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in items {
        if seen.insert(item.normalized_name()) {
            unique.push(item);
        } else {
            debug!(
                "{} '{}' from {} scope shadowed by an earlier definition",
                item.resource_type, item.name, item.source
            );
        }
    }
    unique
}

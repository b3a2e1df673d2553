use crate::config::Config;
use anyhow::{Context, Result};
use promptlens_discovery::{
    format_context, DiscoveryResult, FileSystem, ItemCache, OsFileSystem, ResourceDiscovery,
};
use promptlens_logging::LogFormat;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hook event this binary answers
pub const HOOK_EVENT_NAME: &str = "UserPromptSubmit";

/// Replies that carry no intent worth matching
const SIMPLE_REPLIES: &[&str] = &[
    "continue", "yes", "no", "ok", "okay", "thanks", "sure", "done", "stop", "got it", "y", "n",
    "yep", "nope", "thank you", "thx", "ty", "next", "go", "proceed",
];

/// Payload delivered on stdin; both camelCase and snake_case keys are accepted
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HookInput {
    #[serde(default)]
    pub prompt: String,

    /// Working directory of the session; the process cwd is used when empty
    #[serde(default)]
    pub cwd: String,

    #[serde(default, alias = "session_id")]
    pub session_id: String,

    #[serde(default, alias = "hook_event_name")]
    pub hook_event_name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: HookSpecificOutput,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub additional_context: String,
}

impl HookOutput {
    pub fn with_context(additional_context: String) -> Self {
        Self {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: HOOK_EVENT_NAME.to_string(),
                additional_context,
            },
        }
    }
}

/// Why a prompt should not trigger discovery, if it shouldn't
pub fn bypass_reason(prompt: &str) -> Option<&'static str> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Some("empty prompt");
    }
    if trimmed.contains("<task-notification>") {
        return Some("task notification");
    }
    if is_slash_command(trimmed) {
        return Some("slash command");
    }
    let lower = trimmed.to_lowercase();
    if SIMPLE_REPLIES.contains(&lower.as_str()) {
        return Some("simple reply");
    }
    None
}

/// `/name args...` where the name is a single path-free identifier
fn is_slash_command(prompt: &str) -> bool {
    let Some(rest) = prompt.strip_prefix('/') else {
        return false;
    };
    let name = rest.split_whitespace().next().unwrap_or("");
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

/// Hook service - reads one prompt, answers with relevant resources
pub struct HookService {
    config: Config,
    fs: Arc<dyn FileSystem>,
    cache: Option<Arc<ItemCache>>,
}

impl HookService {
    /// Create a hook service on the real filesystem
    pub fn new(config: Config) -> Self {
        Self::with_filesystem(config, Arc::new(OsFileSystem))
    }

    pub fn with_filesystem(config: Config, fs: Arc<dyn FileSystem>) -> Self {
        let cache = config
            .discovery
            .cache_enabled
            .then(|| Arc::new(ItemCache::new()));
        Self { config, fs, cache }
    }

    /// Run the hook: stdin in, optional JSON on stdout
    pub async fn run(self) -> Result<()> {
        let format = self
            .config
            .logging
            .format
            .parse::<LogFormat>()
            .unwrap_or_else(|e| {
                eprintln!("promptlens-hook: {e}, using text");
                LogFormat::Text
            });
        if let Err(e) = promptlens_logging::init_logging(&self.config.logging.level, format) {
            eprintln!("promptlens-hook: logging disabled: {e:#}");
        }

        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read hook input from stdin")?;

        if let Some(output) = self.handle(&raw).await? {
            println!("{}", serde_json::to_string(&output)?);
        }
        Ok(())
    }

    /// Process one raw hook payload.
    ///
    /// `Ok(None)` means nothing should be printed.
    pub async fn handle(&self, raw: &str) -> Result<Option<HookOutput>> {
        let input: HookInput = serde_json::from_str(raw).context("Invalid hook input")?;

        if !input.hook_event_name.is_empty() && input.hook_event_name != HOOK_EVENT_NAME {
            debug!("Ignoring {} event", input.hook_event_name);
            return Ok(None);
        }

        if let Some(reason) = bypass_reason(&input.prompt) {
            debug!("Skipping discovery: {}", reason);
            return Ok(None);
        }

        let cwd = if input.cwd.is_empty() {
            std::env::current_dir().context("Could not determine working directory")?
        } else {
            PathBuf::from(&input.cwd)
        };
        debug!(
            "Discovering resources for session '{}' in {}",
            input.session_id,
            cwd.display()
        );

        let mut discovery =
            ResourceDiscovery::from_config(Arc::clone(&self.fs), &self.config.discovery, &cwd)?;
        if let Some(cache) = &self.cache {
            discovery = discovery.with_cache(Arc::clone(cache));
        }

        match discovery
            .discover(Some(&input.prompt), self.config.discovery.enabled)
            .await
        {
            DiscoveryResult::Success { context } => {
                let additional_context = format_context(&context);
                if additional_context.is_empty() {
                    debug!("No relevant resources");
                    return Ok(None);
                }
                info!(
                    "Injecting context for {} discovered resources",
                    context.total_discovered()
                );
                Ok(Some(HookOutput::with_context(additional_context)))
            }
            DiscoveryResult::Skipped { reason } => {
                debug!("Discovery skipped: {}", reason);
                Ok(None)
            }
            DiscoveryResult::Failed { error } => {
                warn!("Discovery failed, continuing without context: {}", error);
                Ok(None)
            }
        }
    }
}

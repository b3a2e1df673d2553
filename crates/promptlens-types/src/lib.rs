//! PromptLens Types - Core types for resource discovery
//!
//! This module defines the data model shared by the discovery engine and the hook.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub mod scan;

pub use scan::{ScanErrorCode, ScanResult};

/// Kind of declaratively-described resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Agent persona
    Agent,
    /// Slash command
    Command,
    /// Skill bundle (a directory with a manifest)
    Skill,
    /// Output style
    OutputStyle,
}

impl ResourceType {
    /// Every type, in output order
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Agent,
        ResourceType::Command,
        ResourceType::Skill,
        ResourceType::OutputStyle,
    ];

    /// Serialized name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Agent => "agent",
            ResourceType::Command => "command",
            ResourceType::Skill => "skill",
            ResourceType::OutputStyle => "output_style",
        }
    }

    /// Plural label used in human-readable listings
    pub fn plural_label(&self) -> &'static str {
        match self {
            ResourceType::Agent => "agents",
            ResourceType::Command => "commands",
            ResourceType::Skill => "skills",
            ResourceType::OutputStyle => "output styles",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope a resource was found in. Local always wins on a name collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Project-relative directory
    Local,
    /// User-home-relative directory
    Global,
}

impl Source {
    /// Serialized name
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Local => "local",
            Source::Global => "global",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resource found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredItem {
    /// Display name; also the deduplication key once lowercased
    pub name: String,
    /// One-line description, possibly empty
    pub description: String,
    /// Terms scored against prompts
    pub keywords: Vec<String>,
    /// File the item was parsed from
    pub file_path: PathBuf,
    /// Kind of resource
    pub resource_type: ResourceType,
    /// Scope the item came from
    pub source: Source,
}

impl DiscoveredItem {
    /// Deduplication key across scopes
    pub fn normalized_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Format as a listing line: "- name: description"
    pub fn to_summary(&self) -> String {
        if self.description.is_empty() {
            format!("- {}", self.name)
        } else {
            format!("- {}: {}", self.name, self.description)
        }
    }
}

/// An item paired with the keywords it matched against a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matched<T> {
    /// The matched item
    pub item: T,
    /// Keywords found in the prompt, in keyword-list order
    pub matched_keywords: Vec<String>,
    /// Number of matched keywords
    pub score: u32,
}

/// A discovered resource ranked against a prompt
pub type MatchedItem = Matched<DiscoveredItem>;

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, description: &str) -> DiscoveredItem {
        DiscoveredItem {
            name: name.to_string(),
            description: description.to_string(),
            keywords: vec![],
            file_path: PathBuf::from("/tmp/x.md"),
            resource_type: ResourceType::Agent,
            source: Source::Local,
        }
    }

    #[test]
    fn test_normalized_name() {
        assert_eq!(item("Code-Reviewer", "").normalized_name(), "code-reviewer");
    }

    #[test]
    fn test_summary_without_description() {
        assert_eq!(item("expert", "").to_summary(), "- expert");
        assert_eq!(item("expert", "Knows things").to_summary(), "- expert: Knows things");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ResourceType::OutputStyle).unwrap();
        assert_eq!(json, "\"output_style\"");
        let json = serde_json::to_string(&Source::Global).unwrap();
        assert_eq!(json, "\"global\"");
    }
}

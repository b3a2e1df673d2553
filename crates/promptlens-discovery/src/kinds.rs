//! Declarative table of discoverable resource kinds

use promptlens_types::ResourceType;

/// Manifest file expected inside every skill directory
pub const SKILL_MANIFEST: &str = "SKILL.md";

/// Directory-name suffix that excludes a skill from discovery
pub const DISABLED_SUFFIX: &str = ".disabled";

/// Where one resource type lives and how its files are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    /// Resource type produced by this row
    pub resource_type: ResourceType,
    /// Directory relative to the project root
    pub local_dir: &'static str,
    /// Directory relative to the global root (user home)
    pub global_dir: &'static str,
    /// Entries are directories holding [`SKILL_MANIFEST`] rather than files
    pub directory_based: bool,
    /// File suffixes accepted for file-based kinds
    pub extensions: &'static [&'static str],
}

/// Every resource kind, in output order
pub static RESOURCE_KINDS: [ResourceKind; 4] = [
    ResourceKind {
        resource_type: ResourceType::Agent,
        local_dir: ".claude/agents",
        global_dir: ".claude/agents",
        directory_based: false,
        extensions: &[".md"],
    },
    ResourceKind {
        resource_type: ResourceType::Command,
        local_dir: ".claude/commands",
        global_dir: ".claude/commands",
        directory_based: false,
        extensions: &[".md"],
    },
    ResourceKind {
        resource_type: ResourceType::Skill,
        local_dir: ".claude/skills",
        global_dir: ".claude/skills",
        directory_based: true,
        extensions: &[],
    },
    ResourceKind {
        resource_type: ResourceType::OutputStyle,
        local_dir: ".claude/output-styles",
        global_dir: ".claude/output-styles",
        directory_based: false,
        extensions: &[".md"],
    },
];

impl ResourceKind {
    /// Table row for `resource_type`
    #[must_use]
    pub fn for_type(resource_type: ResourceType) -> &'static ResourceKind {
        match resource_type {
            ResourceType::Agent => &RESOURCE_KINDS[0],
            ResourceType::Command => &RESOURCE_KINDS[1],
            ResourceType::Skill => &RESOURCE_KINDS[2],
            ResourceType::OutputStyle => &RESOURCE_KINDS[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_consistent() {
        for kind in &RESOURCE_KINDS {
            assert_eq!(ResourceKind::for_type(kind.resource_type), kind);
            assert_eq!(kind.directory_based, kind.extensions.is_empty());
        }
        assert!(ResourceKind::for_type(ResourceType::Skill).directory_based);
    }
}

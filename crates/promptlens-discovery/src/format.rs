//! Rendering discovery results for prompt injection

use crate::discovery::{DiscoveryContext, ResourceMatches};
use promptlens_types::ResourceType;

/// Render a context into a short block of text.
///
/// Generic mode lists each type's matches as `- name: description` bullets with an
/// `(and N more available)` note when matches were truncated. When the prompt asked
/// for deliberation, flag-style hints are emitted instead. Returns an empty string
/// when nothing matched.
#[must_use]
pub fn format_context(context: &DiscoveryContext) -> String {
    if !context.has_matches() {
        return String::new();
    }

    if context.thinking_requested {
        format_flag_hints(context)
    } else {
        format_listing(context)
    }
}

fn format_listing(context: &DiscoveryContext) -> String {
    let mut sections = Vec::new();

    for resource_type in ResourceType::ALL {
        let matches = context.for_type(resource_type);
        if matches.matched.is_empty() {
            continue;
        }
        sections.push(format_section(resource_type, matches));
    }

    sections.join("\n\n")
}

fn format_section(resource_type: ResourceType, matches: &ResourceMatches) -> String {
    let mut section = format!("Relevant {}:", resource_type.plural_label());
    for matched in &matches.matched {
        section.push('\n');
        section.push_str(&matched.item.to_summary());
    }
    let hidden = matches.hidden();
    if hidden > 0 {
        section.push_str(&format!("\n(and {hidden} more available)"));
    }
    section
}

fn format_flag_hints(context: &DiscoveryContext) -> String {
    let mut lines = vec!["Deliberation hints:".to_string()];

    for resource_type in ResourceType::ALL {
        let matches = context.for_type(resource_type);
        let Some(top) = matches.matched.first() else {
            continue;
        };

        let line = match resource_type {
            // Only one output style can be active
            ResourceType::OutputStyle => format!("--output-style {}", top.item.name),
            ResourceType::Command => format!("--commands {}", joined_names(matches, "/")),
            ResourceType::Agent => format!("--agents {}", joined_names(matches, "")),
            ResourceType::Skill => format!("--skills {}", joined_names(matches, "")),
        };
        lines.push(line);
    }

    lines.join("\n")
}

fn joined_names(matches: &ResourceMatches, prefix: &str) -> String {
    matches
        .matched
        .iter()
        .map(|m| format!("{prefix}{}", m.item.name))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlens_types::{DiscoveredItem, MatchedItem, Source};
    use std::path::PathBuf;

    fn matched(name: &str, description: &str, resource_type: ResourceType, score: u32) -> MatchedItem {
        MatchedItem {
            item: DiscoveredItem {
                name: name.to_string(),
                description: description.to_string(),
                keywords: vec![name.to_string()],
                file_path: PathBuf::from(format!("/x/{name}.md")),
                resource_type,
                source: Source::Local,
            },
            matched_keywords: vec![name.to_string()],
            score,
        }
    }

    fn sample_context() -> DiscoveryContext {
        DiscoveryContext {
            agents: ResourceMatches {
                matched: vec![
                    matched("reviewer", "Reviews code", ResourceType::Agent, 2),
                    matched("tester", "", ResourceType::Agent, 1),
                ],
                match_count: 4,
                total: 9,
            },
            commands: ResourceMatches {
                matched: vec![matched("commit", "Create a commit", ResourceType::Command, 1)],
                match_count: 1,
                total: 3,
            },
            output_styles: ResourceMatches {
                matched: vec![
                    matched("concise", "Short answers", ResourceType::OutputStyle, 2),
                    matched("verbose", "Long answers", ResourceType::OutputStyle, 1),
                ],
                match_count: 2,
                total: 2,
            },
            ..DiscoveryContext::default()
        }
    }

    #[test]
    fn test_empty_context_renders_nothing() {
        assert_eq!(format_context(&DiscoveryContext::default()), "");
    }

    #[test]
    fn test_listing_format() {
        let text = format_context(&sample_context());
        assert_eq!(
            text,
            "Relevant agents:\n- reviewer: Reviews code\n- tester\n(and 2 more available)\n\n\
             Relevant commands:\n- commit: Create a commit\n\n\
             Relevant output styles:\n- concise: Short answers\n- verbose: Long answers"
        );
    }

    #[test]
    fn test_thinking_mode_renders_flag_hints() {
        let context = DiscoveryContext {
            thinking_requested: true,
            ..sample_context()
        };
        let text = format_context(&context);
        assert_eq!(
            text,
            "Deliberation hints:\n--agents reviewer,tester\n--commands /commit\n--output-style concise"
        );
    }
}

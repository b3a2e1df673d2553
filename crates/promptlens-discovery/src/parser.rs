//! Resource metadata parsing
//!
//! Each resource file may start with a `---` delimited YAML header carrying
//! `name`, `description` and optional `keywords`. Parsing never fails: a missing
//! or broken header degrades to a name taken from the file system.

use crate::kinds::ResourceKind;
use promptlens_types::{DiscoveredItem, ResourceType, Source};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::debug;

/// Words dropped when deriving keywords from name and description
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "nor", "but", "yet", "with", "from", "into", "onto", "over", "about",
    "this", "that", "these", "those", "are", "was", "were", "been", "being", "has", "have",
    "had", "does", "did", "will", "would", "can", "could", "should", "may", "might", "must",
    "shall", "its", "you", "your", "not", "any", "all", "use", "when", "then", "than", "also",
];

/// Characters that only show up in a name when the YAML header is broken
const BROKEN_NAME_MARKERS: &[char] = &['[', ']', '{', '}'];

/// Values read out of the header block
#[derive(Debug, Default, PartialEq, Eq)]
struct Header {
    name: Option<String>,
    description: Option<String>,
    keywords: Option<Vec<String>>,
}

/// Parse a resource file into a [`DiscoveredItem`].
///
/// - explicit `keywords` (list or comma-separated string) are used verbatim
/// - otherwise keywords are derived from `"{name} {description}"`
/// - a header without `name` keeps its description and takes the fallback name
/// - a missing, malformed or bracket-mangled header yields only the fallback name
#[must_use]
pub fn parse_resource(
    content: &str,
    file_path: &Path,
    resource_type: ResourceType,
    source: Source,
) -> DiscoveredItem {
    let fallback = fallback_name(file_path, resource_type);

    let Some(header) = parse_header(content) else {
        debug!(
            "No usable metadata header in {}, using name '{}'",
            file_path.display(),
            fallback
        );
        return DiscoveredItem {
            name: fallback,
            description: String::new(),
            keywords: Vec::new(),
            file_path: file_path.to_path_buf(),
            resource_type,
            source,
        };
    };

    let name = header
        .name
        .filter(|n| !n.trim().is_empty())
        .map_or(fallback, |n| n.trim().to_string());
    let description = header
        .description
        .map(|d| d.trim().to_string())
        .unwrap_or_default();
    let keywords = header
        .keywords
        .unwrap_or_else(|| derive_keywords(&format!("{name} {description}")));

    DiscoveredItem {
        name,
        description,
        keywords,
        file_path: file_path.to_path_buf(),
        resource_type,
        source,
    }
}

/// Lowercase, split on non-alphanumeric runs, drop short tokens and stop words.
///
/// Repeated tokens are kept, so a word in both name and description counts twice.
#[must_use]
pub fn derive_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 2 && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Name used when the header does not supply one: the file stem, or for
/// directory-based resources the name of the directory holding the manifest.
fn fallback_name(file_path: &Path, resource_type: ResourceType) -> String {
    let from_dir = if ResourceKind::for_type(resource_type).directory_based {
        file_path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    } else {
        None
    };

    from_dir
        .or_else(|| {
            file_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_default()
}

/// Extract the leading header block. `None` means missing or malformed.
fn parse_header(content: &str) -> Option<Header> {
    let frontmatter_re = Regex::new(r"^\u{feff}?---[ \t]*\r?\n([\s\S]*?)\r?\n---[ \t]*(?:\r?\n|$)").ok()?;
    let yaml_str = frontmatter_re.captures(content)?.get(1)?.as_str();

    let mapping = match serde_yaml::from_str::<Value>(yaml_str) {
        Ok(Value::Mapping(mapping)) => mapping,
        Ok(_) => return None,
        Err(e) => {
            debug!("Malformed metadata header: {}", e);
            return None;
        }
    };

    let name = match get(&mapping, "name") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let name = scalar_to_string(value)?;
            if name.contains(BROKEN_NAME_MARKERS) {
                return None;
            }
            Some(name)
        }
    };

    Some(Header {
        name,
        description: get(&mapping, "description").and_then(scalar_to_string),
        keywords: get(&mapping, "keywords").and_then(keywords_from_value),
    })
}

fn get<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping.get(key)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn keywords_from_value(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => Some(items.iter().filter_map(scalar_to_string).collect()),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

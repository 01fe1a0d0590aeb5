use crate::models::BindMode;
use crate::scene::registry::BindingRegistry;
use serde::{Deserialize, Serialize};

/// Class name used when a node name sanitizes to nothing
pub const FALLBACK_CLASS_NAME: &str = "AutoBindUI";

/// Characters never allowed in a generated class (and file) name
const INVALID_NAME_CHARS: &[char] = &['"', '<', '>', '|', ':', '*', '?', '\\', '/', ' '];

/// State owned by a node marked as a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerData {
    #[serde(default)]
    pub bindings: BindingRegistry,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_class_name: Option<String>,
    #[serde(default)]
    pub bind_mode: BindMode,
}

impl ContainerData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the exclusion prefixes from a comma separated list
    pub fn set_excluded_prefixes(&mut self, list: &str) {
        self.excluded_prefixes = parse_prefix_list(list);
    }

    pub fn is_excluded(&self, node_name: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| node_name.starts_with(prefix.as_str()))
    }

    /// Generated class name: the custom name when set, otherwise the sanitized node name
    pub fn class_name(&self, node_name: &str) -> String {
        match self.custom_class_name.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => custom.to_string(),
            _ => sanitize_class_name(node_name),
        }
    }
}

/// Split a comma separated prefix list, trimming entries and dropping empty ones
pub fn parse_prefix_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn a node name into a class name: drop path-hostile characters, whitespace and
/// control characters, then upper-case the first letter.
pub fn sanitize_class_name(node_name: &str) -> String {
    let cleaned: String = node_name
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace() && !INVALID_NAME_CHARS.contains(c))
        .collect();

    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => FALLBACK_CLASS_NAME.to_string(),
    }
}

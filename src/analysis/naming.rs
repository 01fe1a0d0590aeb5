use crate::models::TypeRef;
use serde::{Deserialize, Serialize};

/// Maps a node-name suffix to the capability type expected on that node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuffixRule {
    pub suffix: String,
    pub component_type: TypeRef,
}

impl SuffixRule {
    pub fn new(suffix: &str, component_type: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            component_type: TypeRef::parse(component_type),
        }
    }

    /// Case-insensitive suffix test against the whole name
    pub fn matches(&self, node_name: &str) -> bool {
        !self.suffix.is_empty() && ends_with_ignore_case(node_name, &self.suffix)
    }
}

/// Ordered naming rules. The first rule whose suffix matches a name wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<SuffixRule>,
}

fn default_rules() -> Vec<SuffixRule> {
    vec![
        SuffixRule::new("_btn", "UnityEngine.UI.Button"),
        SuffixRule::new("_txt", "UnityEngine.UI.Text"),
        SuffixRule::new("_img", "UnityEngine.UI.Image"),
        SuffixRule::new("_tgl", "UnityEngine.UI.Toggle"),
        SuffixRule::new("_slr", "UnityEngine.UI.Slider"),
        SuffixRule::new("_inp", "UnityEngine.UI.InputField"),
        SuffixRule::new("_scr", "UnityEngine.UI.ScrollRect"),
        SuffixRule::new("_grid", "UnityEngine.UI.GridLayoutGroup"),
    ]
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl NamingConfig {
    pub fn new(rules: Vec<SuffixRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule, in declared order, whose suffix ends the name
    pub fn match_rule(&self, node_name: &str) -> Option<&SuffixRule> {
        self.rules.iter().find(|rule| rule.matches(node_name))
    }

    /// Append a rule for `component_type`, using the suggested suffix when none is given
    pub fn add_rule_for_type(&mut self, component_type: &str, suffix: Option<&str>) -> &SuffixRule {
        let type_ref = TypeRef::parse(component_type);
        let suffix = match suffix {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => suggest_suffix(&type_ref.name),
        };
        self.rules.push(SuffixRule {
            suffix,
            component_type: type_ref,
        });
        &self.rules[self.rules.len() - 1]
    }

    /// Suffixes declared by more than one rule; only the first of each can ever match
    pub fn shadowed_suffixes(&self) -> Vec<String> {
        let mut shadowed = Vec::new();
        for (i, rule) in self.rules.iter().enumerate() {
            let repeated = self.rules[..i]
                .iter()
                .any(|earlier| earlier.suffix.eq_ignore_ascii_case(&rule.suffix));
            if repeated && !shadowed.contains(&rule.suffix) {
                shadowed.push(rule.suffix.clone());
            }
        }
        shadowed
    }
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.to_lowercase().ends_with(&suffix.to_lowercase())
}

/// Lower-case the first character, leaving the rest untouched
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Field name for a node matched by `suffix`: the name without the suffix, first letter
/// lower-cased. The suffix is stripped once, case-insensitively.
pub fn derive_field_name(node_name: &str, suffix: &str) -> String {
    let stem = if ends_with_ignore_case(node_name, suffix) {
        let lowered = node_name.to_lowercase();
        let cut = lowered.len() - suffix.to_lowercase().len();
        // byte offsets only line up when lower-casing kept the length
        if lowered.len() == node_name.len() && node_name.is_char_boundary(cut) {
            &node_name[..cut]
        } else {
            node_name
        }
    } else {
        node_name
    };
    lower_first(stem)
}

/// Field name for a binding made from a capability type, e.g. `Button` -> `button`
pub fn field_name_for_type(type_ref: &TypeRef) -> String {
    lower_first(&type_ref.name)
}

/// Conventional suffix for a capability type name
pub fn suggest_suffix(type_name: &str) -> String {
    let known = match type_name {
        "Button" => Some("_btn"),
        "Text" | "TextMeshProUGUI" => Some("_txt"),
        "Image" => Some("_img"),
        "RawImage" => Some("_raw"),
        "Toggle" => Some("_tgl"),
        "Slider" => Some("_slr"),
        "InputField" | "TMP_InputField" => Some("_inp"),
        "ScrollRect" => Some("_scr"),
        "Scrollbar" => Some("_sbar"),
        "Dropdown" | "TMP_Dropdown" => Some("_dd"),
        "GridLayoutGroup" => Some("_grid"),
        "VerticalLayoutGroup" => Some("_vlg"),
        "HorizontalLayoutGroup" => Some("_hlg"),
        "Canvas" => Some("_canvas"),
        "CanvasGroup" => Some("_group"),
        "RectTransform" => Some("_rect"),
        "LayoutElement" => Some("_layout"),
        "ContentSizeFitter" => Some("_fitter"),
        "Animator" => Some("_anim"),
        "AudioSource" => Some("_audio"),
        "Camera" => Some("_cam"),
        _ => None,
    };
    match known {
        Some(suffix) => suffix.to_string(),
        None => {
            let short: String = type_name.chars().take(3).collect();
            format!("_{}", short.to_lowercase())
        }
    }
}

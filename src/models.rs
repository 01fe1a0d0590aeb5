use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identity of a node inside a [`crate::scene::SceneTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A type name split into namespace and simple name.
///
/// Serialized as its qualified form, e.g. `"UnityEngine.UI.Button"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeRef {
    pub namespace: String,
    pub name: String,
}

impl TypeRef {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Parse a qualified name, splitting on the last `.`
    pub fn parse(qualified: &str) -> Self {
        let qualified = qualified.trim();
        match qualified.rfind('.') {
            Some(pos) => Self::new(&qualified[..pos], &qualified[pos + 1..]),
            None => Self::new("", qualified),
        }
    }

    pub fn qualified(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Case-insensitive comparison against either the simple or the qualified name
    pub fn matches_name(&self, simple_or_qualified: &str) -> bool {
        self.name.eq_ignore_ascii_case(simple_or_qualified)
            || self.qualified().eq_ignore_ascii_case(simple_or_qualified)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

impl From<String> for TypeRef {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for TypeRef {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.qualified()
    }
}

/// What a binding points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BindTarget {
    /// A specific capability attached to a node
    Capability {
        node: NodeId,
        #[serde(rename = "type")]
        type_ref: TypeRef,
    },
    /// A nested container; the field holds the container's generated instance
    Container { node: NodeId },
}

impl BindTarget {
    pub fn capability(node: NodeId, type_ref: TypeRef) -> Self {
        BindTarget::Capability { node, type_ref }
    }

    pub fn container(node: NodeId) -> Self {
        BindTarget::Container { node }
    }

    pub fn node(&self) -> NodeId {
        match self {
            BindTarget::Capability { node, .. } | BindTarget::Container { node } => *node,
        }
    }
}

/// One field to generate and bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    #[serde(default)]
    pub target: Option<BindTarget>,
    #[serde(default)]
    pub field_name: String,
    #[serde(default = "default_generate_field")]
    pub generate_field: bool,
}

fn default_generate_field() -> bool {
    true
}

impl Binding {
    pub fn new(target: Option<BindTarget>, field_name: &str) -> Self {
        Self {
            target,
            field_name: field_name.to_string(),
            generate_field: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.target.is_some() && !self.field_name.is_empty()
    }

    pub fn references(&self, target: &BindTarget) -> bool {
        self.target.as_ref() == Some(target)
    }
}

/// How a container discovers its bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindMode {
    /// Only explicitly added bindings
    Manual,
    /// Only bindings found through naming rules
    NamingConvention,
    #[default]
    Hybrid,
}

impl BindMode {
    pub fn allows_manual(self) -> bool {
        matches!(self, BindMode::Manual | BindMode::Hybrid)
    }

    pub fn allows_naming_convention(self) -> bool {
        matches!(self, BindMode::NamingConvention | BindMode::Hybrid)
    }
}

/// A live reference stored in a generated field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub node: NodeId,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

/// A typed behaviour attached to a node.
///
/// Engine capabilities carry no fields. Instances of generated types carry one slot per
/// declared field, filled in by the binder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Option<ObjectRef>>,
}

impl Capability {
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Option<ObjectRef>> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod type_ref {
        use super::*;

        #[test]
        fn test_parse_qualified_name() {
            let ty = TypeRef::parse("UnityEngine.UI.Button");
            assert_eq!(ty.namespace, "UnityEngine.UI");
            assert_eq!(ty.name, "Button");
            assert_eq!(ty.qualified(), "UnityEngine.UI.Button");
        }

        #[test]
        fn test_parse_simple_name() {
            let ty = TypeRef::parse("MainPanel");
            assert_eq!(ty.namespace, "");
            assert_eq!(ty.qualified(), "MainPanel");
        }

        #[test]
        fn test_matches_name_case_insensitive() {
            let ty = TypeRef::parse("UnityEngine.UI.Button");
            assert!(ty.matches_name("button"));
            assert!(ty.matches_name("unityengine.ui.button"));
            assert!(!ty.matches_name("Image"));
        }

        #[test]
        fn test_serializes_as_string() {
            let ty = TypeRef::parse("UnityEngine.UI.Text");
            assert_eq!(
                serde_json::to_string(&ty).unwrap(),
                "\"UnityEngine.UI.Text\""
            );
            let back: TypeRef = serde_json::from_str("\"UnityEngine.UI.Text\"").unwrap();
            assert_eq!(back, ty);
        }
    }

    mod binding {
        use super::*;

        #[test]
        fn test_validity_requires_target_and_name() {
            let target = BindTarget::capability(NodeId(1), TypeRef::parse("UI.Button"));
            assert!(Binding::new(Some(target.clone()), "ok").is_valid());
            assert!(!Binding::new(Some(target), "").is_valid());
            assert!(!Binding::new(None, "ok").is_valid());
        }

        #[test]
        fn test_generate_field_defaults_to_true_when_missing() {
            let json = r#"{"target":{"kind":"container","node":3},"fieldName":"child"}"#;
            let binding: Binding = serde_json::from_str(json).unwrap();
            assert!(binding.generate_field);
            assert_eq!(binding.target, Some(BindTarget::container(NodeId(3))));
        }
    }

    mod bind_mode {
        use super::*;

        #[test]
        fn test_mode_permissions() {
            assert!(BindMode::Manual.allows_manual());
            assert!(!BindMode::Manual.allows_naming_convention());
            assert!(!BindMode::NamingConvention.allows_manual());
            assert!(BindMode::Hybrid.allows_manual());
            assert!(BindMode::Hybrid.allows_naming_convention());
        }
    }
}

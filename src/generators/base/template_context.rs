use crate::generators::base::regions::{
    AUTO_REGION_END, AUTO_REGION_START, MANUAL_REGION_END, MANUAL_REGION_START,
};
use crate::generators::request::{FieldSpec, GenerationRequest};
use crate::interface::config::GenerationConfig;
use serde::Serialize;
use std::collections::BTreeSet;

/// Namespace every generated class needs for its base type and `[SerializeField]`
const ENGINE_NAMESPACE: &str = "UnityEngine";

/// Template context for one generated field
#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub name: String,
    /// Simple type name, or the qualified one when the simple name would be ambiguous
    pub type_name: String,
    pub comment: Option<String>,
}

impl FieldContext {
    fn from_spec(spec: &FieldSpec, all: &[FieldSpec], class_name: &str, comments: bool) -> Self {
        let ambiguous = all.iter().any(|other| {
            other.type_ref.name == spec.type_ref.name
                && other.type_ref.namespace != spec.type_ref.namespace
        }) || (spec.type_ref.name == class_name && !spec.nested);
        let type_name = if ambiguous {
            spec.type_ref.qualified()
        } else {
            spec.type_ref.name.clone()
        };
        let comment = comments.then(|| {
            if spec.nested {
                format!("{} (nested {})", spec.source_path, spec.type_ref.name)
            } else {
                spec.source_path.clone()
            }
        });
        Self {
            name: spec.name.clone(),
            type_name,
            comment,
        }
    }
}

/// Template context for one generated class
#[derive(Debug, Clone, Serialize)]
pub struct ClassContext {
    pub class_name: String,
    pub container_path: String,
    pub namespace: String,
    /// Prefix for lines inside the namespace block
    pub ns_indent: String,
    pub usings: Vec<String>,
    /// `Base, IFoo, IBar`, empty when there is nothing to inherit
    pub inheritance: String,
    pub fields: Vec<FieldContext>,
    pub auto_region_start: &'static str,
    pub auto_region_end: &'static str,
    pub manual_region_start: &'static str,
    pub manual_region_end: &'static str,
}

impl ClassContext {
    pub fn from_request(request: &GenerationRequest, config: &GenerationConfig) -> Self {
        let namespace = config.namespace.trim().to_string();

        let mut usings: BTreeSet<String> = BTreeSet::new();
        usings.insert(ENGINE_NAMESPACE.to_string());
        usings.extend(
            config
                .additional_namespaces
                .iter()
                .map(|ns| ns.trim().to_string()),
        );
        usings.extend(request.fields.iter().map(|f| f.type_ref.namespace.clone()));
        usings.retain(|ns| !ns.is_empty() && *ns != namespace);

        Self {
            class_name: request.class_name.clone(),
            container_path: request.container_path.clone(),
            ns_indent: if namespace.is_empty() {
                String::new()
            } else {
                "    ".to_string()
            },
            namespace,
            usings: usings.into_iter().collect(),
            inheritance: config.inheritance().join(", "),
            fields: request
                .fields
                .iter()
                .map(|f| {
                    FieldContext::from_spec(
                        f,
                        &request.fields,
                        &request.class_name,
                        config.emit_field_comments,
                    )
                })
                .collect(),
            auto_region_start: AUTO_REGION_START,
            auto_region_end: AUTO_REGION_END,
            manual_region_start: MANUAL_REGION_START,
            manual_region_end: MANUAL_REGION_END,
        }
    }
}

use crate::error::{Error, Result};
use crate::interface::config::GenerationConfig;
use crate::models::{BindTarget, NodeId, TypeRef};
use crate::scene::SceneTree;
use serde::Serialize;
use std::path::PathBuf;

/// One field to declare on the generated class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub type_ref: TypeRef,
    /// Path of the bound node below the container, used for doc comments
    pub source_path: String,
    /// The field holds another container's generated class
    pub nested: bool,
}

/// Everything needed to emit one container's class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub container: NodeId,
    pub class_name: String,
    pub container_path: String,
    pub fields: Vec<FieldSpec>,
}

impl GenerationRequest {
    /// Collect the valid bindings of `container` that should produce a field.
    ///
    /// A nested container target is typed as that container's generated class in the
    /// configured namespace. Fails with [`Error::NoValidBindings`] when nothing is left.
    pub fn from_container(
        tree: &SceneTree,
        container: NodeId,
        config: &GenerationConfig,
    ) -> Result<Self> {
        let class_name = tree.class_name(container)?;
        let container_path = tree.path(container);
        let data = tree.container(container)?;
        let prefix = format!("{}/", container_path);

        let mut fields = Vec::new();
        for binding in data.bindings.valid_bindings() {
            if !binding.generate_field {
                continue;
            }
            let Some(target) = binding.target.as_ref() else {
                continue;
            };
            let node = tree.node(target.node())?;
            let (type_ref, nested) = match target {
                BindTarget::Capability { type_ref, .. } => (type_ref.clone(), false),
                BindTarget::Container { node: id } => (
                    TypeRef::new(&config.namespace, &tree.class_name(*id)?),
                    true,
                ),
            };
            let source_path = if node.id == container {
                node.name.clone()
            } else {
                let full_path = tree.path(node.id);
                full_path
                    .strip_prefix(prefix.as_str())
                    .unwrap_or(&full_path)
                    .to_string()
            };
            fields.push(FieldSpec {
                name: binding.field_name.clone(),
                type_ref,
                source_path,
                nested,
            });
        }

        if fields.is_empty() {
            return Err(Error::NoValidBindings(class_name));
        }

        Ok(Self {
            container,
            class_name,
            container_path,
            fields,
        })
    }
}

/// Paths produced by one generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFiles {
    pub class_name: String,
    /// The regenerable file; in single-file mode the only file
    pub auto_file: PathBuf,
    /// The user-owned partial file, in partial mode
    pub manual_file: Option<PathBuf>,
    /// Whether the manual file was created by this run
    pub manual_created: bool,
}

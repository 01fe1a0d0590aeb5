//! Arena-backed node tree consumed by the resolver, generator and binder.
//!
//! Nodes are addressed by [`NodeId`]. A node is either a plain leaf or a container that
//! owns a [`BindingRegistry`]. The tree round-trips through JSON so scenes can be fed to
//! the command line tool.

pub mod container;
pub mod registry;

use crate::error::{Error, Result};
use crate::models::{Capability, NodeId, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub use container::{parse_prefix_list, sanitize_class_name, ContainerData};
pub use registry::BindingRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    #[default]
    Leaf,
    Container(ContainerData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub kind: NodeKind,
}

impl Node {
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    pub fn container(&self) -> Option<&ContainerData> {
        match &self.kind {
            NodeKind::Container(data) => Some(data),
            NodeKind::Leaf => None,
        }
    }

    pub fn capability(&self, type_ref: &TypeRef) -> Option<&Capability> {
        self.capabilities.iter().find(|c| &c.type_ref == type_ref)
    }

    pub fn has_capability(&self, type_ref: &TypeRef) -> bool {
        self.capability(type_ref).is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneTree {
    nodes: Vec<Node>,
    #[serde(skip)]
    dirty: BTreeSet<NodeId>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, name: &str) -> NodeId {
        self.push_node(name, None)
    }

    pub fn add_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.push_node(name, Some(parent));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    fn push_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: name.to_string(),
            parent,
            children: Vec::new(),
            capabilities: Vec::new(),
            kind: NodeKind::Leaf,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::NodeNotFound(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(Error::NodeNotFound(id.0))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes.get(id.0).map(|n| n.name.as_str()).unwrap_or("")
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn capabilities(&self, id: NodeId) -> &[Capability] {
        self.nodes
            .get(id.0)
            .map(|n| n.capabilities.as_slice())
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect()
    }

    /// Attach a capability, returning the existing instance when one of the same type is
    /// already present
    pub fn attach_capability(&mut self, id: NodeId, type_ref: TypeRef) -> Result<&mut Capability> {
        let node = self.node_mut(id)?;
        let index = match node.capabilities.iter().position(|c| c.type_ref == type_ref) {
            Some(index) => index,
            None => {
                node.capabilities.push(Capability::new(type_ref));
                node.capabilities.len() - 1
            }
        };
        self.dirty.insert(id);
        Ok(&mut self.nodes[id.0].capabilities[index])
    }

    pub fn capability_mut(&mut self, id: NodeId, type_ref: &TypeRef) -> Option<&mut Capability> {
        self.nodes
            .get_mut(id.0)?
            .capabilities
            .iter_mut()
            .find(|c| &c.type_ref == type_ref)
    }

    /// Mark a node as a container. Existing container state is kept.
    pub fn mark_container(&mut self, id: NodeId) -> Result<&mut ContainerData> {
        let node = self.node_mut(id)?;
        if !node.is_container() {
            node.kind = NodeKind::Container(ContainerData::new());
        }
        self.dirty.insert(id);
        self.container_mut(id)
    }

    /// Remove the container marker, dropping the bindings it owned
    pub fn unmark_container(&mut self, id: NodeId) -> Result<Option<ContainerData>> {
        let node = self.node_mut(id)?;
        let previous = std::mem::take(&mut node.kind);
        self.dirty.insert(id);
        Ok(match previous {
            NodeKind::Container(data) => Some(data),
            NodeKind::Leaf => None,
        })
    }

    pub fn is_container(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(Node::is_container)
    }

    pub fn container(&self, id: NodeId) -> Result<&ContainerData> {
        let node = self.node(id)?;
        node.container()
            .ok_or_else(|| Error::NotAContainer(node.name.clone()))
    }

    pub fn container_mut(&mut self, id: NodeId) -> Result<&mut ContainerData> {
        let node = self.node_mut(id)?;
        match &mut node.kind {
            NodeKind::Container(data) => Ok(data),
            NodeKind::Leaf => Err(Error::NotAContainer(node.name.clone())),
        }
    }

    /// Generated class name of a container
    pub fn class_name(&self, id: NodeId) -> Result<String> {
        let node = self.node(id)?;
        let data = self.container(id)?;
        Ok(data.class_name(&node.name))
    }

    /// All nodes below `id` in parent-first order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every container in the scene, parent-first from each root
    pub fn containers(&self) -> Vec<NodeId> {
        self.roots()
            .into_iter()
            .flat_map(|root| std::iter::once(root).chain(self.descendants(root)))
            .filter(|id| self.is_container(*id))
            .collect()
    }

    /// First node with the given name, parent-first
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.roots()
            .into_iter()
            .flat_map(|root| std::iter::once(root).chain(self.descendants(root)))
            .find(|id| self.name(*id) == name)
    }

    /// Slash separated names from the root down to `id`
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = self.nodes.get(id.0);
        while let Some(node) = current {
            segments.push(node.name.as_str());
            current = node.parent.and_then(|p| self.nodes.get(p.0));
        }
        segments.reverse();
        segments.join("/")
    }

    pub fn mark_dirty(&mut self, id: NodeId) {
        self.dirty.insert(id);
    }

    pub fn dirty_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dirty.iter().copied()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let tree: Self = serde_json::from_str(json)?;
        tree.check_consistency()?;
        Ok(tree)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        self.clear_dirty();
        Ok(())
    }

    /// Reject hand-edited scenes whose links or bindings contradict each other
    fn check_consistency(&self) -> Result<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.0 != index {
                return Err(Error::InvalidScene(format!(
                    "node '{}' has id {} but sits at index {}",
                    node.name, node.id.0, index
                )));
            }
            if let Some(parent) = node.parent {
                let linked = self
                    .nodes
                    .get(parent.0)
                    .is_some_and(|p| p.children.contains(&node.id));
                if !linked {
                    return Err(Error::InvalidScene(format!(
                        "node '{}' names parent {} which does not list it as a child",
                        node.name, parent
                    )));
                }
            }
            for child in &node.children {
                let linked = self
                    .nodes
                    .get(child.0)
                    .is_some_and(|c| c.parent == Some(node.id));
                if !linked {
                    return Err(Error::InvalidScene(format!(
                        "node '{}' lists child {} whose parent differs",
                        node.name, child
                    )));
                }
            }
            if let Some(data) = node.container() {
                if let Some(target) = data.bindings.first_duplicate() {
                    return Err(Error::InvalidScene(format!(
                        "container '{}' binds node {} more than once",
                        node.name,
                        target.node()
                    )));
                }
            }
        }
        Ok(())
    }
}

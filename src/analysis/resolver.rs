use crate::analysis::naming::{derive_field_name, field_name_for_type, lower_first, NamingConfig};
use crate::analysis::type_registry::TypeRegistry;
use crate::error::{Error, Result};
use crate::interface::output::Logger;
use crate::models::{BindTarget, Binding, NodeId, TypeRef};
use crate::scene::SceneTree;
use serde::Serialize;

/// Capability types never offered when binding a container's own capabilities
const TRANSFORM_TYPES: &[&str] = &["Transform", "RectTransform"];

/// Field name used for placeholder bindings
pub const PLACEHOLDER_FIELD_NAME: &str = "newBinding";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnmatchedReason {
    /// The rule's type is known but the node does not carry it
    CapabilityMissing,
    /// The rule names a type the registry does not know
    TypeNotRegistered,
}

/// A node whose name matched a rule but which could not be bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedNode {
    pub node: NodeId,
    pub name: String,
    pub attempted_type: String,
    pub reason: UnmatchedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    pub added: Vec<Binding>,
    pub skipped: Vec<NodeId>,
    pub unmatched: Vec<UnmatchedNode>,
}

impl ResolveOutcome {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.skipped.is_empty() && self.unmatched.is_empty()
    }
}

/// What one rule-matching pass found for a single node
enum Candidate {
    Bind { target: BindTarget, field_name: String },
    Unmatched(UnmatchedNode),
}

/// Fills container binding registries, either from naming rules or from explicit picks
pub struct BindingResolver<'a> {
    naming: &'a NamingConfig,
    types: &'a TypeRegistry,
    logger: Logger,
}

impl<'a> BindingResolver<'a> {
    pub fn new(naming: &'a NamingConfig, types: &'a TypeRegistry) -> Self {
        Self {
            naming,
            types,
            logger: Logger::new(false, false),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Match descendant names against the naming rules and append bindings for hits.
    ///
    /// Traversal is depth-first and parent-first. Nested containers and their whole subtree
    /// are skipped. A node whose name starts with an exclusion prefix is not matched, but its
    /// children still are. Nodes that match no rule are ignored.
    pub fn resolve(&self, tree: &mut SceneTree, container: NodeId) -> Result<ResolveOutcome> {
        let data = tree.container(container)?;
        if !data.bind_mode.allows_naming_convention() {
            self.logger.debug(&format!(
                "Skipping naming resolution for '{}': bind mode is manual",
                tree.name(container)
            ));
            return Ok(ResolveOutcome::default());
        }

        let candidates = self.collect_candidates(tree, container)?;

        let mut outcome = ResolveOutcome::default();
        let registry = &mut tree.container_mut(container)?.bindings;
        for candidate in candidates {
            match candidate {
                Candidate::Bind { target, field_name } => {
                    let node = target.node();
                    if registry.add(Some(target.clone()), &field_name) {
                        outcome.added.push(Binding::new(Some(target), &field_name));
                    } else {
                        outcome.skipped.push(node);
                    }
                }
                Candidate::Unmatched(unmatched) => outcome.unmatched.push(unmatched),
            }
        }

        for added in &outcome.added {
            if added.field_name.is_empty() {
                self.logger.warning(&format!(
                    "Binding for '{}' has an empty field name and will not be generated",
                    added.target.as_ref().map(|t| tree.name(t.node())).unwrap_or("")
                ));
            }
        }
        for unmatched in &outcome.unmatched {
            self.logger.warning(&format!(
                "'{}' looks like a {} but {}",
                tree.path(unmatched.node),
                unmatched.attempted_type,
                match unmatched.reason {
                    UnmatchedReason::CapabilityMissing => "carries no such capability",
                    UnmatchedReason::TypeNotRegistered => "that type is not registered",
                }
            ));
        }
        if !outcome.added.is_empty() {
            tree.mark_dirty(container);
        }

        self.logger.verbose(&format!(
            "Resolved '{}': {} added, {} skipped, {} unmatched",
            tree.name(container),
            outcome.added.len(),
            outcome.skipped.len(),
            outcome.unmatched.len()
        ));
        Ok(outcome)
    }

    fn collect_candidates(&self, tree: &SceneTree, container: NodeId) -> Result<Vec<Candidate>> {
        let data = tree.container(container)?;
        let mut candidates = Vec::new();
        let mut stack: Vec<NodeId> = tree.children(container).iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let node = tree.node(id)?;
            if node.is_container() {
                self.logger
                    .verbose(&format!("Skipping nested container subtree '{}'", node.name));
                continue;
            }
            stack.extend(node.children.iter().rev().copied());

            if data.is_excluded(&node.name) {
                self.logger.verbose(&format!("Excluded '{}' by prefix", node.name));
                continue;
            }
            let Some(rule) = self.naming.match_rule(&node.name) else {
                continue;
            };

            let attempted_type = rule.component_type.qualified();
            let candidate = match self.types.find_type(&attempted_type) {
                None => Candidate::Unmatched(UnmatchedNode {
                    node: id,
                    name: node.name.clone(),
                    attempted_type,
                    reason: UnmatchedReason::TypeNotRegistered,
                }),
                Some(info) if node.has_capability(&info.type_ref) => Candidate::Bind {
                    target: BindTarget::capability(id, info.type_ref),
                    field_name: derive_field_name(&node.name, &rule.suffix),
                },
                Some(info) => Candidate::Unmatched(UnmatchedNode {
                    node: id,
                    name: node.name.clone(),
                    attempted_type: info.type_ref.qualified(),
                    reason: UnmatchedReason::CapabilityMissing,
                }),
            };
            candidates.push(candidate);
        }
        Ok(candidates)
    }

    /// Add an explicitly chosen target.
    ///
    /// An empty `field_name` is derived from the target: the capability type name, or the
    /// nested container's class name, with the first letter lower-cased. Returns `false` when
    /// the target is already bound.
    pub fn add_manual(
        &self,
        tree: &mut SceneTree,
        container: NodeId,
        target: BindTarget,
        field_name: Option<&str>,
    ) -> Result<bool> {
        self.ensure_manual_allowed(tree, container)?;
        let derived = self.check_target(tree, container, &target)?;
        let field_name = match field_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => derived,
        };

        let added = tree
            .container_mut(container)?
            .bindings
            .add(Some(target), &field_name);
        if added {
            tree.mark_dirty(container);
            self.logger
                .verbose(&format!("Added binding '{}' to '{}'", field_name, tree.name(container)));
        } else {
            self.logger.debug(&format!(
                "'{}' already binds that target; nothing added",
                tree.name(container)
            ));
        }
        Ok(added)
    }

    /// Append an empty binding to be filled in later. It is ignored by generation until it
    /// has a target.
    pub fn add_placeholder(&self, tree: &mut SceneTree, container: NodeId) -> Result<()> {
        self.ensure_manual_allowed(tree, container)?;
        tree.container_mut(container)?
            .bindings
            .add(None, PLACEHOLDER_FIELD_NAME);
        tree.mark_dirty(container);
        Ok(())
    }

    pub fn remove_binding(
        &self,
        tree: &mut SceneTree,
        container: NodeId,
        index: usize,
    ) -> Result<Option<Binding>> {
        let removed = tree.container_mut(container)?.bindings.remove_at(index);
        if removed.is_some() {
            tree.mark_dirty(container);
        }
        Ok(removed)
    }

    /// Drop every binding, returning how many were removed
    pub fn clear_bindings(&self, tree: &mut SceneTree, container: NodeId) -> Result<usize> {
        let registry = &mut tree.container_mut(container)?.bindings;
        let count = registry.len();
        registry.clear();
        if count > 0 {
            tree.mark_dirty(container);
        }
        Ok(count)
    }

    /// Bind every capability on the container node itself, except transforms and the
    /// container's own generated type
    pub fn add_own_capabilities(
        &self,
        tree: &mut SceneTree,
        container: NodeId,
    ) -> Result<Vec<Binding>> {
        self.ensure_manual_allowed(tree, container)?;
        let class_name = tree.class_name(container)?;
        let own: Vec<TypeRef> = tree
            .capabilities(container)
            .iter()
            .map(|c| c.type_ref.clone())
            .filter(|t| !TRANSFORM_TYPES.contains(&t.name.as_str()) && t.name != class_name)
            .collect();

        let mut added = Vec::new();
        let registry = &mut tree.container_mut(container)?.bindings;
        for type_ref in own {
            let field_name = field_name_for_type(&type_ref);
            let target = BindTarget::capability(container, type_ref);
            if registry.add(Some(target.clone()), &field_name) {
                added.push(Binding::new(Some(target), &field_name));
            }
        }
        if !added.is_empty() {
            tree.mark_dirty(container);
        }
        Ok(added)
    }

    /// Nested containers directly owned by `container`, in traversal order.
    ///
    /// Containers inside another nested container belong to that one and are not listed.
    /// Names starting with an exclusion prefix are left out.
    pub fn child_containers(&self, tree: &SceneTree, container: NodeId) -> Result<Vec<NodeId>> {
        let data = tree.container(container)?;
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = tree.children(container).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = tree.node(id)?;
            if node.is_container() {
                if !data.is_excluded(&node.name) {
                    found.push(id);
                }
                continue;
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(found)
    }

    /// Bind every nested container listed by [`Self::child_containers`]
    pub fn add_child_containers(
        &self,
        tree: &mut SceneTree,
        container: NodeId,
    ) -> Result<Vec<Binding>> {
        self.ensure_manual_allowed(tree, container)?;
        let mut pending = Vec::new();
        for child in self.child_containers(tree, container)? {
            pending.push((BindTarget::container(child), lower_first(&tree.class_name(child)?)));
        }

        let mut added = Vec::new();
        let registry = &mut tree.container_mut(container)?.bindings;
        for (target, field_name) in pending {
            if registry.add(Some(target.clone()), &field_name) {
                added.push(Binding::new(Some(target), &field_name));
            }
        }
        if !added.is_empty() {
            tree.mark_dirty(container);
        }
        Ok(added)
    }

    fn ensure_manual_allowed(&self, tree: &SceneTree, container: NodeId) -> Result<()> {
        let data = tree.container(container)?;
        if data.bind_mode.allows_manual() {
            Ok(())
        } else {
            Err(Error::BindModeViolation {
                container: tree.name(container).to_string(),
                operation: "manual",
            })
        }
    }

    /// Check that `target` exists and return the field name it would get by default
    fn check_target(&self, tree: &SceneTree, container: NodeId, target: &BindTarget) -> Result<String> {
        let node = tree.node(target.node())?;
        match target {
            BindTarget::Capability { type_ref, .. } => {
                if !node.has_capability(type_ref) {
                    return Err(Error::CapabilityMissing {
                        node: node.name.clone(),
                        type_name: type_ref.qualified(),
                    });
                }
                Ok(field_name_for_type(type_ref))
            }
            BindTarget::Container { node: id } => {
                if *id == container {
                    return Err(Error::InvalidScene(format!(
                        "container '{}' cannot bind itself",
                        node.name
                    )));
                }
                Ok(lower_first(&tree.class_name(*id)?))
            }
        }
    }
}

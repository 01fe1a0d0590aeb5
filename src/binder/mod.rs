//! Attaching compiled generated types to containers and filling their fields.
//!
//! Binding runs after the generated sources have been compiled. The binder never
//! compiles anything itself; it asks a [`CompilationHost`] for the type and reports
//! [`Error::CompiledTypeNotFound`] when the host does not have it yet.

pub mod compilation;
pub mod report;
pub mod signal;

use crate::error::{Error, Result};
use crate::interface::config::GenerationConfig;
use crate::interface::output::Logger;
use crate::models::{BindTarget, Binding, Capability, NodeId, ObjectRef, TypeRef};
use crate::scene::SceneTree;
use crate::sync::{CancellationFlag, ContainerLocks};
use std::collections::HashSet;

pub use compilation::{
    within_namespaces, CompilationHost, CompiledField, CompiledType, InMemoryCompilation,
    SourceScanner,
};
pub use report::{
    BindOutcome, BindingFieldStatus, BindingResult, BindingValidation, FieldFailure, FieldStatus,
};
pub use signal::{compile_channel, wait_until_available, CompileEvent, CompileSignal, WaitPolicy};

struct Instance {
    compiled: CompiledType,
    type_ref: TypeRef,
    attached: bool,
}

pub struct CodeBinder<'a> {
    host: &'a dyn CompilationHost,
    config: &'a GenerationConfig,
    logger: Logger,
    locks: Option<&'a ContainerLocks>,
}

impl<'a> CodeBinder<'a> {
    pub fn new(host: &'a dyn CompilationHost, config: &'a GenerationConfig) -> Self {
        Self {
            host,
            config,
            logger: Logger::new(false, false),
            locks: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Reject a bind while another generate or bind holds the same class
    pub fn with_locks(mut self, locks: &'a ContainerLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Compiled generated type for `class_name`, never an engine type of the same name
    pub fn resolve_compiled_type(&self, class_name: &str) -> Result<CompiledType> {
        self.host
            .find_type(
                class_name,
                &self.config.namespace,
                &self.config.builtin_namespaces,
            )
            .ok_or_else(|| Error::CompiledTypeNotFound(class_name.to_string()))
    }

    /// Generated instance already attached to `container`
    pub fn find_instance<'t>(
        &self,
        tree: &'t SceneTree,
        container: NodeId,
        class_name: &str,
    ) -> Option<&'t Capability> {
        tree.capabilities(container).iter().find(|capability| {
            capability.type_ref.name == class_name
                && !self.config.is_builtin_namespace(&capability.type_ref.namespace)
        })
    }

    /// Attach the generated type to `container` if needed and assign every field.
    ///
    /// Fails only when the container itself cannot be bound: it is not a container, its
    /// type is not compiled, or it is busy. Field-level problems are collected in
    /// [`BindOutcome::failures`] and do not stop the remaining fields.
    pub fn bind_components(&self, tree: &mut SceneTree, container: NodeId) -> Result<BindOutcome> {
        let class_name = tree.class_name(container)?;
        let _guard = match self.locks {
            Some(locks) => Some(locks.try_acquire(&class_name)?),
            None => None,
        };

        let mut visiting = HashSet::new();
        let outcome = self.bind_recursive(tree, container, &mut visiting)?;

        if outcome.is_complete() {
            self.logger.verbose(&format!(
                "Bound {} field(s) on '{}'",
                outcome.bound_fields.len(),
                tree.path(container)
            ));
        } else {
            self.logger.warning(&format!(
                "Bound {} field(s) on '{}', {} failed",
                outcome.bound_fields.len(),
                tree.path(container),
                outcome.failures.len()
            ));
        }
        Ok(outcome)
    }

    /// Bind each container in order. A failing container is recorded and the batch moves on.
    pub fn bind_multiple(
        &self,
        tree: &mut SceneTree,
        containers: &[NodeId],
        cancel: Option<&CancellationFlag>,
    ) -> BindingResult {
        let mut result = BindingResult::new();

        for (index, &container) in containers.iter().enumerate() {
            if cancel.is_some_and(CancellationFlag::is_cancelled) {
                result.not_processed.extend(
                    containers[index..]
                        .iter()
                        .map(|id| display_name(tree, *id)),
                );
                self.logger.warning(&format!(
                    "Binding cancelled, {} container(s) not processed",
                    result.not_processed.len()
                ));
                break;
            }

            let name = display_name(tree, container);
            match self.bind_components(tree, container) {
                Ok(outcome) => {
                    for failure in &outcome.failures {
                        result
                            .warnings
                            .push(format!("{}.{}: {}", name, failure.field_name, failure.reason));
                    }
                    result.record_success(&name);
                }
                Err(e) => {
                    self.logger.error(&format!("Failed to bind '{}': {}", name, e));
                    result.record_failure(&name, e);
                }
            }
        }
        result
    }

    /// Compare the bindings of `container` with what is compiled and assigned. Nothing is
    /// modified and expected absences are reported, not raised.
    pub fn validate_binding(&self, tree: &SceneTree, container: NodeId) -> BindingValidation {
        let path = tree.path(container);
        let class_name = match tree.class_name(container) {
            Ok(name) => name,
            Err(e) => {
                let mut validation = BindingValidation::new(&path, "");
                validation.errors.push(e.to_string());
                return validation;
            }
        };
        let mut validation = BindingValidation::new(&path, &class_name);

        let compiled = match self.resolve_compiled_type(&class_name) {
            Ok(compiled) => compiled,
            Err(_) => {
                validation
                    .errors
                    .push(format!("generated type '{}' is not compiled", class_name));
                return validation;
            }
        };
        validation.script_type = Some(compiled.type_ref.qualified());

        let Some(instance) = self.find_instance(tree, container, &class_name) else {
            validation.errors.push(format!(
                "no '{}' instance is attached to '{}'",
                class_name,
                tree.name(container)
            ));
            return validation;
        };
        let Ok(data) = tree.container(container) else {
            return validation;
        };

        for binding in data
            .bindings
            .valid_bindings()
            .into_iter()
            .filter(|b| b.generate_field)
        {
            let (target_type, expected) = self.expected_value(tree, binding);
            let field = binding.field_name.as_str();

            let status = match compiled.field(field) {
                None => FieldStatus::FieldNotPresent,
                Some(declared) => match (&expected, instance.field(field)) {
                    (Some(exp), _) if !declared.accepts(&exp.type_ref) => {
                        FieldStatus::TypeMismatch {
                            declared: declared.type_name.clone(),
                            target: exp.type_ref.qualified(),
                        }
                    }
                    (_, None) | (_, Some(None)) => FieldStatus::Unassigned,
                    (None, Some(Some(_))) => FieldStatus::TargetMissing,
                    (Some(exp), Some(Some(actual))) if exp == actual => FieldStatus::Bound,
                    (Some(_), Some(Some(_))) => FieldStatus::Stale,
                },
            };

            validation.push(BindingFieldStatus {
                field_name: field.to_string(),
                target_type,
                status,
            });
        }
        validation
    }

    /// What a correctly bound field would hold, and a display name for the target type
    fn expected_value(&self, tree: &SceneTree, binding: &Binding) -> (String, Option<ObjectRef>) {
        match &binding.target {
            Some(BindTarget::Capability { node, type_ref }) => {
                let present = tree
                    .node(*node)
                    .is_ok_and(|n| n.has_capability(type_ref));
                let expected = present.then(|| ObjectRef {
                    node: *node,
                    type_ref: type_ref.clone(),
                });
                (type_ref.qualified(), expected)
            }
            Some(BindTarget::Container { node }) => match tree.class_name(*node) {
                Ok(nested_class) => {
                    let expected = self
                        .find_instance(tree, *node, &nested_class)
                        .map(|instance| ObjectRef {
                            node: *node,
                            type_ref: instance.type_ref.clone(),
                        });
                    let display = expected
                        .as_ref()
                        .map(|e| e.type_ref.qualified())
                        .unwrap_or_else(|| TypeRef::new(&self.config.namespace, &nested_class).qualified());
                    (display, expected)
                }
                Err(_) => (String::new(), None),
            },
            None => (String::new(), None),
        }
    }

    fn ensure_instance(&self, tree: &mut SceneTree, container: NodeId) -> Result<Instance> {
        let class_name = tree.class_name(container)?;
        let compiled = self.resolve_compiled_type(&class_name)?;

        let existing = self
            .find_instance(tree, container, &class_name)
            .map(|c| c.type_ref.clone());
        let (type_ref, attached) = match existing {
            Some(type_ref) => (type_ref, false),
            None => {
                tree.attach_capability(container, compiled.type_ref.clone())?;
                self.logger.info(&format!(
                    "Attached {} to '{}'",
                    compiled.type_ref,
                    tree.path(container)
                ));
                (compiled.type_ref.clone(), true)
            }
        };

        // field slots follow the compiled declaration
        if let Some(instance) = tree.capability_mut(container, &type_ref) {
            instance
                .fields
                .retain(|name, _| compiled.field(name).is_some());
            for field in &compiled.fields {
                instance.fields.entry(field.name.clone()).or_insert(None);
            }
        }
        tree.mark_dirty(container);

        Ok(Instance {
            compiled,
            type_ref,
            attached,
        })
    }

    fn bind_recursive(
        &self,
        tree: &mut SceneTree,
        container: NodeId,
        visiting: &mut HashSet<NodeId>,
    ) -> Result<BindOutcome> {
        visiting.insert(container);
        let instance = self.ensure_instance(tree, container)?;
        let class_name = tree.class_name(container)?;

        let mut outcome = BindOutcome::new(container, &class_name, instance.type_ref.clone());
        outcome.attached = instance.attached;

        let bindings: Vec<Binding> = tree
            .container(container)?
            .bindings
            .valid_bindings()
            .into_iter()
            .filter(|b| b.generate_field)
            .cloned()
            .collect();

        for binding in bindings {
            let field = binding.field_name.as_str();
            let Some(declared) = instance.compiled.field(field).cloned() else {
                outcome.fail_field(
                    field,
                    Error::FieldNotFound {
                        class_name: class_name.clone(),
                        field: field.to_string(),
                    },
                );
                continue;
            };

            let value = match self.resolve_value(tree, &binding, visiting, &mut outcome) {
                Ok(value) => value,
                Err(e) => {
                    outcome.fail_field(field, e);
                    continue;
                }
            };

            if !declared.accepts(&value.type_ref) {
                outcome.fail_field(
                    field,
                    FieldStatus::TypeMismatch {
                        declared: declared.type_name.clone(),
                        target: value.type_ref.qualified(),
                    },
                );
                continue;
            }

            if let Some(target) = tree.capability_mut(container, &instance.type_ref) {
                target.fields.insert(field.to_string(), Some(value));
                outcome.bound_fields.push(field.to_string());
            }
        }

        for failure in &outcome.failures {
            self.logger.debug(&format!(
                "{}.{}: {}",
                class_name, failure.field_name, failure.reason
            ));
        }
        Ok(outcome)
    }

    fn resolve_value(
        &self,
        tree: &mut SceneTree,
        binding: &Binding,
        visiting: &mut HashSet<NodeId>,
        outcome: &mut BindOutcome,
    ) -> Result<ObjectRef> {
        match &binding.target {
            Some(BindTarget::Capability { node, type_ref }) => {
                let target = tree.node(*node)?;
                if !target.has_capability(type_ref) {
                    return Err(Error::CapabilityMissing {
                        node: target.name.clone(),
                        type_name: type_ref.qualified(),
                    });
                }
                Ok(ObjectRef {
                    node: *node,
                    type_ref: type_ref.clone(),
                })
            }
            Some(BindTarget::Container { node }) => {
                let type_ref = if visiting.contains(node) {
                    self.ensure_instance(tree, *node)?.type_ref
                } else {
                    let nested = self.bind_recursive(tree, *node, visiting)?;
                    for failure in nested.failures {
                        outcome.fail_field(
                            &format!("{}.{}", binding.field_name, failure.field_name),
                            failure.reason,
                        );
                    }
                    nested.instance_type
                };
                Ok(ObjectRef {
                    node: *node,
                    type_ref,
                })
            }
            None => Err(Error::InvalidScene(format!(
                "binding '{}' has no target",
                binding.field_name
            ))),
        }
    }
}

fn display_name(tree: &SceneTree, id: NodeId) -> String {
    tree.node(id)
        .map(|node| node.name.clone())
        .unwrap_or_else(|_| id.to_string())
}

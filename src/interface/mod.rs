pub mod cli;
pub mod config;
pub mod output;

use crate::analysis::{BindingResolver, NamingConfig, TypeRegistry};
use crate::binder::{
    wait_until_available, BindingResult, BindingValidation, CodeBinder, CompilationHost,
    WaitPolicy,
};
use crate::error::{Error, Result};
use crate::generators::{create_generator, BindingsGenerator, GeneratedFiles, GenerationRequest};
use crate::models::NodeId;
use crate::scene::SceneTree;
use crate::sync::{CancellationFlag, ContainerLocks};
use serde::Serialize;

pub use cli::*;
pub use config::*;
pub use output::*;

/// What resolution did to one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSummary {
    pub container: String,
    pub added: Vec<String>,
    pub skipped: usize,
    /// `"<path> (<type>)"` per node that matched a rule but could not be bound
    pub unmatched: Vec<String>,
}

/// Outcome of a generation batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReport {
    /// `result.skipped` lists the containers with nothing to generate
    #[serde(flatten)]
    pub result: BindingResult,
    pub files: Vec<GeneratedFiles>,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// Outcome of validating a selection of containers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub validations: Vec<BindingValidation>,
    /// Containers without field-producing bindings
    pub skipped: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.validations.iter().all(BindingValidation::is_valid)
    }
}

/// The containers named in `names`, or every container when `names` is empty
pub fn select_containers(tree: &SceneTree, names: &[String]) -> Result<Vec<NodeId>> {
    if names.is_empty() {
        return Ok(tree.containers());
    }
    names
        .iter()
        .map(|name| {
            let id = tree
                .containers()
                .into_iter()
                .find(|id| tree.name(*id) == name.as_str())
                .ok_or_else(|| Error::InvalidScene(format!("no container named '{}'", name)))?;
            Ok(id)
        })
        .collect()
}

/// Containers holding at least one binding that produces a field
pub fn generatable_containers(tree: &SceneTree, containers: &[NodeId]) -> Vec<NodeId> {
    containers
        .iter()
        .copied()
        .filter(|id| {
            tree.container(*id).is_ok_and(|data| {
                data.bindings
                    .valid_bindings()
                    .iter()
                    .any(|binding| binding.generate_field)
            })
        })
        .collect()
}

/// Split `containers` into the generatable ones and the names of the rest
fn partition_generatable(tree: &SceneTree, containers: &[NodeId]) -> (Vec<NodeId>, Vec<String>) {
    let kept = generatable_containers(tree, containers);
    let skipped = containers
        .iter()
        .filter(|id| !kept.contains(id))
        .map(|id| tree.name(*id).to_string())
        .collect();
    (kept, skipped)
}

/// Run naming resolution on each container
pub fn resolve_containers(
    tree: &mut SceneTree,
    containers: &[NodeId],
    naming: &NamingConfig,
    types: &TypeRegistry,
    logger: &Logger,
) -> Result<Vec<ResolveSummary>> {
    let resolver = BindingResolver::new(naming, types).with_logger(logger.clone());
    let mut summaries = Vec::with_capacity(containers.len());

    for &container in containers {
        let outcome = resolver.resolve(tree, container)?;
        logger.verbose(&format!(
            "{}: {} added, {} already bound, {} unmatched",
            tree.path(container),
            outcome.added.len(),
            outcome.skipped.len(),
            outcome.unmatched.len()
        ));
        summaries.push(ResolveSummary {
            container: tree.path(container),
            added: outcome
                .added
                .iter()
                .map(|binding| binding.field_name.clone())
                .collect(),
            skipped: outcome.skipped.len(),
            unmatched: outcome
                .unmatched
                .iter()
                .map(|u| format!("{} ({})", tree.path(u.node), u.attempted_type))
                .collect(),
        });
    }
    Ok(summaries)
}

fn generate_with(
    generator: &dyn BindingsGenerator,
    tree: &SceneTree,
    container: NodeId,
    config: &GenerationConfig,
    locks: &ContainerLocks,
) -> Result<GeneratedFiles> {
    let request = GenerationRequest::from_container(tree, container, config)?;
    let _guard = locks.try_acquire(&request.class_name)?;
    generator.generate(&request, config)
}

/// Generate one container's source files
pub fn generate(
    tree: &SceneTree,
    container: NodeId,
    config: &GenerationConfig,
    locks: &ContainerLocks,
) -> Result<GeneratedFiles> {
    let generator = create_generator(config)?;
    generate_with(generator.as_ref(), tree, container, config, locks)
}

/// Generate each container in turn.
///
/// Containers without field-producing bindings are listed as skipped. A failing container
/// is recorded and does not stop the others. Cancellation is honoured between containers.
pub fn generate_containers(
    tree: &SceneTree,
    containers: &[NodeId],
    config: &GenerationConfig,
    locks: &ContainerLocks,
    cancel: Option<&CancellationFlag>,
    logger: &Logger,
) -> Result<GenerateReport> {
    let generator = create_generator(config)?;
    let mut report = GenerateReport::default();
    let mut progress = ProgressReporter::new(logger.clone(), containers.len());

    for (index, &container) in containers.iter().enumerate() {
        if cancel.is_some_and(CancellationFlag::is_cancelled) {
            report.result.not_processed.extend(
                containers[index..]
                    .iter()
                    .map(|id| tree.name(*id).to_string()),
            );
            logger.warning(&format!(
                "Generation cancelled, {} container(s) not processed",
                report.result.not_processed.len()
            ));
            break;
        }

        let name = tree.name(container).to_string();
        progress.start_step(&format!("Generating {}", name));
        match generate_with(generator.as_ref(), tree, container, config, locks) {
            Ok(files) => {
                progress.complete_step(Some(&files.auto_file.display().to_string()));
                report.result.record_success(&name);
                report.files.push(files);
            }
            Err(Error::NoValidBindings(_)) => {
                progress.update_progress(&format!("Skipping {}: no valid bindings", name));
                report.result.skipped.push(name);
            }
            Err(e) => {
                progress.fail_step(&e.to_string());
                report.result.record_failure(&name, e);
            }
        }
    }

    progress.finish(&format!(
        "Generated {} container(s), {} skipped, {} failed",
        report.result.success_count,
        report.result.skipped.len(),
        report.result.failure_count
    ));
    Ok(report)
}

/// Generate every container in the scene
pub fn generate_all(
    tree: &SceneTree,
    config: &GenerationConfig,
    locks: &ContainerLocks,
    cancel: Option<&CancellationFlag>,
    logger: &Logger,
) -> Result<GenerateReport> {
    generate_containers(tree, &tree.containers(), config, locks, cancel, logger)
}

/// How a bind batch waits, locks, stops and logs
pub struct BindOptions<'a> {
    /// `None` refreshes the host once instead of waiting
    pub wait: Option<&'a WaitPolicy>,
    pub locks: &'a ContainerLocks,
    pub cancel: Option<&'a CancellationFlag>,
    pub logger: &'a Logger,
}

/// Wait for the generated types, then bind each container.
///
/// A compile timeout is not fatal: the containers whose types are still missing fail
/// individually with [`Error::CompiledTypeNotFound`]. A reported compile failure is.
pub fn bind_containers(
    tree: &mut SceneTree,
    containers: &[NodeId],
    host: &mut dyn CompilationHost,
    config: &GenerationConfig,
    options: &BindOptions<'_>,
) -> Result<BindingResult> {
    let logger = options.logger;
    let (containers, skipped) = partition_generatable(tree, containers);
    for name in &skipped {
        logger.warning(&format!("Skipping {}: no valid bindings", name));
    }
    let class_names = containers
        .iter()
        .map(|id| tree.class_name(*id))
        .collect::<Result<Vec<_>>>()?;

    match options.wait {
        Some(policy) => {
            match wait_until_available(host, &class_names, &config.builtin_namespaces, policy) {
                Ok(()) => {}
                Err(Error::CompileTimeout(missing)) => logger.warning(&format!(
                    "Still not compiled after waiting: {}",
                    missing.join(", ")
                )),
                Err(e) => return Err(e),
            }
        }
        None => host.refresh()?,
    }

    let binder = CodeBinder::new(&*host, config)
        .with_logger(logger.clone())
        .with_locks(options.locks);
    let mut result = binder.bind_multiple(tree, &containers, options.cancel);
    result.skipped = skipped;
    Ok(result)
}

/// Validate each container that has field-producing bindings. The others are listed as
/// skipped.
pub fn validate_containers(
    tree: &SceneTree,
    containers: &[NodeId],
    host: &dyn CompilationHost,
    config: &GenerationConfig,
) -> ValidationReport {
    let binder = CodeBinder::new(host, config);
    let (containers, skipped) = partition_generatable(tree, containers);
    ValidationReport {
        validations: containers
            .into_iter()
            .map(|id| binder.validate_binding(tree, id))
            .collect(),
        skipped,
    }
}

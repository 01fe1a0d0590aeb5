//! Resolve, generate, "compile" from the generated sources, bind and validate

use crate::common::{self, TestProject};
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use ui_autobind::analysis::{builtin_ui_types, scene_types, LayeredTypeSource, TypeRegistry};
use ui_autobind::binder::{compile_channel, CompilationHost, SourceScanner, WaitPolicy};
use ui_autobind::interface::{
    bind_containers, generate, generate_all, resolve_containers, validate_containers, BindConfig,
    BindOptions, GenerationConfig, Logger,
};
use ui_autobind::scene::SceneTree;
use ui_autobind::sync::ContainerLocks;
use ui_autobind::{Error, NodeId};

#[test]
fn test_resolve_generate_bind_validate() {
    let project = TestProject::new();
    let logger = Logger::quiet();
    let locks = ContainerLocks::new();
    let config = BindConfig {
        generation: project.config(),
        ..Default::default()
    };

    let mut tree = common::main_panel_scene();
    let containers = tree.containers();
    let types = TypeRegistry::new(
        LayeredTypeSource::new()
            .with_layer(builtin_ui_types())
            .with_layer(scene_types(&tree)),
    );
    let summaries =
        resolve_containers(&mut tree, &containers, &config.naming, &types, &logger).unwrap();
    assert_eq!(summaries[0].container, "Canvas/MainPanel");
    assert_eq!(summaries[0].added, vec!["confirm", "title"]);
    assert_eq!(summaries[1].added, vec!["close"]);

    let report = generate_all(&tree, &config.generation, &locks, None, &logger).unwrap();
    assert!(report.is_success());
    assert_eq!(report.files.len(), 2);

    let mut host = SourceScanner::new(project.path(), "cs").unwrap();
    let options = BindOptions {
        wait: None,
        locks: &locks,
        cancel: None,
        logger: &logger,
    };
    let result =
        bind_containers(&mut tree, &containers, &mut host, &config.generation, &options).unwrap();
    assert!(result.is_success(), "{}", result);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let validations = validate_containers(&tree, &containers, &host, &config.generation);
    assert_eq!(validations.validations.len(), 2);
    assert!(validations.is_valid());
    assert!(validations.skipped.is_empty());

    // bindings and assignments survive the scene file
    tree.save(project.scene_file()).unwrap();
    let reloaded = SceneTree::load(project.scene_file()).unwrap();
    let again = validate_containers(&reloaded, &containers, &host, &config.generation);
    assert_eq!(again, validations);
}

#[test]
fn test_renamed_field_is_reported_until_regenerated() {
    let project = TestProject::new();
    let logger = Logger::quiet();
    let locks = ContainerLocks::new();
    let generation = project.config();

    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    common::resolve(&mut tree, panel);
    generate_all(&tree, &generation, &locks, None, &logger).unwrap();

    let mut host = SourceScanner::new(project.path(), "cs").unwrap();
    let options = BindOptions {
        wait: None,
        locks: &locks,
        cancel: None,
        logger: &logger,
    };
    bind_containers(&mut tree, &[panel], &mut host, &generation, &options).unwrap();

    tree.container_mut(panel)
        .unwrap()
        .bindings
        .get_mut(0)
        .unwrap()
        .field_name = "okButton".to_string();
    let stale = validate_containers(&tree, &[panel], &host, &generation);
    assert!(stale.validations[0]
        .report()
        .contains("okButton: field not present"));

    generate_all(&tree, &generation, &locks, None, &logger).unwrap();
    host.refresh().unwrap();
    let result = bind_containers(&mut tree, &[panel], &mut host, &generation, &options).unwrap();
    assert!(result.is_success());

    let fresh = validate_containers(&tree, &[panel], &host, &generation);
    assert!(fresh.is_valid(), "{}", fresh.validations[0].report());
}

#[test]
fn test_bind_waits_for_a_compile_signal() {
    let project = TestProject::new();
    let logger = Logger::quiet();
    let locks = ContainerLocks::new();
    let generation = project.config();

    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    common::resolve(&mut tree, panel);

    // stand-in for an external compiler: emits the sources late, then signals
    let staging = render_sources(&tree, panel, &generation);
    let (signal, events) = compile_channel();
    let compiler = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        for (path, content) in staging {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        signal.finished(vec!["MainPanel".to_string()]);
    });

    let policy = WaitPolicy::signal(events, Duration::from_secs(10));
    let mut host = SourceScanner::new(project.path(), "cs").unwrap();
    let options = BindOptions {
        wait: Some(&policy),
        locks: &locks,
        cancel: None,
        logger: &logger,
    };
    let result = bind_containers(&mut tree, &[panel], &mut host, &generation, &options).unwrap();
    compiler.join().unwrap();

    assert_eq!(result.success_list, vec!["MainPanel"]);
}

#[test]
fn test_reported_compile_failure_aborts_the_bind() {
    let project = TestProject::new();
    let logger = Logger::quiet();
    let locks = ContainerLocks::new();
    let generation = project.config();

    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    common::resolve(&mut tree, panel);

    let (signal, events) = compile_channel();
    signal.failed("MainPanel.Auto.cs(12,5): error CS1002: ; expected");
    let policy = WaitPolicy::signal(events, Duration::from_secs(10));
    let mut host = SourceScanner::new(project.path(), "cs").unwrap();
    let options = BindOptions {
        wait: Some(&policy),
        locks: &locks,
        cancel: None,
        logger: &logger,
    };

    let err = bind_containers(&mut tree, &[panel], &mut host, &generation, &options).unwrap_err();

    assert!(matches!(err, Error::CompileFailed(message) if message.contains("CS1002")));
    assert!(tree.capabilities(panel).is_empty());
}

/// Render a container's sources in a scratch directory and return them keyed by the paths
/// they would have under `generation`, so another thread can write them later
fn render_sources(
    tree: &SceneTree,
    container: NodeId,
    generation: &GenerationConfig,
) -> Vec<(PathBuf, String)> {
    let scratch = TestProject::new();
    let files = generate(tree, container, &scratch.config(), &ContainerLocks::new()).unwrap();

    let mut rendered = vec![(
        generation.auto_file_path(&files.class_name),
        scratch.read(&files.auto_file),
    )];
    if let Some(manual) = files.manual_file {
        rendered.push((
            generation.manual_file_path(&files.class_name),
            scratch.read(&manual),
        ));
    }
    rendered
}

//! Source generation for resolved containers

use crate::common::{self, SceneBuilder, TestProject, BUTTON};
use std::fs;
use ui_autobind::interface::{generate, generate_all, Logger};
use ui_autobind::scene::SceneTree;
use ui_autobind::sync::{CancellationFlag, ContainerLocks};
use ui_autobind::{BindTarget, Error, NodeId};

fn resolved_scene() -> (SceneTree, NodeId, NodeId) {
    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    let footer = tree.find_by_name("Footer").unwrap();
    common::resolve(&mut tree, panel);
    common::resolve(&mut tree, footer);
    (tree, panel, footer)
}

#[test]
fn test_partial_mode_writes_auto_and_manual_files() {
    let project = TestProject::new();
    let (tree, panel, _) = resolved_scene();
    let config = project.config();

    let files = generate(&tree, panel, &config, &ContainerLocks::new()).unwrap();

    assert_eq!(files.auto_file, config.auto_file_path("MainPanel"));
    assert!(files.manual_created);
    let auto = project.read(&files.auto_file);
    assert_generated_contains!(
        auto,
        "// <auto-generated>",
        "using UnityEngine.UI;",
        "namespace UI",
        "public partial class MainPanel : MonoBehaviour",
        "#region AutoBind Generated",
        "[SerializeField] private Button confirm;",
        "[SerializeField] private Text title;",
        "#endregion AutoBind Generated",
    );
    let manual = project.read(files.manual_file.as_ref().unwrap());
    assert_generated_contains!(manual, "public partial class MainPanel");
    assert!(!manual.contains("SerializeField"));
}

#[test]
fn test_fields_follow_binding_order() {
    let project = TestProject::new();
    let (tree, panel, _) = resolved_scene();

    let files = generate(&tree, panel, &project.config(), &ContainerLocks::new()).unwrap();
    let auto = project.read(&files.auto_file);

    let confirm = auto.find("Button confirm;").unwrap();
    let title = auto.find("Text title;").unwrap();
    assert!(confirm < title);
}

#[test]
fn test_regeneration_never_touches_the_manual_partial() {
    let project = TestProject::new();
    let (tree, panel, _) = resolved_scene();
    let config = project.config();
    let locks = ContainerLocks::new();

    let first = generate(&tree, panel, &config, &locks).unwrap();
    let manual_path = first.manual_file.unwrap();
    let edited = "public partial class MainPanel { void Awake() { } }\n";
    project.write(&manual_path, edited);

    let second = generate(&tree, panel, &config, &locks).unwrap();

    assert!(!second.manual_created);
    assert_eq!(project.read(&manual_path), edited);
}

#[test]
fn test_auto_file_is_stable_across_runs() {
    let project = TestProject::new();
    let (tree, panel, _) = resolved_scene();
    let config = project.config();
    let locks = ContainerLocks::new();

    let files = generate(&tree, panel, &config, &locks).unwrap();
    let first = project.read(&files.auto_file);
    generate(&tree, panel, &config, &locks).unwrap();

    assert_eq!(project.read(&files.auto_file), first);
}

#[test]
fn test_single_file_keeps_manual_code_across_regeneration() {
    let project = TestProject::new();
    let (mut tree, panel, _) = resolved_scene();
    let config = project.single_file_config();
    let locks = ContainerLocks::new();

    let files = generate(&tree, panel, &config, &locks).unwrap();
    assert!(files.manual_file.is_none());
    let original = project.read(&files.auto_file);
    let with_code = original.replacen(
        "#endregion Manual Code",
        "public void Refresh() { title.text = \"\"; }\n        #endregion Manual Code",
        1,
    );
    project.write(&files.auto_file, &with_code);

    // rename a field, then regenerate
    tree.container_mut(panel)
        .unwrap()
        .bindings
        .get_mut(0)
        .unwrap()
        .field_name = "okButton".to_string();
    generate(&tree, panel, &config, &locks).unwrap();

    let regenerated = project.read(&files.auto_file);
    assert_generated_contains!(
        regenerated,
        "public class MainPanel : MonoBehaviour",
        "[SerializeField] private Button okButton;",
        "public void Refresh() { title.text = \"\"; }",
    );
    assert!(!regenerated.contains("Button confirm;"));
}

#[test]
fn test_single_file_without_manual_region_is_left_alone() {
    let project = TestProject::new();
    let (tree, panel, _) = resolved_scene();
    let config = project.single_file_config();
    let path = config.manual_file_path("MainPanel");
    let handwritten = "public class MainPanel : MonoBehaviour { }\n";
    project.write(&path, handwritten);

    let err = generate(&tree, panel, &config, &ContainerLocks::new()).unwrap_err();

    assert!(matches!(err, Error::ManualRegionMissing { .. }));
    assert_eq!(project.read(&path), handwritten);
}

#[test]
fn test_nested_container_field_uses_generated_class() {
    let project = TestProject::new();
    let (mut tree, panel, footer) = resolved_scene();
    tree.container_mut(panel)
        .unwrap()
        .bindings
        .add(Some(BindTarget::container(footer)), "footer");

    let files = generate(&tree, panel, &project.config(), &ContainerLocks::new()).unwrap();

    let auto = project.read(&files.auto_file);
    assert_generated_contains!(auto, "[SerializeField] private Footer footer;");
}

#[test]
fn test_generate_all_isolates_failures_and_skips_empty_containers() {
    let project = TestProject::new();
    let mut scene = SceneBuilder::new();
    let canvas = scene.root("Canvas");
    let good = scene.container(canvas, "Inventory");
    scene.node(good, "Use_btn", &[BUTTON]);
    let bad = scene.container(canvas, "Settings");
    scene.node(bad, "Back_btn", &[BUTTON]);
    scene.container(canvas, "Empty");
    let mut tree = scene.build();
    common::resolve(&mut tree, good);
    common::resolve(&mut tree, bad);
    tree.container_mut(bad)
        .unwrap()
        .bindings
        .get_mut(0)
        .unwrap()
        .field_name = "class".to_string();

    let report = generate_all(
        &tree,
        &project.config(),
        &ContainerLocks::new(),
        None,
        &Logger::quiet(),
    )
    .unwrap();

    assert_eq!(report.result.success_list, vec!["Inventory"]);
    assert_eq!(report.result.failure_count, 1);
    assert_eq!(report.result.failure_list, vec!["Settings"]);
    assert!(report.result.errors[0].contains("'class'"));
    assert_eq!(report.result.skipped, vec!["Empty"]);
    assert!(!report.is_success());
    assert!(project.config().auto_file_path("Inventory").exists());
    assert!(!project.path().join("Settings").exists());
}

#[test]
fn test_cancelled_batch_writes_nothing() {
    let project = TestProject::new();
    let (tree, _, _) = resolved_scene();
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let report = generate_all(
        &tree,
        &project.config(),
        &ContainerLocks::new(),
        Some(&cancel),
        &Logger::quiet(),
    )
    .unwrap();

    assert!(report.result.was_cancelled());
    assert_eq!(report.result.not_processed.len(), tree.containers().len());
    assert!(report.files.is_empty());
    assert_eq!(fs::read_dir(project.path()).unwrap().count(), 0);
}

#[test]
fn test_busy_container_is_refused() {
    let project = TestProject::new();
    let (tree, panel, _) = resolved_scene();
    let locks = ContainerLocks::new();
    let _held = locks.try_acquire("MainPanel").unwrap();

    let err = generate(&tree, panel, &project.config(), &locks).unwrap_err();

    assert!(matches!(err, Error::ContainerBusy(_)));
    assert!(!project.config().auto_file_path("MainPanel").exists());
}

//! Binding compiled generated types back onto the scene

use crate::common::{self, BUTTON, TEXT};
use std::time::Duration;
use ui_autobind::binder::{CodeBinder, CompiledType, FieldStatus, InMemoryCompilation, WaitPolicy};
use ui_autobind::interface::{
    bind_containers, validate_containers, BindOptions, GenerationConfig, Logger,
};
use ui_autobind::scene::SceneTree;
use ui_autobind::sync::ContainerLocks;
use ui_autobind::{BindTarget, Error, NodeId, ObjectRef, TypeRef};

struct Fixture {
    tree: SceneTree,
    panel: NodeId,
    footer: NodeId,
    confirm: NodeId,
    title: NodeId,
}

fn fixture() -> Fixture {
    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    let footer = tree.find_by_name("Footer").unwrap();
    common::resolve(&mut tree, panel);
    common::resolve(&mut tree, footer);
    Fixture {
        confirm: tree.find_by_name("Confirm_btn").unwrap(),
        title: tree.find_by_name("Title_txt").unwrap(),
        tree,
        panel,
        footer,
    }
}

fn main_panel_type() -> CompiledType {
    CompiledType::new(TypeRef::parse("UI.MainPanel"))
        .with_field("confirm", "Button")
        .with_field("title", "Text")
}

fn footer_type() -> CompiledType {
    CompiledType::new(TypeRef::parse("UI.Footer")).with_field("close", "Button")
}

fn assigned(tree: &SceneTree, container: NodeId, class: &str, field: &str) -> Option<ObjectRef> {
    tree.node(container)
        .ok()
        .and_then(|node| node.capability(&TypeRef::new("UI", class)))
        .and_then(|instance| instance.field(field).cloned())
        .flatten()
}

#[test]
fn test_bind_attaches_instance_and_assigns_fields() {
    let mut f = fixture();
    let host = InMemoryCompilation::new().with_type(main_panel_type());
    let config = GenerationConfig::default();

    let outcome = CodeBinder::new(&host, &config)
        .bind_components(&mut f.tree, f.panel)
        .unwrap();

    assert!(outcome.attached);
    assert!(outcome.is_complete());
    assert_eq!(outcome.bound_fields, vec!["confirm", "title"]);
    assert_eq!(
        assigned(&f.tree, f.panel, "MainPanel", "confirm"),
        Some(ObjectRef {
            node: f.confirm,
            type_ref: TypeRef::parse(BUTTON),
        })
    );
    assert_eq!(
        assigned(&f.tree, f.panel, "MainPanel", "title"),
        Some(ObjectRef {
            node: f.title,
            type_ref: TypeRef::parse(TEXT),
        })
    );
    assert!(f.tree.dirty_nodes().any(|id| id == f.panel));
}

#[test]
fn test_binding_twice_reuses_the_instance() {
    let mut f = fixture();
    let host = InMemoryCompilation::new().with_type(main_panel_type());
    let config = GenerationConfig::default();
    let binder = CodeBinder::new(&host, &config);

    binder.bind_components(&mut f.tree, f.panel).unwrap();
    let second = binder.bind_components(&mut f.tree, f.panel).unwrap();

    assert!(!second.attached);
    let instances = f
        .tree
        .capabilities(f.panel)
        .iter()
        .filter(|c| c.type_ref.name == "MainPanel")
        .count();
    assert_eq!(instances, 1);
}

#[test]
fn test_missing_compiled_type_fails_without_attaching() {
    let mut f = fixture();
    let host = InMemoryCompilation::new();
    let config = GenerationConfig::default();

    let err = CodeBinder::new(&host, &config)
        .bind_components(&mut f.tree, f.panel)
        .unwrap_err();

    assert!(matches!(err, Error::CompiledTypeNotFound(name) if name == "MainPanel"));
    assert!(f.tree.capabilities(f.panel).is_empty());
}

#[test]
fn test_engine_type_with_the_same_name_is_not_used() {
    let mut f = fixture();
    let engine_type = CompiledType::new(TypeRef::parse("UnityEngine.MainPanel"));
    let host = InMemoryCompilation::new().with_type(engine_type);
    let config = GenerationConfig::default();

    let result = CodeBinder::new(&host, &config).bind_components(&mut f.tree, f.panel);

    assert!(matches!(result, Err(Error::CompiledTypeNotFound(_))));
}

#[test]
fn test_missing_field_does_not_stop_the_others() {
    let mut f = fixture();
    let compiled = CompiledType::new(TypeRef::parse("UI.MainPanel")).with_field("title", "Text");
    let host = InMemoryCompilation::new().with_type(compiled);
    let config = GenerationConfig::default();

    let outcome = CodeBinder::new(&host, &config)
        .bind_components(&mut f.tree, f.panel)
        .unwrap();

    assert_eq!(outcome.bound_fields, vec!["title"]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].field_name, "confirm");
    assert!(assigned(&f.tree, f.panel, "MainPanel", "title").is_some());
}

#[test]
fn test_declared_type_must_accept_the_target() {
    let mut f = fixture();
    let compiled = CompiledType::new(TypeRef::parse("UI.MainPanel"))
        .with_field("confirm", "Toggle")
        .with_field("title", "Text");
    let host = InMemoryCompilation::new().with_type(compiled);
    let config = GenerationConfig::default();

    let outcome = CodeBinder::new(&host, &config)
        .bind_components(&mut f.tree, f.panel)
        .unwrap();

    assert_eq!(outcome.failures[0].field_name, "confirm");
    assert!(outcome.failures[0].reason.starts_with("type mismatch"));
    assert!(assigned(&f.tree, f.panel, "MainPanel", "confirm").is_none());
}

#[test]
fn test_nested_container_is_bound_first() {
    let mut f = fixture();
    f.tree
        .container_mut(f.panel)
        .unwrap()
        .bindings
        .add(Some(BindTarget::container(f.footer)), "footer");
    let host = InMemoryCompilation::new()
        .with_type(main_panel_type().with_field("footer", "Footer"))
        .with_type(footer_type());
    let config = GenerationConfig::default();

    let outcome = CodeBinder::new(&host, &config)
        .bind_components(&mut f.tree, f.panel)
        .unwrap();

    assert!(outcome.is_complete());
    assert_eq!(
        assigned(&f.tree, f.panel, "MainPanel", "footer"),
        Some(ObjectRef {
            node: f.footer,
            type_ref: TypeRef::parse("UI.Footer"),
        })
    );
    assert!(assigned(&f.tree, f.footer, "Footer", "close").is_some());
}

#[test]
fn test_batch_binding_records_each_container() {
    let mut f = fixture();
    let mut host = InMemoryCompilation::new();
    host.stage(main_panel_type());
    let config = GenerationConfig::default();
    let locks = ContainerLocks::new();
    let logger = Logger::quiet();
    let options = BindOptions {
        wait: None,
        locks: &locks,
        cancel: None,
        logger: &logger,
    };
    let containers = f.tree.containers();

    let result = bind_containers(&mut f.tree, &containers, &mut host, &config, &options).unwrap();

    assert_eq!(host.refresh_count(), 1);
    assert_eq!(result.success_list, vec!["MainPanel"]);
    assert_eq!(result.failure_list, vec!["Footer"]);
    assert!(result.errors[0].contains("Footer"));
    assert!(!locks.is_held("MainPanel"));
}

#[test]
fn test_compile_timeout_leaves_missing_containers_failed() {
    let mut f = fixture();
    let mut host = InMemoryCompilation::new().with_type(footer_type());
    let config = GenerationConfig::default();
    let locks = ContainerLocks::new();
    let logger = Logger::quiet();
    let policy = WaitPolicy::Poll {
        interval: Duration::from_millis(5),
        timeout: Duration::from_millis(20),
    };
    let options = BindOptions {
        wait: Some(&policy),
        locks: &locks,
        cancel: None,
        logger: &logger,
    };
    let containers = vec![f.panel, f.footer];

    let result = bind_containers(&mut f.tree, &containers, &mut host, &config, &options).unwrap();

    assert_eq!(result.success_list, vec!["Footer"]);
    assert_eq!(result.failure_list, vec!["MainPanel"]);
}

#[test]
fn test_validation_reports_field_removed_after_binding() {
    let mut f = fixture();
    let mut host = InMemoryCompilation::new().with_type(main_panel_type());
    let config = GenerationConfig::default();
    CodeBinder::new(&host, &config)
        .bind_components(&mut f.tree, f.panel)
        .unwrap();

    let before = validate_containers(&f.tree, &[f.panel], &host, &config);
    assert!(before.is_valid());
    assert_eq!(before.validations[0].valid_fields.len(), 2);

    assert!(host.remove_field("MainPanel", "title"));
    let after = validate_containers(&f.tree, &[f.panel], &host, &config);

    let validation = &after.validations[0];
    assert!(!validation.is_valid());
    assert_eq!(
        validation.field("title").unwrap().status,
        FieldStatus::FieldNotPresent
    );
    assert!(validation.field("confirm").unwrap().status.is_bound());
    let report = validation.report();
    assert!(report.contains("Status: invalid"));
    assert!(report.contains("✗ title: field not present"));
}

#[test]
fn test_generated_type_is_found_behind_an_engine_type_of_the_same_name() {
    let mut scene = common::SceneBuilder::new();
    let canvas = scene.root("Canvas");
    let container = scene.container(canvas, "Button");
    scene.node(container, "Label_txt", &[TEXT]);
    let mut tree = scene.build();
    common::resolve(&mut tree, container);
    let host = InMemoryCompilation::new()
        .with_type(CompiledType::new(TypeRef::parse(BUTTON)))
        .with_type(CompiledType::new(TypeRef::parse("Game.Button")).with_field("label", "Text"));
    let config = GenerationConfig::default();
    let binder = CodeBinder::new(&host, &config);

    let compiled = binder.resolve_compiled_type("Button").unwrap();
    assert_eq!(compiled.type_ref, TypeRef::parse("Game.Button"));

    let outcome = binder.bind_components(&mut tree, container).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(outcome.bound_fields, vec!["label"]);
}

#[test]
fn test_validation_without_instance_is_an_error_not_a_panic() {
    let f = fixture();
    let host = InMemoryCompilation::new().with_type(main_panel_type());
    let config = GenerationConfig::default();

    let validation = CodeBinder::new(&host, &config).validate_binding(&f.tree, f.panel);

    assert_eq!(validation.script_type.as_deref(), Some("UI.MainPanel"));
    assert_eq!(
        validation.errors,
        vec!["no 'MainPanel' instance is attached to 'MainPanel'"]
    );
    assert!(f.tree.capabilities(f.panel).is_empty());
}

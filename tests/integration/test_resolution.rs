//! Naming-convention resolution over whole scenes

use crate::common::{self, SceneBuilder, TestProject, BUTTON, IMAGE, TEXT};
use ui_autobind::analysis::{BindingResolver, NamingConfig, SuffixRule, TypeRegistry, UnmatchedReason};
use ui_autobind::scene::SceneTree;
use ui_autobind::{BindMode, BindTarget, TypeRef};

#[test]
fn test_suffix_is_stripped_and_first_letter_lowered() {
    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();

    let added = common::resolve(&mut tree, panel);

    assert_eq!(added, vec!["confirm", "title"]);
    let confirm = tree.find_by_name("Confirm_btn").unwrap();
    let binding = tree
        .container(panel)
        .unwrap()
        .bindings
        .find_by_target(&BindTarget::capability(confirm, TypeRef::parse(BUTTON)))
        .cloned()
        .unwrap();
    assert_eq!(binding.field_name, "confirm");
    assert!(binding.generate_field);
}

#[test]
fn test_resolving_twice_adds_nothing() {
    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();

    common::resolve(&mut tree, panel);
    let before = tree.container(panel).unwrap().bindings.clone();
    let second = common::resolve(&mut tree, panel);

    assert!(second.is_empty());
    assert_eq!(tree.container(panel).unwrap().bindings, before);
}

#[test]
fn test_nested_container_subtree_belongs_to_nested_container() {
    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    let footer = tree.find_by_name("Footer").unwrap();

    common::resolve(&mut tree, panel);
    common::resolve(&mut tree, footer);

    assert!(!common::field_names(&tree, panel).contains(&"close".to_string()));
    assert_eq!(common::field_names(&tree, footer), vec!["close"]);
}

#[test]
fn test_first_declared_rule_wins() {
    let mut scene = SceneBuilder::new();
    let root = scene.root("Canvas");
    let panel = scene.container(root, "Toolbar");
    scene.node(panel, "Save_icon_btn", &[BUTTON, IMAGE]);
    let mut tree = scene.build();

    let types = TypeRegistry::builtin();
    let button_first = NamingConfig::new(vec![
        SuffixRule::new("_btn", BUTTON),
        SuffixRule::new("_icon_btn", IMAGE),
    ]);
    let outcome = BindingResolver::new(&button_first, &types)
        .resolve(&mut tree, panel)
        .unwrap();
    assert_eq!(outcome.added.len(), 1);
    assert_eq!(outcome.added[0].field_name, "save_icon");
    assert!(matches!(
        &outcome.added[0].target,
        Some(BindTarget::Capability { type_ref, .. }) if type_ref.name == "Button"
    ));

    tree.container_mut(panel).unwrap().bindings.clear();
    let image_first = NamingConfig::new(vec![
        SuffixRule::new("_icon_btn", IMAGE),
        SuffixRule::new("_btn", BUTTON),
    ]);
    let outcome = BindingResolver::new(&image_first, &types)
        .resolve(&mut tree, panel)
        .unwrap();
    assert_eq!(outcome.added[0].field_name, "save");
    assert!(matches!(
        &outcome.added[0].target,
        Some(BindTarget::Capability { type_ref, .. }) if type_ref.name == "Image"
    ));
}

#[test]
fn test_excluded_node_keeps_its_children_visible() {
    let mut scene = SceneBuilder::new();
    let root = scene.root("Canvas");
    let panel = scene.container(root, "Shop");
    let hidden = scene.node(panel, "_Debug_btn", &[BUTTON]);
    scene.node(hidden, "Price_txt", &[TEXT]);
    let mut tree = scene.build();
    tree.container_mut(panel)
        .unwrap()
        .set_excluded_prefixes("_Debug, Temp");

    let added = common::resolve(&mut tree, panel);

    assert_eq!(added, vec!["price"]);
}

#[test]
fn test_missing_capability_is_reported_not_bound() {
    let mut scene = SceneBuilder::new();
    let root = scene.root("Canvas");
    let panel = scene.container(root, "Dialog");
    scene.node(panel, "Ok_btn", &[IMAGE]);
    let mut tree = scene.build();

    let naming = NamingConfig::default();
    let types = TypeRegistry::builtin();
    let outcome = BindingResolver::new(&naming, &types)
        .resolve(&mut tree, panel)
        .unwrap();

    assert!(outcome.added.is_empty());
    assert_eq!(outcome.unmatched.len(), 1);
    assert_eq!(outcome.unmatched[0].name, "Ok_btn");
    assert_eq!(outcome.unmatched[0].reason, UnmatchedReason::CapabilityMissing);
    assert!(tree.container(panel).unwrap().bindings.is_empty());
}

#[test]
fn test_manual_mode_ignores_naming_rules() {
    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    tree.container_mut(panel).unwrap().bind_mode = BindMode::Manual;

    assert!(common::resolve(&mut tree, panel).is_empty());
    assert!(tree.container(panel).unwrap().bindings.is_empty());
}

#[test]
fn test_manual_target_already_resolved_is_not_duplicated() {
    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    let confirm = tree.find_by_name("Confirm_btn").unwrap();
    common::resolve(&mut tree, panel);

    let naming = NamingConfig::default();
    let types = TypeRegistry::builtin();
    let resolver = BindingResolver::new(&naming, &types);
    let added = resolver
        .add_manual(
            &mut tree,
            panel,
            BindTarget::capability(confirm, TypeRef::parse(BUTTON)),
            Some("okButton"),
        )
        .unwrap();

    assert!(!added);
    assert_eq!(common::field_names(&tree, panel), vec!["confirm", "title"]);
}

#[test]
fn test_resolved_bindings_survive_a_save_and_load() {
    let project = TestProject::new();
    let mut tree = common::main_panel_scene();
    let panel = tree.find_by_name("MainPanel").unwrap();
    common::resolve(&mut tree, panel);

    tree.save(project.scene_file()).unwrap();
    let reloaded = SceneTree::load(project.scene_file()).unwrap();

    assert_eq!(
        reloaded.container(panel).unwrap(),
        tree.container(panel).unwrap()
    );
    assert_eq!(reloaded.path(panel), "Canvas/MainPanel");
}

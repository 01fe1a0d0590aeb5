#![allow(dead_code)]
/// Common test utilities and helpers
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use ui_autobind::analysis::{BindingResolver, NamingConfig, TypeRegistry};
use ui_autobind::interface::GenerationConfig;
use ui_autobind::scene::SceneTree;
use ui_autobind::{NodeId, TypeRef};

pub const BUTTON: &str = "UnityEngine.UI.Button";
pub const TEXT: &str = "UnityEngine.UI.Text";
pub const IMAGE: &str = "UnityEngine.UI.Image";

/// Builds scenes node by node, remembering ids by name
pub struct SceneBuilder {
    pub tree: SceneTree,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            tree: SceneTree::new(),
        }
    }

    pub fn root(&mut self, name: &str) -> NodeId {
        self.tree.add_root(name)
    }

    /// Child node carrying the given capability types
    pub fn node(&mut self, parent: NodeId, name: &str, capabilities: &[&str]) -> NodeId {
        let id = self.tree.add_child(parent, name).unwrap();
        for capability in capabilities {
            self.tree
                .attach_capability(id, TypeRef::parse(capability))
                .unwrap();
        }
        id
    }

    pub fn container(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.tree.add_child(parent, name).unwrap();
        self.tree.mark_container(id).unwrap();
        id
    }

    pub fn id(&self, name: &str) -> NodeId {
        self.tree
            .find_by_name(name)
            .unwrap_or_else(|| panic!("no node named '{name}'"))
    }

    pub fn build(mut self) -> SceneTree {
        self.tree.clear_dirty();
        self.tree
    }
}

/// Canvas / MainPanel with a button, a text, an unsuffixed image and a nested Footer
/// container holding its own button.
pub fn main_panel_scene() -> SceneTree {
    let mut scene = SceneBuilder::new();
    let canvas = scene.root("Canvas");
    let panel = scene.container(canvas, "MainPanel");
    scene.node(panel, "Confirm_btn", &[BUTTON]);
    let header = scene.node(panel, "Header", &[]);
    scene.node(header, "Title_txt", &[TEXT]);
    scene.node(panel, "Background", &[IMAGE]);
    let footer = scene.container(panel, "Footer");
    scene.node(footer, "Close_btn", &[BUTTON]);
    scene.build()
}

/// Run naming resolution on `container` with the default rules
pub fn resolve(tree: &mut SceneTree, container: NodeId) -> Vec<String> {
    let naming = NamingConfig::default();
    let types = TypeRegistry::builtin();
    let outcome = BindingResolver::new(&naming, &types)
        .resolve(tree, container)
        .unwrap();
    outcome.added.into_iter().map(|b| b.field_name).collect()
}

/// Field names bound by `container`, in registry order
pub fn field_names(tree: &SceneTree, container: NodeId) -> Vec<String> {
    tree.container(container)
        .unwrap()
        .bindings
        .iter()
        .map(|b| b.field_name.clone())
        .collect()
}

/// A temporary output directory with a matching generation config
pub struct TestProject {
    pub temp_dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> GenerationConfig {
        GenerationConfig {
            base_path: self.path().to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    pub fn single_file_config(&self) -> GenerationConfig {
        GenerationConfig {
            use_partial_class: false,
            ..self.config()
        }
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
    }

    pub fn write(&self, path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn scene_file(&self) -> PathBuf {
        self.path().join("scene.json")
    }
}

/// Assert that a generated file contains every given snippet
macro_rules! assert_generated_contains {
    ($content:expr, $($snippet:expr),+ $(,)?) => {
        $(
            assert!(
                $content.contains($snippet),
                "expected generated output to contain {:?}\n--- output ---\n{}",
                $snippet,
                $content
            );
        )+
    };
}

//! # UI AutoBind
//!
//! Bind UI nodes to generated, strongly-typed fields by naming convention.
//!
//! A scene is a tree of named nodes carrying capabilities (`Button`, `Text`, ...). Nodes
//! marked as containers own a list of bindings. The library works in three stages:
//!
//! 1. **Resolve**: walk a container's subtree and add a binding for every node whose name
//!    ends with a configured suffix (`Confirm_btn` becomes field `confirm` of type `Button`).
//! 2. **Generate**: emit C#-style source for each container, either as a partial class
//!    pair or as a single file with a preserved manual region.
//! 3. **Bind**: once the generated types are compiled, attach an instance to the
//!    container and assign every field to the node capability it declares.
//!
//! A validation pass reports drift between the stored bindings and the compiled types.
//!
//! ## Programmatic Usage
//!
//! ```rust,no_run
//! use ui_autobind::analysis::{BindingResolver, NamingConfig, TypeRegistry};
//! use ui_autobind::interface::GenerationConfig;
//! use ui_autobind::scene::SceneTree;
//! use ui_autobind::sync::ContainerLocks;
//!
//! let mut tree = SceneTree::load("scene.json")?;
//! let naming = NamingConfig::default();
//! let types = TypeRegistry::builtin();
//! let resolver = BindingResolver::new(&naming, &types);
//!
//! for container in tree.containers() {
//!     resolver.resolve(&mut tree, container)?;
//! }
//!
//! let config = GenerationConfig::default();
//! let locks = ContainerLocks::new();
//! for container in tree.containers() {
//!     ui_autobind::interface::generate(&tree, container, &config, &locks)?;
//! }
//! tree.save("scene.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration
//!
//! The command line tool reads `autobind.json`:
//!
//! ```json
//! {
//!   "naming": {
//!     "rules": [
//!       { "suffix": "_btn", "componentType": "UnityEngine.UI.Button" }
//!     ]
//!   },
//!   "generation": {
//!     "basePath": "Assets/Scripts/Generated",
//!     "namespace": "Game.UI",
//!     "usePartialClass": true
//!   }
//! }
//! ```

pub mod analysis;
pub mod binder;
mod error;
pub mod generators;
pub mod interface;
pub mod models;
pub mod scene;
pub mod sync;

pub use error::{Error, Result};
pub use models::*;

// Convenience re-exports for common use cases
pub use analysis::{BindingResolver, NamingConfig, TypeRegistry};
pub use binder::{BindingResult, BindingValidation, CodeBinder, CompilationHost};
pub use interface::config::{BindConfig, GenerationConfig};
pub use interface::output::{Logger, ProgressReporter};
pub use scene::SceneTree;
